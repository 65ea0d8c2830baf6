//! Daily new-count derivation from repaired cumulative columns

use crate::types::{CanonicalSeries, Metric};

/// Populate every `new_*` column from its repaired cumulative column
///
/// The first row's delta is defined as 0 (there is no prior day); a delta is
/// missing whenever either of the two cumulative values it would subtract is
/// missing. A cumulative column that never reports a positive value over the
/// whole range yields an entirely-missing daily column: "never reported" must
/// not read as "zero new every day".
///
/// `new_uninfected` is `new_recover + new_deaths`, derived afterwards, and is
/// missing whenever either input is — missingness propagates rather than
/// being approximated away.
pub fn derive_deltas(series: &CanonicalSeries) -> CanonicalSeries {
    let mut out = series.clone();
    for metric in Metric::ALL {
        let daily = column_deltas(series.cumulative(metric));
        *out.daily_mut(metric) = daily;
    }
    out.new_uninfected = out
        .new_recover
        .iter()
        .zip(&out.new_deaths)
        .map(|(recover, deaths)| match (recover, deaths) {
            (Some(r), Some(d)) => Some(r + d),
            _ => None,
        })
        .collect();
    out
}

/// First difference of one cumulative column, missing-aware
fn column_deltas(cumulative: &[Option<i64>]) -> Vec<Option<i64>> {
    let never_reported = !cumulative.iter().flatten().any(|v| *v > 0);
    if never_reported {
        return vec![None; cumulative.len()];
    }

    let mut daily = vec![None; cumulative.len()];
    if let Some(first) = cumulative.first() {
        daily[0] = first.map(|_| 0);
    }
    for i in 1..cumulative.len() {
        daily[i] = match (cumulative[i - 1], cumulative[i]) {
            (Some(prev), Some(curr)) => Some(curr - prev),
            _ => None,
        };
    }
    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base_series(days: usize) -> CanonicalSeries {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        CanonicalSeries::with_range("Italy".into(), start, days)
    }

    #[test]
    fn deltas_are_first_differences_with_zero_first_row() {
        let mut series = base_series(4);
        series.cum_cases = vec![Some(10), Some(20), Some(26), Some(30)];
        let derived = derive_deltas(&series);
        assert_eq!(derived.new_cases, vec![Some(0), Some(10), Some(6), Some(4)]);
    }

    #[test]
    fn round_trip_between_cumulative_and_daily() {
        let mut series = base_series(5);
        series.cum_deaths = vec![Some(1), Some(1), Some(4), Some(9), Some(9)];
        let derived = derive_deltas(&series);
        for t in 1..derived.len() {
            let expected = derived.cum_deaths[t].unwrap() - derived.cum_deaths[t - 1].unwrap();
            assert_eq!(derived.new_deaths[t], Some(expected));
        }
    }

    #[test]
    fn missing_cumulative_day_yields_missing_deltas_around_it() {
        let mut series = base_series(4);
        series.cum_cases = vec![None, Some(10), Some(12), Some(15)];
        let derived = derive_deltas(&series);
        assert_eq!(derived.new_cases, vec![None, None, Some(2), Some(3)]);
    }

    #[test]
    fn never_reported_column_is_entirely_missing() {
        // Recoveries reported as a flat zero for the whole range means the
        // source never actually counted them
        let mut series = base_series(3);
        series.cum_cases = vec![Some(1), Some(2), Some(3)];
        series.cum_recover = vec![Some(0), Some(0), Some(0)];
        let derived = derive_deltas(&series);
        assert_eq!(derived.new_recover, vec![None, None, None]);
        assert_eq!(derived.new_cases, vec![Some(0), Some(1), Some(1)]);
    }

    #[test]
    fn new_uninfected_sums_recoveries_and_deaths() {
        let mut series = base_series(3);
        series.cum_recover = vec![Some(2), Some(5), Some(9)];
        series.cum_deaths = vec![Some(1), Some(2), Some(2)];
        let derived = derive_deltas(&series);
        assert_eq!(derived.new_uninfected, vec![Some(0), Some(4), Some(4)]);
    }

    #[test]
    fn new_uninfected_propagates_missingness() {
        let mut series = base_series(3);
        series.cum_recover = vec![None, Some(5), Some(9)];
        series.cum_deaths = vec![Some(1), Some(2), Some(2)];
        let derived = derive_deltas(&series);
        // new_recover[0] and [1] are missing, so new_uninfected follows
        assert_eq!(derived.new_uninfected[0], None);
        assert_eq!(derived.new_uninfected[1], None);
        assert_eq!(derived.new_uninfected[2], Some(4));
    }
}
