//! Late augmentation of a finalized series with a secondary metric
//!
//! Testing and vaccination feeds usually arrive after the primary series is
//! finalized, and they carry genuine gaps. Naively first-differencing across
//! a gap would attribute the entire gap's growth to the day reporting
//! resumes — one large spurious spike. The merger instead bridges gaps with a
//! forward-filled shadow column used only for delta computation: a day whose
//! true value is missing gets a missing delta, and the resume day's delta is
//! computed against the last value actually reported.

use crate::types::{CanonicalSeries, Metric};
use chrono::NaiveDate;
use tracing::debug;

/// Merge a secondary cumulative metric into an already-finalized series
///
/// `secondary` is the adapter's `(date, cumulative value)` sequence; dates
/// outside the series range are ignored, duplicate dates keep the first
/// reported value. No previously derived column is altered — only the two
/// columns belonging to `metric` are replaced.
///
/// Delta reconstruction:
/// - days before the first reported value: missing (never interpolate ahead
///   of the first observation);
/// - the first reported day itself: missing (no prior known value);
/// - a day with a missing true value: missing, regardless of the shadow;
/// - a negative shadow delta (the source revised its total downward):
///   missing — the merger never repairs the secondary column;
/// - otherwise: the shadow-column first difference.
pub fn augment(
    series: &CanonicalSeries,
    metric: Metric,
    secondary: &[(NaiveDate, Option<i64>)],
) -> CanonicalSeries {
    let mut out = series.clone();
    let days = series.len();

    let mut cumulative: Vec<Option<i64>> = vec![None; days];
    for (date, value) in secondary {
        if let Some(row) = series.index_of(*date) {
            if cumulative[row].is_none() {
                cumulative[row] = *value;
            }
        }
    }

    let first_reported = cumulative.iter().position(|v| matches!(v, Some(c) if *c > 0));
    let mut daily: Vec<Option<i64>> = vec![None; days];

    if let Some(first) = first_reported {
        let mut shadow = vec![0i64; days];
        let mut carried = cumulative[first].unwrap_or(0);
        for i in first..days {
            if let Some(value) = cumulative[i] {
                carried = value;
            }
            shadow[i] = carried;
        }

        for i in first + 1..days {
            if cumulative[i].is_none() {
                continue; // genuinely unreported day stays missing
            }
            let delta = shadow[i] - shadow[i - 1];
            daily[i] = if delta < 0 { None } else { Some(delta) };
        }
    } else {
        debug!(
            region = %series.region,
            metric = %metric,
            "no positive cumulative value to augment with"
        );
    }

    *out.cumulative_mut(metric) = cumulative;
    *out.daily_mut(metric) = daily;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deltas::derive_deltas;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn finalized_series() -> CanonicalSeries {
        let mut series = CanonicalSeries::with_range("Italy".into(), day("2020-03-01"), 4);
        series.cum_cases = vec![Some(10), Some(20), Some(26), Some(30)];
        series.cum_deaths = vec![Some(0), Some(1), Some(1), Some(2)];
        series.cum_recover = vec![Some(0), Some(2), Some(3), Some(5)];
        derive_deltas(&series)
    }

    #[test]
    fn gap_days_stay_missing_and_resume_day_uses_last_known_value() {
        let series = finalized_series();
        let secondary = vec![
            (day("2020-03-01"), Some(100)),
            (day("2020-03-02"), None),
            (day("2020-03-03"), None),
            (day("2020-03-04"), Some(400)),
        ];
        let augmented = augment(&series, Metric::Tests, &secondary);
        assert_eq!(augmented.cum_tests, vec![Some(100), None, None, Some(400)]);
        // No forward-fill spike: the two gap days are missing, the resume
        // day's delta is 400 - 100
        assert_eq!(augmented.new_tests, vec![None, None, None, Some(300)]);
    }

    #[test]
    fn primary_columns_are_untouched() {
        let series = finalized_series();
        let secondary = vec![(day("2020-03-02"), Some(50)), (day("2020-03-04"), Some(90))];
        let augmented = augment(&series, Metric::Vaccinations, &secondary);
        assert_eq!(augmented.cum_cases, series.cum_cases);
        assert_eq!(augmented.new_cases, series.new_cases);
        assert_eq!(augmented.cum_deaths, series.cum_deaths);
        assert_eq!(augmented.new_deaths, series.new_deaths);
        assert_eq!(augmented.cum_recover, series.cum_recover);
        assert_eq!(augmented.new_recover, series.new_recover);
        assert_eq!(augmented.new_uninfected, series.new_uninfected);
        assert_eq!(augmented.population, series.population);
    }

    #[test]
    fn days_before_first_observation_are_missing() {
        let series = finalized_series();
        let secondary = vec![(day("2020-03-03"), Some(70)), (day("2020-03-04"), Some(75))];
        let augmented = augment(&series, Metric::Tests, &secondary);
        assert_eq!(augmented.new_tests, vec![None, None, None, Some(5)]);
    }

    #[test]
    fn downward_revision_reports_missing_not_negative() {
        let series = finalized_series();
        let secondary = vec![
            (day("2020-03-01"), Some(100)),
            (day("2020-03-02"), Some(90)),
            (day("2020-03-03"), Some(120)),
        ];
        let augmented = augment(&series, Metric::Tests, &secondary);
        assert_eq!(augmented.new_tests[1], None);
        assert_eq!(augmented.new_tests[2], Some(30));
    }

    #[test]
    fn out_of_range_dates_ignored() {
        let series = finalized_series();
        let secondary = vec![
            (day("2019-12-31"), Some(1)),
            (day("2020-03-02"), Some(10)),
            (day("2021-01-01"), Some(99)),
        ];
        let augmented = augment(&series, Metric::Tests, &secondary);
        assert_eq!(augmented.cum_tests, vec![None, Some(10), None, None]);
    }

    #[test]
    fn no_positive_value_leaves_daily_entirely_missing() {
        let series = finalized_series();
        let secondary = vec![(day("2020-03-01"), Some(0)), (day("2020-03-02"), None)];
        let augmented = augment(&series, Metric::Tests, &secondary);
        assert_eq!(augmented.new_tests, vec![None; 4]);
    }
}
