//! Wide-format JHU CSV parsing
//!
//! Layout: `Province/State, Country/Region, Lat, Long, 1/22/20, 1/23/20, ...`
//! with one cumulative count per date column. Whole countries are the rows
//! with an empty province cell; China, Canada and Australia never get one,
//! so their province rows are summed instead (Canada's recovered rows are
//! unusable upstream and stay excluded).

use crate::http::FetchError;
use chrono::NaiveDate;
use episeries_core::registry::RegionRegistry;
use episeries_core::types::{Metric, RawObservation, SourceId};
use std::collections::BTreeMap;
use tracing::warn;

/// Countries reported only at province level; summed to country level
const SUMMED_COUNTRIES: &[&str] = &["China", "Canada", "Australia"];

/// Leading non-date columns in the wide layout
const META_COLUMNS: usize = 4;

const DATE_FORMAT: &str = "%m/%d/%y";

/// Parse one metric's wide CSV into raw observations
///
/// Regions the registry cannot resolve are logged and dropped, matching the
/// skip-and-report policy; the parser itself never invents a key.
pub fn parse_global_csv(
    text: &str,
    metric: Metric,
    registry: &RegionRegistry,
) -> Result<Vec<RawObservation>, FetchError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let date_columns: Vec<(usize, NaiveDate)> = headers
        .iter()
        .enumerate()
        .skip(META_COLUMNS)
        .filter_map(|(i, cell)| {
            NaiveDate::parse_from_str(cell, DATE_FORMAT)
                .ok()
                .map(|date| (i, date))
        })
        .collect();
    if date_columns.is_empty() {
        return Err(FetchError::MissingColumn {
            column: "date columns".to_string(),
            context: format!("JHU {metric} feed"),
        });
    }

    // Per-country values; summed countries accumulate across province rows
    // with missing cells poisoning the sum, like a skipna=false reduction.
    let mut per_country: BTreeMap<String, Vec<Option<i64>>> = BTreeMap::new();

    for record in reader.records() {
        let record = record?;
        let province = record.get(0).unwrap_or_default();
        let country = record.get(1).unwrap_or_default().to_string();
        let values: Vec<Option<i64>> = date_columns
            .iter()
            .map(|(i, _)| parse_count(record.get(*i).unwrap_or_default()))
            .collect();

        if SUMMED_COUNTRIES.contains(&country.as_str()) {
            if country == "Canada" && metric == Metric::Recovered {
                continue;
            }
            per_country
                .entry(country)
                .and_modify(|totals| {
                    for (total, value) in totals.iter_mut().zip(&values) {
                        *total = match (*total, value) {
                            (Some(t), Some(v)) => Some(t + v),
                            _ => None,
                        };
                    }
                })
                .or_insert(values);
        } else if province.is_empty() {
            per_country.insert(country, values);
        }
        // province rows of ordinary countries are ignored
    }

    let mut observations = Vec::new();
    for (country, values) in per_country {
        if RegionRegistry::is_excluded(&country) {
            continue;
        }
        let region = match registry.resolve(&country, SourceId::JhuGlobal) {
            Ok(region) => region,
            Err(_) => {
                warn!(country, "no canonical mapping, dropping JHU rows");
                continue;
            }
        };
        for ((_, date), value) in date_columns.iter().zip(values) {
            observations.push(RawObservation {
                region: region.clone(),
                date: *date,
                metric,
                value,
                source: SourceId::JhuGlobal,
            });
        }
    }
    Ok(observations)
}

fn parse_count(cell: &str) -> Option<i64> {
    if cell.is_empty() {
        return None;
    }
    cell.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FIXTURE: &str = "\
Province/State,Country/Region,Lat,Long,3/1/20,3/2/20,3/3/20
,Italy,41.87,12.56,34,52,79
,France,46.23,2.21,100,100,130
Hubei,China,30.97,112.27,10,20,30
Beijing,China,40.18,116.41,1,2,3
,Diamond Princess,0.0,0.0,700,705,706
Gibraltar,United Kingdom,36.14,-5.35,1,1,1
";

    fn registry() -> RegionRegistry {
        let mut registry = RegionRegistry::new();
        for country in ["Italy", "France", "China", "United Kingdom"] {
            registry.add_country(country);
        }
        registry
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn values_for<'a>(
        observations: &'a [RawObservation],
        region: &str,
    ) -> Vec<&'a RawObservation> {
        observations
            .iter()
            .filter(|o| o.region.as_str() == region)
            .collect()
    }

    #[test]
    fn whole_country_rows_pass_through() {
        let observations = parse_global_csv(FIXTURE, Metric::Cases, &registry()).unwrap();
        let italy = values_for(&observations, "Italy");
        assert_eq!(italy.len(), 3);
        assert_eq!(italy[0].date, day("2020-03-01"));
        assert_eq!(italy[0].value, Some(34));
        assert_eq!(italy[2].value, Some(79));
        assert!(italy.iter().all(|o| o.metric == Metric::Cases));
    }

    #[test]
    fn province_only_countries_are_summed() {
        let observations = parse_global_csv(FIXTURE, Metric::Cases, &registry()).unwrap();
        let china = values_for(&observations, "China");
        assert_eq!(china.len(), 3);
        assert_eq!(china[0].value, Some(11));
        assert_eq!(china[2].value, Some(33));
    }

    #[test]
    fn province_rows_of_ordinary_countries_are_dropped() {
        let observations = parse_global_csv(FIXTURE, Metric::Cases, &registry()).unwrap();
        // The UK row in the fixture is Gibraltar, not the mainland total
        assert!(values_for(&observations, "United Kingdom").is_empty());
    }

    #[test]
    fn excluded_regions_never_emit() {
        let observations = parse_global_csv(FIXTURE, Metric::Cases, &registry()).unwrap();
        assert!(values_for(&observations, "Diamond Princess").is_empty());
    }

    #[test]
    fn canada_recovered_rows_are_skipped() {
        let fixture = "\
Province/State,Country/Region,Lat,Long,3/1/20
Ontario,Canada,51.25,-85.32,12
";
        let mut registry = RegionRegistry::new();
        registry.add_country("Canada");
        let recovered = parse_global_csv(fixture, Metric::Recovered, &registry).unwrap();
        assert!(recovered.is_empty());
        let cases = parse_global_csv(fixture, Metric::Cases, &registry).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].value, Some(12));
    }

    #[test]
    fn headerless_body_is_an_error() {
        let err = parse_global_csv("not,a,feed\n1,2,3\n", Metric::Cases, &registry()).unwrap_err();
        assert!(matches!(err, FetchError::MissingColumn { .. }));
    }
}
