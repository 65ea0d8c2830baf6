//! Our World In Data testing and vaccination adapters
//!
//! Both feeds are tall CSVs keyed by ISO alpha-3 code and day, and both
//! carry genuine reporting gaps: a blank cumulative cell means the country
//! reported nothing that day, and it must stay missing downstream. OWID's
//! synthetic aggregates (`OWID_WRL` and friends) have no canonical region
//! and are dropped during resolution.

mod testing;
mod vaccinations;

pub use testing::OwidTestingSource;
pub use vaccinations::OwidVaccinationsSource;

use crate::http::FetchError;
use chrono::NaiveDate;
use episeries_core::registry::RegionRegistry;
use episeries_core::types::{Metric, RawObservation, SourceId};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column layout of one tall OWID feed
struct FeedSpec {
    context: &'static str,
    iso_column: &'static str,
    date_column: &'static str,
    value_column: &'static str,
    metric: Metric,
    source: SourceId,
}

/// Parse a tall OWID CSV into raw observations
fn parse_feed(
    text: &str,
    spec: &FeedSpec,
    registry: &RegionRegistry,
) -> Result<Vec<RawObservation>, FetchError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FetchError::MissingColumn {
                column: name.to_string(),
                context: spec.context.to_string(),
            })
    };
    let iso_idx = column(spec.iso_column)?;
    let date_idx = column(spec.date_column)?;
    let value_idx = column(spec.value_column)?;

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record?;
        let code = record.get(iso_idx).unwrap_or_default();
        let region = match registry.resolve(code, spec.source) {
            Ok(region) => region,
            Err(_) => {
                debug!(code, context = spec.context, "unmapped ISO code dropped");
                continue;
            }
        };
        if RegionRegistry::is_excluded(region.as_str()) {
            continue;
        }

        let date_cell = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_cell, DATE_FORMAT).map_err(|_| {
            FetchError::BadDate {
                value: date_cell.to_string(),
                context: spec.context.to_string(),
            }
        })?;

        // Cumulative cells arrive as blanks or float-formatted totals
        let value = record
            .get(value_idx)
            .filter(|cell| !cell.is_empty())
            .and_then(|cell| cell.parse::<f64>().ok())
            .map(|v| v.round() as i64);

        observations.push(RawObservation {
            region,
            date,
            metric: spec.metric,
            value,
            source: spec.source,
        });
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RegionRegistry {
        let mut registry = RegionRegistry::new();
        registry.add_alpha3("ITA", "Italy");
        registry.add_alpha3("USA", "US");
        registry
    }

    const TESTING_FIXTURE: &str = "\
Entity,ISO code,Date,Cumulative total
Italy - tests performed,ITA,2020-03-01,100.0
Italy - tests performed,ITA,2020-03-02,
Italy - tests performed,ITA,2020-03-03,400.0
World,OWID_WRL,2020-03-01,123456
United States - tests performed,USA,2020-03-01,5000
";

    fn testing_spec() -> FeedSpec {
        FeedSpec {
            context: "OWID testing feed",
            iso_column: "ISO code",
            date_column: "Date",
            value_column: "Cumulative total",
            metric: Metric::Tests,
            source: SourceId::OwidTesting,
        }
    }

    #[test]
    fn blank_cumulative_cells_stay_missing() {
        let observations = parse_feed(TESTING_FIXTURE, &testing_spec(), &registry()).unwrap();
        let italy: Vec<_> = observations
            .iter()
            .filter(|o| o.region.as_str() == "Italy")
            .collect();
        assert_eq!(italy.len(), 3);
        assert_eq!(italy[0].value, Some(100));
        assert_eq!(italy[1].value, None);
        assert_eq!(italy[2].value, Some(400));
    }

    #[test]
    fn synthetic_aggregates_and_excluded_regions_dropped() {
        let observations = parse_feed(TESTING_FIXTURE, &testing_spec(), &registry()).unwrap();
        // OWID_WRL is unmapped; USA resolves to the excluded aggregate US row
        assert_eq!(observations.len(), 3);
        assert!(observations.iter().all(|o| o.region.as_str() == "Italy"));
    }

    #[test]
    fn missing_value_column_is_an_error() {
        let fixture = "Entity,ISO code,Date\nItaly,ITA,2020-03-01\n";
        let err = parse_feed(fixture, &testing_spec(), &registry()).unwrap_err();
        assert!(matches!(err, FetchError::MissingColumn { .. }));
    }
}
