//! COVID Tracking Project archived US recovery adapter
//!
//! The project stopped collecting in March 2021; its final per-state daily
//! CSV ships with the run as a local archive. States reported recoveries
//! under `recovered` or, failing that, `hospitalizedDischarged`; a state
//! with neither column populated reported nothing and emits nothing.

use crate::http::FetchError;
use crate::SourceAdapter;
use async_trait::async_trait;
use chrono::NaiveDate;
use episeries_core::registry::RegionRegistry;
use episeries_core::types::{Metric, RawObservation, SourceId};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

const DATE_FORMAT: &str = "%Y%m%d";

/// Adapter over the archived per-state daily CSV
pub struct CovidTrackingArchive {
    path: PathBuf,
}

impl CovidTrackingArchive {
    /// Create an adapter reading the archive at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceAdapter for CovidTrackingArchive {
    fn source(&self) -> SourceId {
        SourceId::CovidTracking
    }

    async fn fetch_raw(
        &self,
        registry: &RegionRegistry,
    ) -> Result<Vec<RawObservation>, FetchError> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        parse_archive(&body, registry)
    }
}

/// Parse the archive into recovery observations
pub fn parse_archive(
    text: &str,
    registry: &RegionRegistry,
) -> Result<Vec<RawObservation>, FetchError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let date_idx = column("date").ok_or_else(|| FetchError::MissingColumn {
        column: "date".to_string(),
        context: "COVID Tracking archive".to_string(),
    })?;
    let state_idx = column("state").ok_or_else(|| FetchError::MissingColumn {
        column: "state".to_string(),
        context: "COVID Tracking archive".to_string(),
    })?;
    let recovered_idx = column("recovered");
    let discharged_idx = column("hospitalizedDischarged");

    // (date, recovered, discharged) rows per state
    let mut per_state: BTreeMap<String, Vec<(NaiveDate, Option<i64>, Option<i64>)>> =
        BTreeMap::new();
    for record in reader.records() {
        let record = record?;
        let date_cell = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_cell, DATE_FORMAT).map_err(|_| {
            FetchError::BadDate {
                value: date_cell.to_string(),
                context: "COVID Tracking archive".to_string(),
            }
        })?;
        let state = record.get(state_idx).unwrap_or_default().to_string();
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|c| !c.is_empty())
                .and_then(|c| c.parse::<i64>().ok())
        };
        per_state.entry(state).or_default().push((
            date,
            cell(recovered_idx),
            cell(discharged_idx),
        ));
    }

    let mut observations = Vec::new();
    for (state, rows) in per_state {
        let identifier = format!("US_{state}");
        if RegionRegistry::is_excluded(&identifier) {
            continue;
        }
        let region = match registry.resolve(&identifier, SourceId::CovidTracking) {
            Ok(region) => region,
            Err(_) => {
                warn!(state, "no canonical mapping, dropping recovery rows");
                continue;
            }
        };

        // Prefer the recovered column; fall back to hospital discharges;
        // emit nothing when the state reported neither.
        let use_recovered = rows.iter().any(|(_, recovered, _)| recovered.is_some());
        let use_discharged =
            !use_recovered && rows.iter().any(|(_, _, discharged)| discharged.is_some());
        if !use_recovered && !use_discharged {
            continue;
        }

        for (date, recovered, discharged) in rows {
            let value = if use_recovered { recovered } else { discharged };
            observations.push(RawObservation {
                region: region.clone(),
                date,
                metric: Metric::Recovered,
                value,
                source: SourceId::CovidTracking,
            });
        }
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
date,state,recovered,hospitalizedDischarged
20200501,MI,100,
20200502,MI,120,
20200501,NY,,300
20200502,NY,,330
20200501,WY,,
20200502,WY,,
";

    #[test]
    fn recovered_column_preferred() {
        let observations = parse_archive(FIXTURE, &RegionRegistry::new()).unwrap();
        let michigan: Vec<_> = observations
            .iter()
            .filter(|o| o.region.as_str() == "US_MI")
            .collect();
        assert_eq!(michigan.len(), 2);
        assert_eq!(michigan[0].value, Some(100));
        assert!(michigan.iter().all(|o| o.metric == Metric::Recovered));
    }

    #[test]
    fn discharged_fallback_when_recovered_never_reported() {
        let observations = parse_archive(FIXTURE, &RegionRegistry::new()).unwrap();
        let new_york: Vec<_> = observations
            .iter()
            .filter(|o| o.region.as_str() == "US_NY")
            .collect();
        assert_eq!(new_york.len(), 2);
        assert_eq!(new_york[1].value, Some(330));
    }

    #[test]
    fn silent_states_emit_nothing() {
        let observations = parse_archive(FIXTURE, &RegionRegistry::new()).unwrap();
        assert!(observations.iter().all(|o| o.region.as_str() != "US_WY"));
    }

    #[test]
    fn malformed_date_is_an_error() {
        let fixture = "date,state,recovered,hospitalizedDischarged\nMay 1,MI,1,\n";
        let err = parse_archive(fixture, &RegionRegistry::new()).unwrap_err();
        assert!(matches!(err, FetchError::BadDate { .. }));
    }
}
