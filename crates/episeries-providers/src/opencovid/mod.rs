//! OpenCOVID Canada provincial adapter
//!
//! JSON API with one endpoint per statistic. Provinces are reported under
//! their short names and map to `CA_*` canonical keys; the synthetic
//! "Repatriated" bucket has no region and is dropped.

use crate::http::{get_text_with_retry, FetchError, RetryPolicy};
use crate::SourceAdapter;
use async_trait::async_trait;
use chrono::NaiveDate;
use episeries_core::registry::RegionRegistry;
use episeries_core::types::{Metric, RawObservation, RegionKey, SourceId};
use tracing::{debug, info};

const DATE_FORMAT: &str = "%d-%m-%Y";

/// Provinces the API reports, as it spells them
const PROVINCES: &[&str] = &[
    "Alberta",
    "BC",
    "Manitoba",
    "New Brunswick",
    "NL",
    "Nova Scotia",
    "Nunavut",
    "NWT",
    "Ontario",
    "PEI",
    "Quebec",
    "Saskatchewan",
    "Yukon",
];

/// Per-statistic endpoint layout: (stat, date field, cumulative field, metric)
const STATS: &[(&str, &str, &str, Metric)] = &[
    ("cases", "date_report", "cumulative_cases", Metric::Cases),
    ("mortality", "date_death_report", "cumulative_deaths", Metric::Deaths),
    ("recovered", "date_recovery", "cumulative_recovered", Metric::Recovered),
];

/// Adapter for the provincial timeseries API
pub struct OpenCovidSource {
    client: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl OpenCovidSource {
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client: policy.client(),
            base_url: base_url.into(),
            policy,
        }
    }

    fn stat_url(&self, stat: &str) -> String {
        format!("{}?stat={}&loc=prov", self.base_url, stat)
    }
}

#[async_trait]
impl SourceAdapter for OpenCovidSource {
    fn source(&self) -> SourceId {
        SourceId::OpenCovidCanada
    }

    async fn fetch_raw(
        &self,
        _registry: &RegionRegistry,
    ) -> Result<Vec<RawObservation>, FetchError> {
        let mut observations = Vec::new();
        for &(stat, date_field, value_field, metric) in STATS {
            let url = self.stat_url(stat);
            let body = get_text_with_retry(&self.client, &url, &self.policy).await?;
            let parsed = parse_timeseries(&body, stat, date_field, value_field, metric)?;
            info!(stat, observations = parsed.len(), "OpenCOVID feed parsed");
            observations.extend(parsed);
        }
        Ok(observations)
    }
}

/// Parse one statistic's JSON body into raw observations
pub fn parse_timeseries(
    text: &str,
    stat: &str,
    date_field: &str,
    value_field: &str,
    metric: Metric,
) -> Result<Vec<RawObservation>, FetchError> {
    let body: serde_json::Value = serde_json::from_str(text)?;
    let records = body
        .get(stat)
        .and_then(|v| v.as_array())
        .ok_or_else(|| FetchError::MissingColumn {
            column: stat.to_string(),
            context: "OpenCOVID response".to_string(),
        })?;

    let mut observations = Vec::new();
    for record in records {
        let Some(province) = record.get("province").and_then(|v| v.as_str()) else {
            continue;
        };
        if !PROVINCES.contains(&province) {
            debug!(province, "unmapped province dropped");
            continue;
        }
        let date_cell = record
            .get(date_field)
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_cell, DATE_FORMAT).map_err(|_| {
            FetchError::BadDate {
                value: date_cell.to_string(),
                context: format!("OpenCOVID {stat} feed"),
            }
        })?;
        let value = record.get(value_field).and_then(|v| {
            v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64))
        });

        observations.push(RawObservation {
            region: RegionKey::new(format!("CA_{province}")),
            date,
            metric,
            value,
            source: SourceId::OpenCovidCanada,
        });
    }
    Ok(observations)
}
