//! Johns Hopkins CSSE global time-series adapter
//!
//! One wide CSV per metric: a row per country/province, a column per day.
//! The adapter keeps whole-country rows, sums the three countries that only
//! report province-level rows, and drops the cruise ships and micro-states
//! that are excluded from every run.

mod parse;

pub use parse::parse_global_csv;

use crate::http::{get_text_with_retry, FetchError, RetryPolicy};
use crate::SourceAdapter;
use async_trait::async_trait;
use episeries_core::registry::RegionRegistry;
use episeries_core::types::{Metric, RawObservation, SourceId};
use tracing::info;

/// Metric feed files, by upstream file-name stem
const METRIC_FILES: &[(&str, Metric)] = &[
    ("confirmed", Metric::Cases),
    ("deaths", Metric::Deaths),
    ("recovered", Metric::Recovered),
];

/// Adapter for the JHU CSSE global feed
pub struct JhuGlobalSource {
    client: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl JhuGlobalSource {
    /// Create an adapter rooted at the feed's base URL
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client: policy.client(),
            base_url: base_url.into(),
            policy,
        }
    }

    fn metric_url(&self, stem: &str) -> String {
        format!("{}time_series_covid19_{}_global.csv", self.base_url, stem)
    }
}

#[async_trait]
impl SourceAdapter for JhuGlobalSource {
    fn source(&self) -> SourceId {
        SourceId::JhuGlobal
    }

    async fn fetch_raw(
        &self,
        registry: &RegionRegistry,
    ) -> Result<Vec<RawObservation>, FetchError> {
        let mut observations = Vec::new();
        for &(stem, metric) in METRIC_FILES {
            let url = self.metric_url(stem);
            let body = get_text_with_retry(&self.client, &url, &self.policy).await?;
            let parsed = parse_global_csv(&body, metric, registry)?;
            info!(metric = %metric, observations = parsed.len(), "JHU global feed parsed");
            observations.extend(parsed);
        }
        Ok(observations)
    }
}
