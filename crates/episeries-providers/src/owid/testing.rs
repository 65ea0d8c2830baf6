//! OWID testing observations adapter

use super::{parse_feed, FeedSpec};
use crate::http::{get_text_with_retry, FetchError, RetryPolicy};
use crate::SourceAdapter;
use async_trait::async_trait;
use episeries_core::registry::RegionRegistry;
use episeries_core::types::{Metric, RawObservation, SourceId};
use tracing::info;

const SPEC: FeedSpec = FeedSpec {
    context: "OWID testing feed",
    iso_column: "ISO code",
    date_column: "Date",
    value_column: "Cumulative total",
    metric: Metric::Tests,
    source: SourceId::OwidTesting,
};

/// Adapter for the per-country cumulative testing feed
pub struct OwidTestingSource {
    client: reqwest::Client,
    url: String,
    policy: RetryPolicy,
}

impl OwidTestingSource {
    pub fn new(url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client: policy.client(),
            url: url.into(),
            policy,
        }
    }
}

#[async_trait]
impl SourceAdapter for OwidTestingSource {
    fn source(&self) -> SourceId {
        SourceId::OwidTesting
    }

    async fn fetch_raw(
        &self,
        registry: &RegionRegistry,
    ) -> Result<Vec<RawObservation>, FetchError> {
        let body = get_text_with_retry(&self.client, &self.url, &self.policy).await?;
        let observations = parse_feed(&body, &SPEC, registry)?;
        info!(observations = observations.len(), "OWID testing feed parsed");
        Ok(observations)
    }
}
