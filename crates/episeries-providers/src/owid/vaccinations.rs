//! OWID global vaccinations adapter

use super::{parse_feed, FeedSpec};
use crate::http::{get_text_with_retry, FetchError, RetryPolicy};
use crate::SourceAdapter;
use async_trait::async_trait;
use episeries_core::registry::RegionRegistry;
use episeries_core::types::{Metric, RawObservation, SourceId};
use tracing::info;

const SPEC: FeedSpec = FeedSpec {
    context: "OWID vaccinations feed",
    iso_column: "iso_code",
    date_column: "date",
    value_column: "total_vaccinations",
    metric: Metric::Vaccinations,
    source: SourceId::OwidVaccinations,
};

/// Adapter for the per-country total-doses feed
pub struct OwidVaccinationsSource {
    client: reqwest::Client,
    url: String,
    policy: RetryPolicy,
}

impl OwidVaccinationsSource {
    pub fn new(url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client: policy.client(),
            url: url.into(),
            policy,
        }
    }
}

#[async_trait]
impl SourceAdapter for OwidVaccinationsSource {
    fn source(&self) -> SourceId {
        SourceId::OwidVaccinations
    }

    async fn fetch_raw(
        &self,
        registry: &RegionRegistry,
    ) -> Result<Vec<RawObservation>, FetchError> {
        let body = get_text_with_retry(&self.client, &self.url, &self.policy).await?;
        let observations = parse_feed(&body, &SPEC, registry)?;
        info!(observations = observations.len(), "OWID vaccinations feed parsed");
        Ok(observations)
    }
}
