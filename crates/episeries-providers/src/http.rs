//! Shared HTTP fetch with bounded retry
//!
//! All adapters fetch through one primitive: GET the body as text, retrying
//! transient failures with exponential backoff up to a maximum attempt
//! count. A source that is still failing after the last attempt escalates —
//! the caller skips the affected regions and reports them rather than
//! failing the batch.

use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Fetch and normalization errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure on the final attempt
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Every attempt failed; the source is unreachable for this run
    #[error("giving up on {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: usize },

    /// Feed body was not parseable CSV
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Feed body was not parseable JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local archive read failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A cell that should hold a date did not
    #[error("unparseable date '{value}' in {context}")]
    BadDate { value: String, context: String },

    /// The feed dropped a column the adapter depends on
    #[error("missing column '{column}' in {context}")]
    MissingColumn { column: String, context: String },
}

/// Retry tuning for one adapter
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts before escalating
    pub attempts: usize,

    /// Delay before the second attempt; doubles for each retry after it
    pub base_delay: Duration,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Build the HTTP client this policy's requests go through
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .expect("failed to build HTTP client")
    }
}

/// GET `url` as text, retrying with exponential backoff
pub async fn get_text_with_retry(
    client: &reqwest::Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String, FetchError> {
    let mut delay = policy.base_delay;
    for attempt in 1..=policy.attempts {
        let result = async {
            let response = client.get(url).send().await?.error_for_status()?;
            response.text().await
        }
        .await;

        match result {
            Ok(body) => return Ok(body),
            Err(source) if attempt == policy.attempts => {
                warn!(url, attempt, error = %source, "fetch failed, retries exhausted");
                return Err(FetchError::Http {
                    url: url.to_string(),
                    source,
                });
            }
            Err(source) => {
                warn!(url, attempt, delay_ms = delay.as_millis() as u64, error = %source, "fetch failed, backing off");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
    Err(FetchError::RetriesExhausted {
        url: url.to_string(),
        attempts: policy.attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_fetch_contract() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
    }
}
