//! Region quality filter thresholds

use serde::{Deserialize, Serialize};

/// Minimum peak cumulative counts a region must reach to be processed
///
/// Defaults match the primary feed's long-standing minimums: at least a
/// handful of cases, at least one recorded recovery, deaths optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub min_cases: i64,
    pub min_recover: i64,
    pub min_deaths: i64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_cases: 5,
            min_recover: 1,
            min_deaths: 0,
        }
    }
}
