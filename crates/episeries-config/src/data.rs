//! Data source and fetch configuration

use serde::{Deserialize, Serialize};

/// Data source and fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Base URL for the JHU CSSE time-series repository
    pub jhu_base_url: String,

    /// URL of the OWID testing observations CSV
    pub owid_testing_url: String,

    /// URL of the OWID global vaccinations CSV
    pub owid_vaccinations_url: String,

    /// Base URL of the OpenCOVID Canada timeseries API
    pub opencovid_base_url: String,

    /// File name of the archived COVID Tracking Project recovery CSV,
    /// resolved relative to the data directory
    pub covidtracking_archive: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Number of fetch attempts before a source is escalated to a skip
    pub retry_attempts: usize,

    /// Base delay between retry attempts in milliseconds; doubles per retry
    pub retry_delay_ms: u64,

    /// Upper bound on regions processed concurrently
    pub max_concurrent_regions: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            jhu_base_url: "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/"
                .to_string(),
            owid_testing_url: "https://raw.githubusercontent.com/owid/covid-19-data/master/public/data/testing/covid-testing-all-observations.csv"
                .to_string(),
            owid_vaccinations_url: "https://raw.githubusercontent.com/owid/covid-19-data/master/public/data/vaccinations/vaccinations.csv"
                .to_string(),
            opencovid_base_url: "https://api.opencovid.ca/timeseries".to_string(),
            covidtracking_archive: "covid-tracking-project-recovery.csv".to_string(),
            request_timeout_secs: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            max_concurrent_regions: 8,
        }
    }
}
