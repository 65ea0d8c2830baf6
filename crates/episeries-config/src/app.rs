//! Application-wide settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Directory holding static tables and emitted artifacts
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: PathBuf::from("./data"),
        }
    }
}
