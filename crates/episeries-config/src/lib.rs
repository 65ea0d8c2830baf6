//! Configuration management for episeries
//!
//! Centralized configuration handling with support for:
//! - Default values
//! - Configuration files (TOML)
//! - Environment variables
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables (`EPISERIES_` prefix)
//! 2. Configuration file (`episeries.toml`)
//! 3. Default values

mod app;
mod data;
mod filter;
mod repair;

// Re-export main types
pub use app::AppConfig;
pub use data::DataConfig;
pub use filter::FilterConfig;
pub use repair::RepairSettings;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure containing all configuration categories
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application-wide settings
    pub app: AppConfig,

    /// Data source and fetch configuration
    pub data: DataConfig,

    /// Region quality filter thresholds
    pub filter: FilterConfig,

    /// Monotonicity repair tuning
    pub repair: RepairSettings,
}

impl Settings {
    /// Load configuration from multiple sources with proper precedence
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&Settings::default())?)
            // Add configuration file if it exists
            .add_source(
                config::File::with_name("episeries")
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            // Add environment variables with EPISERIES_ prefix
            .add_source(
                config::Environment::with_prefix("EPISERIES")
                    .prefix_separator("_")
                    .separator("_"),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::from(path).format(config::FileFormat::Toml));

        let config = builder.build()?;
        config.try_deserialize()
    }
}
