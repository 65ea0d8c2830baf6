//! Canonical epidemiological time-series reconciliation.
//!
//! This crate turns daily counts from multiple independent, inconsistent
//! public sources into one canonical per-region daily table suitable for
//! downstream statistical fitting: cumulative columns never decrease, daily
//! columns never misreport a data gap as zero, and every region succeeds or
//! fails on its own.
//!
//! ## Meta-Crate
//!
//! This is a meta-crate that re-exports the episeries sub-crates. Code with
//! narrow needs should depend on specific sub-crates directly:
//!
//! - `episeries-core` - Data model, builder, repair, deltas, augmentation
//! - `episeries-providers` - Source adapters (JHU, CTP, OWID, OpenCOVID)
//! - `episeries-config` - Configuration management
//! - `episeries-io` - Artifact and static-table I/O
//! - `episeries-batch` - Parallel batch engine
//!
//! ## Features
//!
//! - `core` - Data model and algorithms (always enabled)
//! - `providers` - Source adapters
//! - `config` - Configuration management
//! - `io` - Artifact I/O
//! - `batch` - Parallel batch engine
//! - `full` - Enable everything (default)
//!
//! ## Basic Usage
//!
//! ```rust
//! use episeries::core::builder::SeriesBuilder;
//! use episeries::core::types::{Metric, RawObservation, RegionKey, SourceId};
//! use episeries::core::{derive_deltas, MonotonicityRepairer};
//!
//! let region = RegionKey::new("Italy");
//! let start = chrono::NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
//! let observations: Vec<RawObservation> = [10, 20, 15, 30]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, value)| RawObservation {
//!         region: region.clone(),
//!         date: start + chrono::Duration::days(i as i64),
//!         metric: Metric::Cases,
//!         value: Some(*value),
//!         source: SourceId::JhuGlobal,
//!     })
//!     .collect();
//!
//! let builder = SeriesBuilder::new(vec![SourceId::JhuGlobal]);
//! let series = builder.build(&region, &observations).unwrap();
//! let repaired = MonotonicityRepairer::new()
//!     .repair(&series, Metric::Cases)
//!     .unwrap();
//! let finalized = derive_deltas(&repaired);
//! assert!(finalized.new_cases.iter().flatten().all(|d| *d >= 0));
//! ```

pub use episeries_core as core;

#[cfg(feature = "batch")]
pub use episeries_batch as batch;

#[cfg(feature = "config")]
pub use episeries_config as config;

#[cfg(feature = "io")]
pub use episeries_io as io;

#[cfg(feature = "providers")]
pub use episeries_providers as providers;

// Most-used types at the top level
pub use episeries_core::{
    augment, derive_deltas, CanonicalSeries, Metric, MonotonicityRepairer, RawObservation,
    RegionKey, SourceId,
};
