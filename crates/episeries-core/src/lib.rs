//! Core time-series reconciliation algorithms
//!
//! Merges heterogeneous per-source raw observations into one canonical
//! per-region daily table, repairs data-revision artifacts in cumulative
//! counts, and derives daily new-count columns that never misreport a data
//! gap as a zero.
//!
//! ## Guarantees
//!
//! - Repaired cumulative columns are non-decreasing everywhere, or the
//!   region fails loudly with [`repair::RepairError::Irreparable`]
//! - Rows are contiguous by calendar day; a missing day is a sentinel row,
//!   never an absent one
//! - "Not reported" and "zero reported" stay distinct end-to-end
//! - Augmenting a finalized series never alters previously derived columns

pub mod augment;
pub mod builder;
pub mod deltas;
pub mod pchip;
pub mod registry;
pub mod repair;
pub mod types;

// Re-export commonly used types
pub use augment::augment;
pub use builder::{BuildError, QualityFilter, SeriesBuilder};
pub use deltas::derive_deltas;
pub use registry::{RegionRegistry, RegistryError};
pub use repair::{MonotonicityRepairer, RepairConfig, RepairError};
pub use types::{CanonicalSeries, Metric, RawObservation, RegionKey, SourceId};
