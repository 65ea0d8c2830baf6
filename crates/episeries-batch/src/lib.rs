//! Parallel reconciliation over many regions
//!
//! Regions are embarrassingly parallel: each series is built, repaired and
//! derived with no shared mutable state, so the engine fans out across a
//! bounded worker pool and collects per-region results at the end. One
//! region's failure never aborts the batch — the outcome is a partition into
//! succeeded series and failed regions with reasons.

pub mod engine;

pub use engine::{
    BatchOutcome, EngineConfig, ReconciliationEngine, RegionError, RegionFailure,
};
