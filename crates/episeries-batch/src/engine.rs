//! Batch reconciliation engine
//!
//! Drives the per-region pipeline (build -> repair -> derive) across all
//! regions of a run. Stages within one region are strictly sequential —
//! each consumes the previous stage's table — and hold no locks and no I/O;
//! cancellation is checked between regions only, so a partially repaired
//! series is never observable.

use episeries_core::builder::{BuildError, QualityFilter, SeriesBuilder};
use episeries_core::registry::RegionRegistry;
use episeries_core::repair::{MonotonicityRepairer, RepairConfig, RepairError};
use episeries_core::types::{CanonicalSeries, Metric, RawObservation, RegionKey, SourceId};
use episeries_core::derive_deltas;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{info, warn};

/// Why one region produced no series
#[derive(Debug, Error)]
pub enum RegionError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Repair(#[from] RepairError),
}

/// One failed region with its reason; reported, never fatal to the batch
#[derive(Debug)]
pub struct RegionFailure {
    pub region: RegionKey,
    pub error: RegionError,
}

/// Batch result: the succeeded/failed partition plus regions skipped by a
/// cancellation request
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub series: Vec<CanonicalSeries>,
    pub failures: Vec<RegionFailure>,
    pub cancelled: Vec<RegionKey>,
}

impl BatchOutcome {
    /// Regions that produced a finalized series
    pub fn succeeded_regions(&self) -> Vec<&RegionKey> {
        self.series.iter().map(|s| &s.region).collect()
    }
}

/// Engine construction parameters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Source priority order handed to the series builder
    pub priority: Vec<SourceId>,

    /// Region quality filter; `None` admits every region
    pub filter: Option<QualityFilter>,

    /// Repair loop tuning
    pub repair: RepairConfig,

    /// Worker pool size; `None` uses all available cores
    pub max_concurrent_regions: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            priority: vec![
                SourceId::JhuGlobal,
                SourceId::OpenCovidCanada,
                SourceId::CovidTracking,
                SourceId::OwidTesting,
                SourceId::OwidVaccinations,
            ],
            filter: Some(QualityFilter::default()),
            repair: RepairConfig::default(),
            max_concurrent_regions: None,
        }
    }
}

/// Parallel per-region reconciliation engine
pub struct ReconciliationEngine {
    builder: SeriesBuilder,
    repairer: MonotonicityRepairer,
    filter: Option<QualityFilter>,
    max_concurrent_regions: Option<usize>,
}

impl ReconciliationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            builder: SeriesBuilder::new(config.priority),
            repairer: MonotonicityRepairer::with_config(config.repair),
            filter: config.filter,
            max_concurrent_regions: config.max_concurrent_regions,
        }
    }

    /// Run the pipeline for every region present in `observations`
    ///
    /// `cancel` is polled between regions: regions not yet started when it
    /// flips are reported as cancelled, regions already in flight finish
    /// normally.
    pub fn run(
        &self,
        observations: Vec<RawObservation>,
        registry: &RegionRegistry,
        cancel: &AtomicBool,
    ) -> BatchOutcome {
        let mut grouped: BTreeMap<RegionKey, Vec<RawObservation>> = BTreeMap::new();
        for obs in observations {
            grouped.entry(obs.region.clone()).or_default().push(obs);
        }

        if let Some(filter) = &self.filter {
            grouped.retain(|region, obs| {
                let keep = filter.passes(obs);
                if !keep {
                    info!(region = %region, "below quality thresholds, skipping");
                }
                keep
            });
        }

        let regions: Vec<(RegionKey, Vec<RawObservation>)> = grouped.into_iter().collect();
        info!(regions = regions.len(), "reconciliation batch starting");

        let process_all = || {
            regions
                .into_par_iter()
                .map(|(region, obs)| {
                    if cancel.load(Ordering::Relaxed) {
                        return (region, None);
                    }
                    let result = self.process_region(&region, &obs, registry);
                    (region, Some(result))
                })
                .collect::<Vec<_>>()
        };

        let results = match self.worker_pool() {
            Some(pool) => pool.install(process_all),
            None => process_all(),
        };

        let mut outcome = BatchOutcome::default();
        for (region, result) in results {
            match result {
                Some(Ok(series)) => outcome.series.push(series),
                Some(Err(error)) => {
                    warn!(region = %region, error = %error, "region failed");
                    outcome.failures.push(RegionFailure { region, error });
                }
                None => outcome.cancelled.push(region),
            }
        }
        info!(
            succeeded = outcome.series.len(),
            failed = outcome.failures.len(),
            cancelled = outcome.cancelled.len(),
            "reconciliation batch finished"
        );
        outcome
    }

    /// Build, repair and derive one region's series
    ///
    /// Primary cumulative columns go through monotonicity repair; secondary
    /// metrics merged later via augmentation carry their own gap handling.
    pub fn process_region(
        &self,
        region: &RegionKey,
        observations: &[RawObservation],
        registry: &RegionRegistry,
    ) -> Result<CanonicalSeries, RegionError> {
        let mut series = self.builder.build(region, observations)?;
        series.population = registry.population(region);
        for metric in Metric::PRIMARY {
            series = self.repairer.repair(&series, metric)?;
        }
        Ok(derive_deltas(&series))
    }

    fn worker_pool(&self) -> Option<rayon::ThreadPool> {
        let threads = self.max_concurrent_regions?;
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .ok()
    }
}
