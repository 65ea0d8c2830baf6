//! Monotonicity repair for cumulative columns
//!
//! Raw sources occasionally revise cumulative totals downward (recount
//! corrections) or report a temporary reset to zero. Left alone, those
//! artifacts turn into negative daily counts downstream. The repairer nulls
//! the offending days, bridges them with monotone PCHIP interpolation, and
//! runs a bounded corrective loop for residual negative differences that
//! interpolation alone cannot remove. It never returns a cumulative column
//! whose first difference is negative anywhere — a column it cannot fix
//! within the iteration cap is an error, not a silent approximation.

use crate::pchip;
use crate::types::{CanonicalSeries, Metric, RegionKey};
use thiserror::Error;
use tracing::debug;

/// Repair failure: the corrective loop did not converge
#[derive(Debug, Error)]
pub enum RepairError {
    /// The column still had negative first differences after the iteration
    /// cap. Indicates a data anomaly requiring manual review; the region
    /// must be skipped, never emitted with a decreasing cumulative count.
    #[error(
        "cumulative {metric} for {region} could not be made non-decreasing \
         within {iterations} iterations"
    )]
    Irreparable {
        region: RegionKey,
        metric: Metric,
        iterations: usize,
    },
}

/// Tuning knobs for the repair loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepairConfig {
    /// Hard cap on interpolate-correct iterations before giving up
    pub max_iterations: usize,

    /// Differences above `-tolerance` count as non-negative; guards the
    /// loop against floating-point equality churn
    pub tolerance: f64,

    /// Exclude the final row from the repair window and re-append it
    /// unchanged (it is often a partial count still being revised upstream).
    /// The seam is clamped so the postcondition holds either way.
    pub preserve_final_day: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            preserve_final_day: false,
        }
    }
}

/// Repairs cumulative-count regressions via nulling + monotone interpolation
#[derive(Debug, Clone, Default)]
pub struct MonotonicityRepairer {
    config: RepairConfig,
}

impl MonotonicityRepairer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RepairConfig) -> Self {
        Self { config }
    }

    /// Repair one cumulative column, returning an updated copy of the series
    ///
    /// The input series is never mutated. A column whose first differences
    /// are already non-negative everywhere is returned unchanged, so the
    /// operation is idempotent.
    ///
    /// # Errors
    ///
    /// [`RepairError::Irreparable`] if negative differences survive the
    /// bounded corrective loop.
    pub fn repair(
        &self,
        series: &CanonicalSeries,
        metric: Metric,
    ) -> Result<CanonicalSeries, RepairError> {
        let mut repaired = series.clone();
        let column = repaired.cumulative_mut(metric);
        self.repair_column(column, &series.region, metric)?;
        Ok(repaired)
    }

    /// Repair a bare cumulative column in place
    ///
    /// Exposed so the augmentation path can reuse the identical primitive.
    pub fn repair_column(
        &self,
        column: &mut [Option<i64>],
        region: &RegionKey,
        metric: Metric,
    ) -> Result<(), RepairError> {
        let n = column.len();
        let window = if self.config.preserve_final_day && n > 1 {
            n - 1
        } else {
            n
        };

        let mut work: Vec<f64> = column[..window]
            .iter()
            .map(|v| v.map(|c| c as f64).unwrap_or(f64::NAN))
            .collect();

        if !has_negative_difference(&work) {
            self.clamp_final_day(column, window);
            return Ok(());
        }

        let Some(first_nonzero) = work.iter().position(|v| !v.is_nan() && *v > 0.0) else {
            // Negative differences but no positive value cannot happen for
            // cumulative counts (they are never negative); nothing to do.
            return Ok(());
        };

        let column_max = work
            .iter()
            .filter(|v| !v.is_nan())
            .fold(f64::MIN, |a, &b| a.max(b));

        // Null (a) zero-resets after the first non-zero day and (b) days whose
        // delta against the last reported value would be negative. Deltas are
        // judged on the raw values, before any nulling takes effect.
        let raw = work.clone();
        let mut last_reported = raw[first_nonzero];
        for i in first_nonzero + 1..window {
            if raw[i].is_nan() {
                continue;
            }
            if raw[i] == 0.0 || raw[i] < last_reported {
                work[i] = f64::NAN;
            }
            last_reported = raw[i];
        }

        // An interpolation endpoint must never be null
        if work[window - 1].is_nan() {
            work[window - 1] = column_max;
        }

        let mut converged = false;
        for iteration in 0..self.config.max_iterations {
            let mut interpolated = work.clone();
            pchip::fill_gaps(&mut interpolated);

            let negatives = negative_difference_days(&interpolated, self.config.tolerance);
            if negatives.is_empty() {
                work = interpolated;
                converged = true;
                break;
            }

            debug!(
                region = %region,
                metric = %metric,
                iteration,
                count = negatives.len(),
                "raising days with residual negative differences"
            );
            // Raise each offending day to its predecessor, making the
            // difference exactly zero. The raised day becomes an anchor for
            // the next interpolation pass, so the loop strictly progresses.
            for (prev, day) in negatives {
                work[day] = interpolated[prev];
            }
        }

        if !converged {
            return Err(RepairError::Irreparable {
                region: region.clone(),
                metric,
                iterations: self.config.max_iterations,
            });
        }

        // Integer write-back. A sub-tolerance wiggle can round into a
        // 1-unit decrease, so reported values are clamped to the running
        // maximum — the same raise-to-predecessor rule at count precision.
        let mut running_max = i64::MIN;
        for (slot, value) in column[..window].iter_mut().zip(&work) {
            *slot = if value.is_nan() {
                None
            } else {
                running_max = running_max.max(value.round() as i64);
                Some(running_max)
            };
        }
        self.clamp_final_day(column, window);

        // Postcondition: first differences of the written column are >= 0
        if integer_column_decreases(column) {
            return Err(RepairError::Irreparable {
                region: region.clone(),
                metric,
                iterations: self.config.max_iterations,
            });
        }
        Ok(())
    }

    /// With `preserve_final_day`, the untouched final value may sit below the
    /// repaired day before it; raise it to the seam so the postcondition
    /// holds for the full column.
    fn clamp_final_day(&self, column: &mut [Option<i64>], window: usize) {
        if window == column.len() {
            return;
        }
        let prior = column[..window]
            .iter()
            .rev()
            .find_map(|v| *v);
        if let (Some(prior), Some(last)) = (prior, column[column.len() - 1]) {
            if last < prior {
                column[column.len() - 1] = Some(prior);
            }
        }
    }
}

/// Any negative first difference between consecutively reported values?
///
/// Differences bridge `NaN` gaps: the comparison is always against the last
/// reported value, so a drop hidden behind missing days still counts.
fn has_negative_difference(values: &[f64]) -> bool {
    let mut last_reported = f64::NAN;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        if !last_reported.is_nan() && v < last_reported {
            return true;
        }
        last_reported = v;
    }
    false
}

/// Days whose difference against the previous reported day is negative,
/// as `(previous_day, day)` index pairs
fn negative_difference_days(values: &[f64], tolerance: f64) -> Vec<(usize, usize)> {
    let mut negatives = Vec::new();
    let mut last: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if let Some(prev) = last {
            if v - values[prev] < -tolerance {
                negatives.push((prev, i));
            }
        }
        last = Some(i);
    }
    negatives
}

fn integer_column_decreases(column: &[Option<i64>]) -> bool {
    let mut last: Option<i64> = None;
    for v in column.iter().flatten() {
        if let Some(prev) = last {
            if *v < prev {
                return true;
            }
        }
        last = Some(*v);
    }
    false
}
