//! Monotonicity repair tuning

use serde::{Deserialize, Serialize};

/// Tuning for the interpolate-correct repair loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairSettings {
    /// Hard cap on corrective iterations before a region is skipped
    pub max_iterations: usize,

    /// Negative-difference tolerance for the convergence check
    pub tolerance: f64,

    /// Exclude the final (often partial) day from the repair window
    pub preserve_final_day: bool,
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            preserve_final_day: false,
        }
    }
}
