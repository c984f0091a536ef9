//! Analysis options

use serde::{Deserialize, Serialize};

/// Options for a stack stress solve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Sample radii per layer used for stress extremes
    pub samples_per_layer: usize,
    /// Re-check interface continuity after each solve
    pub check_continuity: bool,
    /// Relative tolerance for the continuity check
    pub continuity_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            samples_per_layer: 64,
            check_continuity: true,
            continuity_tolerance: 1e-6,
        }
    }
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of sample radii per layer (at least 2)
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples_per_layer = samples.max(2);
        self
    }

    /// Skip the post-solve continuity check
    pub fn without_continuity_check(mut self) -> Self {
        self.check_continuity = false;
        self
    }

    /// Set the continuity tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.continuity_tolerance = tol;
        self
    }
}
