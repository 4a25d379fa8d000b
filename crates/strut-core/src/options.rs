//! Solver configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for the simplex solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverOptions {
    /// Values with an absolute value below this are treated as zero when
    /// pruning tableau cells and testing feasibility.
    pub epsilon: f64,
}

impl SolverOptions {
    pub const DEFAULT_EPSILON: f64 = 1e-8;

    /// Options with a custom tolerance. Non-positive or non-finite values
    /// fall back to the default.
    pub fn with_epsilon(epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon > 0.0 {
            Self { epsilon }
        } else {
            log::warn!(
                "Invalid solver epsilon {}, using {}",
                epsilon,
                Self::DEFAULT_EPSILON
            );
            Self::default()
        }
    }

    /// Near-zero check against the configured tolerance.
    pub fn near_zero(&self, value: f64) -> bool {
        value.abs() < self.epsilon
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            epsilon: Self::DEFAULT_EPSILON,
        }
    }
}
