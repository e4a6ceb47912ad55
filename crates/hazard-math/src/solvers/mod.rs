//! Root-finding algorithms.
//!
//! The bootstrap solves one scalar equation per curve node and always has the
//! analytic derivative available, so Newton-Raphson is the only solver here:
//!
//! - [`newton_raphson`]: value and derivative supplied as two functions
//! - [`newton_raphson_fdf`]: value and derivative supplied by one function,
//!   for callers that compute both from shared (possibly mutable) state
//!
//! # Example
//!
//! ```rust
//! use hazard_math::solvers::{newton_raphson_fdf, SolverConfig};
//!
//! // Survival-style equation: find h with exp(-5h) = 0.92
//! let result = newton_raphson_fdf(
//!     |h: f64| ((-5.0 * h).exp() - 0.92, -5.0 * (-5.0 * h).exp()),
//!     0.01,
//!     &SolverConfig::default(),
//! )
//! .unwrap();
//! assert!((result.root - (-(0.92_f64).ln() / 5.0)).abs() < 1e-10);
//! ```

mod newton;

pub use newton::{newton_raphson, newton_raphson_fdf};

use crate::error::{MathError, MathResult};

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Tolerance for convergence (applied to both residual and step size).
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Checks that the configuration can drive a solver.
    pub fn validate(&self) -> MathResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(MathError::invalid_input(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(MathError::invalid_input("max_iterations must be at least 1"));
        }
        Ok(())
    }
}

/// Result of a root-finding iteration.
#[derive(Debug, Clone, Copy)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final residual (function value at root).
    pub residual: f64,
}
