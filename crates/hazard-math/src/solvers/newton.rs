//! Newton-Raphson root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Derivatives smaller than this are treated as zero.
const MIN_DERIVATIVE: f64 = 1e-15;

/// Newton-Raphson root-finding algorithm.
///
/// Uses the iteration:
/// `x_{n+1} = x_n - f(x_n) / f'(x_n)`
///
/// This method has quadratic convergence near the root but requires
/// the derivative of the function.
///
/// # Arguments
///
/// * `f` - The function for which to find a root
/// * `df` - The derivative of the function
/// * `initial_guess` - Starting point for the iteration
/// * `config` - Solver configuration
///
/// # Example
///
/// ```rust
/// use hazard_math::solvers::{newton_raphson, SolverConfig};
///
/// // Find root of x^2 - 2 (i.e., sqrt(2))
/// let f = |x: f64| x * x - 2.0;
/// let df = |x: f64| 2.0 * x;
///
/// let result = newton_raphson(f, df, 1.5, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn newton_raphson<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    newton_raphson_fdf(|x| (f(x), df(x)), initial_guess, config)
}

/// Newton-Raphson where one closure returns `(f(x), f'(x))`.
///
/// The closure is `FnMut`, so it may update state it owns between
/// evaluations (the credit curve bootstrap writes the trial rate into the
/// curve node being solved).
///
/// Convergence is declared when `|f(x)| < tolerance` or when the Newton step
/// is smaller than `tolerance`.
pub fn newton_raphson_fdf<F>(
    mut fdf: F,
    initial_guess: f64,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: FnMut(f64) -> (f64, f64),
{
    let mut x = initial_guess;

    for iteration in 0..config.max_iterations {
        let (fx, dfx) = fdf(x);

        if !fx.is_finite() {
            return Err(MathError::NonFinite { x, value: fx });
        }

        // Check for convergence
        if fx.abs() < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        // Check for zero derivative
        if !(dfx.abs() >= MIN_DERIVATIVE) {
            return Err(MathError::DivisionByZero { value: dfx });
        }

        // Newton step
        let step = fx / dfx;
        x -= step;
        tracing::trace!(iteration, x, residual = fx, "newton step");

        // Check for step convergence
        if step.abs() < config.tolerance {
            let (final_fx, _) = fdf(x);
            return Ok(SolverResult {
                root: x,
                iterations: iteration + 1,
                residual: final_fx,
            });
        }
    }

    let (fx, _) = fdf(x);
    Err(MathError::convergence_failed(config.max_iterations, fx.abs()))
}
