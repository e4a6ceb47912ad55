//! Stable evaluation of `ε(x) = (e^x - 1)/x` and its derivatives.
//!
//! The default-contingent leg integrals of the ISDA model reduce, over a knot
//! interval, to expressions of the form `(b0 - b1)/x` with `b1 = b0·e^{-x}`,
//! where `x` is the combined hazard and discount increment. When `x` is tiny
//! the direct difference loses all precision, so the integrals switch to
//! `b0·ε(-x)` and friends.
//!
//! | Function | Closed form |
//! |----------|-------------|
//! | [`epsilon`] | `(e^x - 1)/x` |
//! | [`epsilon_p`] | `((x - 1)e^x + 1)/x²` |
//! | [`epsilon_pp`] | `((x² - 2x + 2)e^x - 2)/x³` |
//!
//! All three equal their Taylor series `Σ x^m / (m!·(m + k + 1))` (for the
//! `k`-th derivative), which is used for `|x|` below [`TAYLOR_THRESHOLD`].

/// Below this magnitude the Taylor series is used instead of the closed form.
pub const TAYLOR_THRESHOLD: f64 = 0.1;

/// Number of Taylor terms; the truncation error at the threshold is below 1e-20.
const TAYLOR_TERMS: u32 = 12;

/// `ε(x) = (e^x - 1)/x`, with `ε(0) = 1`.
///
/// # Example
///
/// ```rust
/// use hazard_math::epsilon::epsilon;
///
/// assert!((epsilon(0.0) - 1.0).abs() < 1e-16);
/// assert!((epsilon(1.0) - (1.0_f64.exp() - 1.0)).abs() < 1e-15);
/// ```
#[must_use]
pub fn epsilon(x: f64) -> f64 {
    if x.abs() > TAYLOR_THRESHOLD {
        x.exp_m1() / x
    } else {
        taylor(x, 0)
    }
}

/// First derivative of [`epsilon`]: `((x - 1)e^x + 1)/x²`, with `ε'(0) = 1/2`.
#[must_use]
pub fn epsilon_p(x: f64) -> f64 {
    if x.abs() > TAYLOR_THRESHOLD {
        ((x - 1.0) * x.exp_m1() + x) / (x * x)
    } else {
        taylor(x, 1)
    }
}

/// Second derivative of [`epsilon`]: `((x² - 2x + 2)e^x - 2)/x³`, with `ε''(0) = 1/3`.
#[must_use]
pub fn epsilon_pp(x: f64) -> f64 {
    if x.abs() > TAYLOR_THRESHOLD {
        let x2 = x * x;
        (x.exp_m1() * (x2 - 2.0 * x + 2.0) + x2 - 2.0 * x) / (x2 * x)
    } else {
        taylor(x, 2)
    }
}

/// Taylor series of the `k`-th derivative of `ε` around zero.
fn taylor(x: f64, k: u32) -> f64 {
    let mut sum = 0.0;
    // x^m / m!
    let mut power = 1.0;
    for m in 0..TAYLOR_TERMS {
        sum += power / f64::from(m + k + 1);
        power *= x / f64::from(m + 1);
    }
    sum
}
