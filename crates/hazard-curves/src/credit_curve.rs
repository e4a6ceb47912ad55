//! ISDA credit (survival) curve.
//!
//! The credit curve stores zero hazard rates at its nodes. Survival to `t` is
//! `Q(t) = exp(-RT(t))`, so the hazard rates play the role a zero rate plays
//! in a discount curve and the forward hazard rate is flat between nodes.
//!
//! During calibration the curve is mutated one node at a time with
//! [`CreditCurve::set_rate`]; the leg valuation code reads `RT` together with
//! its derivative with respect to a single node through
//! [`CreditCurve::rt_and_sensitivity`].

use crate::error::CurveResult;
use crate::isda_curve::IsdaCurve;

/// Piecewise-flat forward hazard curve.
///
/// # Example
///
/// ```rust
/// use hazard_curves::CreditCurve;
///
/// let curve = CreditCurve::new(vec![1.0, 5.0], vec![0.01, 0.02]).unwrap();
/// assert!((curve.survival_probability(5.0) - (-0.1_f64).exp()).abs() < 1e-15);
/// // Forward hazard on (1, 5]: (0.10 - 0.01) / 4
/// assert!((curve.forward_hazard_rate(3.0) - 0.0225).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CreditCurve {
    inner: IsdaCurve,
}

impl CreditCurve {
    /// Creates a credit curve from node times and zero hazard rates.
    pub fn new(times: Vec<f64>, rates: Vec<f64>) -> CurveResult<Self> {
        Ok(Self {
            inner: IsdaCurve::new(times, rates)?,
        })
    }

    /// A curve with the given node times, every node set to `rate`.
    pub fn flat_with_nodes(times: Vec<f64>, rate: f64) -> CurveResult<Self> {
        let rates = vec![rate; times.len()];
        Self::new(times, rates)
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.inner.num_nodes()
    }

    /// Node times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        self.inner.times()
    }

    /// Zero hazard rates at the nodes.
    #[must_use]
    pub fn zero_rates(&self) -> &[f64] {
        self.inner.zero_rates()
    }

    /// `RT_i = r_i·t_i` at node `index`.
    #[must_use]
    pub fn rt_at_index(&self, index: usize) -> f64 {
        self.inner.rt_at_index(index)
    }

    /// Integrated hazard `RT(t)`.
    #[must_use]
    pub fn rt(&self, t: f64) -> f64 {
        self.inner.rt(t)
    }

    /// Survival probability `Q(t) = exp(-RT(t))`.
    #[must_use]
    pub fn survival_probability(&self, t: f64) -> f64 {
        self.inner.discount_factor(t)
    }

    /// Same as [`survival_probability`](Self::survival_probability); the name
    /// used when the curve is treated as a risky discount curve.
    #[must_use]
    pub fn discount_factor(&self, t: f64) -> f64 {
        self.inner.discount_factor(t)
    }

    /// Zero hazard rate `RT(t)/t`.
    #[must_use]
    pub fn zero_rate(&self, t: f64) -> f64 {
        self.inner.zero_rate(t)
    }

    /// Forward (instantaneous) hazard rate at `t`.
    #[must_use]
    pub fn forward_hazard_rate(&self, t: f64) -> f64 {
        self.inner.forward_rate(t)
    }

    /// `(RT(t), ∂RT(t)/∂r_node)`.
    #[must_use]
    pub fn rt_and_sensitivity(&self, t: f64, node: usize) -> (f64, f64) {
        self.inner.rt_and_sensitivity(t, node)
    }

    /// Sets the zero hazard rate at node `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_nodes()`.
    pub fn set_rate(&mut self, index: usize, rate: f64) {
        self.inner.set_rate(index, rate);
    }

    /// Returns a copy with node `index` set to `rate`.
    #[must_use]
    pub fn with_rate(&self, index: usize, rate: f64) -> Self {
        let mut curve = self.clone();
        curve.set_rate(index, rate);
        curve
    }
}
