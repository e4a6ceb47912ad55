//! ISDA discount curve.

use crate::error::CurveResult;
use crate::isda_curve::IsdaCurve;

/// Time used for the single node of a flat curve.
const FLAT_NODE_TIME: f64 = 1.0;

/// Discount curve with continuously compounded zero rates and linear `RT`
/// interpolation.
///
/// # Example
///
/// ```rust
/// use hazard_curves::YieldCurve;
///
/// let curve = YieldCurve::flat(0.02);
/// assert!((curve.discount_factor(5.0) - (-0.1_f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct YieldCurve {
    inner: IsdaCurve,
}

impl YieldCurve {
    /// Creates a yield curve from node times (year fractions) and zero rates.
    pub fn new(times: Vec<f64>, rates: Vec<f64>) -> CurveResult<Self> {
        Ok(Self {
            inner: IsdaCurve::new(times, rates)?,
        })
    }

    /// A curve with the same zero rate at every time.
    #[must_use]
    pub fn flat(rate: f64) -> Self {
        Self {
            inner: IsdaCurve::single_node(FLAT_NODE_TIME, rate),
        }
    }

    /// Discount factor `P(t)`.
    #[must_use]
    pub fn discount_factor(&self, t: f64) -> f64 {
        self.inner.discount_factor(t)
    }

    /// `RT(t) = -ln P(t)`.
    #[must_use]
    pub fn rt(&self, t: f64) -> f64 {
        self.inner.rt(t)
    }

    /// Zero rate at `t`.
    #[must_use]
    pub fn zero_rate(&self, t: f64) -> f64 {
        self.inner.zero_rate(t)
    }

    /// Instantaneous forward rate at `t`.
    #[must_use]
    pub fn forward_rate(&self, t: f64) -> f64 {
        self.inner.forward_rate(t)
    }

    /// Node times; the forward rate is flat between consecutive knots.
    #[must_use]
    pub fn knot_times(&self) -> &[f64] {
        self.inner.times()
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.inner.num_nodes()
    }

    /// Zero rates at the nodes.
    #[must_use]
    pub fn zero_rates(&self) -> &[f64] {
        self.inner.zero_rates()
    }

    /// `(RT(t), ∂RT(t)/∂r_node)`.
    #[must_use]
    pub fn rt_and_sensitivity(&self, t: f64, node: usize) -> (f64, f64) {
        self.inner.rt_and_sensitivity(t, node)
    }

    /// `∂P(t)/∂r_node`.
    #[must_use]
    pub fn discount_factor_sensitivity(&self, t: f64, node: usize) -> f64 {
        let (rt, sense) = self.inner.rt_and_sensitivity(t, node);
        -sense * (-rt).exp()
    }

    /// Returns a copy with node `index` set to `rate`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_nodes()`.
    #[must_use]
    pub fn with_rate(&self, index: usize, rate: f64) -> Self {
        let mut inner = self.inner.clone();
        inner.set_rate(index, rate);
        Self { inner }
    }
}
