//! Leg valuation elements.
//!
//! Each element values one piece of a CDS against a credit curve and returns
//! the value together with its derivative with respect to the zero hazard
//! rate of a single curve node. Everything that depends only on the yield
//! curve (knots, `RT` and discount factors at the knots) is computed once at
//! construction, so a valuation only queries the credit curve.
//!
//! | Element | Values |
//! |---------|--------|
//! | [`ProtectionLegElement`] | `∫ P(s) (-dQ(s))` over a protection window |
//! | [`CouponOnlyElement`] | `yearFrac · P(pay) · Q(accrualEnd)` |
//! | [`PremiumLegElement`] | a coupon, optionally plus its accrual on default |
//! | [`CdsPremiumPayment`] | one coupon valued from the curves at call time |

mod accrual;
mod premium;
mod protection;

pub use accrual::{
    accrual_on_default, accrual_on_default_yield_sensitivity, AccrualOnDefaultFormula,
    CdsPremiumPayment,
};
pub use premium::{CouponOnlyElement, PremiumLegElement};
pub use protection::ProtectionLegElement;

use hazard_curves::{CreditCurve, YieldCurve};

/// Below this combined hazard and rate increment the epsilon expansions are
/// used instead of the closed forms.
pub const SMALL_INCREMENT: f64 = 1e-5;

/// Value of a leg element and its sensitivity to one credit curve node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegValue {
    /// Present value (discounted to today).
    pub pv: f64,
    /// `∂pv/∂r_node`.
    pub sensitivity: f64,
}

impl LegValue {
    /// Creates a leg value.
    #[must_use]
    pub fn new(pv: f64, sensitivity: f64) -> Self {
        Self { pv, sensitivity }
    }

    /// Both components multiplied by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.pv * factor, self.sensitivity * factor)
    }
}

impl std::ops::Add for LegValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.pv + rhs.pv, self.sensitivity + rhs.sensitivity)
    }
}

impl std::ops::AddAssign for LegValue {
    fn add_assign(&mut self, rhs: Self) {
        self.pv += rhs.pv;
        self.sensitivity += rhs.sensitivity;
    }
}

impl std::iter::Sum for LegValue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, v| acc + v)
    }
}

/// Integration knots with the yield curve sampled at each one.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountedKnots {
    times: Vec<f64>,
    rt: Vec<f64>,
    df: Vec<f64>,
}

impl DiscountedKnots {
    /// Samples `RT` and `P` of the yield curve at `times`.
    #[must_use]
    pub fn new(times: Vec<f64>, yield_curve: &YieldCurve) -> Self {
        let rt: Vec<f64> = times.iter().map(|&t| yield_curve.rt(t)).collect();
        let df = rt.iter().map(|&r| (-r).exp()).collect();
        Self { times, rt, df }
    }

    /// Knot times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Yield curve `RT` at each knot.
    #[must_use]
    pub fn rt(&self) -> &[f64] {
        &self.rt
    }

    /// Discount factor at each knot.
    #[must_use]
    pub fn discount_factors(&self) -> &[f64] {
        &self.df
    }

    /// Number of knots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether there are no knots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Credit curve state at one knot: survival, its derivative with respect to
/// the node, and the risky discount factor.
#[derive(Debug, Clone, Copy)]
struct KnotState {
    ht: f64,
    rt: f64,
    p: f64,
    q: f64,
    b: f64,
    dqdr: f64,
}

impl KnotState {
    fn at(grid: &DiscountedKnots, j: usize, curve: &CreditCurve, node: usize) -> Self {
        let (ht, sense) = curve.rt_and_sensitivity(grid.times[j], node);
        let q = (-ht).exp();
        let p = grid.df[j];
        Self {
            ht,
            rt: grid.rt[j],
            p,
            q,
            b: p * q,
            dqdr: -sense * q,
        }
    }
}
