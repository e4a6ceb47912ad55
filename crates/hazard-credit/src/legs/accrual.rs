//! Accrual on default.
//!
//! If the reference entity defaults inside a coupon period the protection
//! buyer pays the premium accrued up to the default time. Its expected value
//! over `[s, e]` is `∫ (u - s)·P(u)·(-dQ(u))`, integrated knot by knot with
//! flat forward hazard and interest rates on each interval.

use hazard_curves::knots::truncate_set_inclusive;
use hazard_curves::{CreditCurve, YieldCurve};
use hazard_math::epsilon::{epsilon, epsilon_p, epsilon_pp};
use serde::{Deserialize, Serialize};

use super::{DiscountedKnots, KnotState, LegValue, SMALL_INCREMENT};
use crate::coupon::CdsCoupon;

/// Half a day in years, added to the accrual time by the original ISDA model.
const HALF_DAY: f64 = 1.0 / 730.0;

/// Which accrual-on-default integral to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualOnDefaultFormula {
    /// ISDA standard model: half a day added to the accrued time.
    #[default]
    OriginalIsda,
    /// The Markit fix: no offset and a simplified kernel.
    MarkitFix,
    /// The exact integral with no offset.
    Correct,
}

impl AccrualOnDefaultFormula {
    /// Offset added to the time since accrual start.
    #[must_use]
    pub fn omega(self) -> f64 {
        match self {
            Self::OriginalIsda => HALF_DAY,
            Self::MarkitFix | Self::Correct => 0.0,
        }
    }
}

/// Knots for the accrual on default of `coupon`, or `None` if the coupon
/// accrues entirely before protection starts.
pub(crate) fn accrual_knots(
    coupon: &CdsCoupon,
    protection_start: f64,
    knots: &[f64],
    yield_curve: &YieldCurve,
) -> Option<DiscountedKnots> {
    let start = protection_start.max(coupon.eff_start());
    if start >= coupon.eff_end() {
        return None;
    }
    let times = truncate_set_inclusive(start, coupon.eff_end(), knots);
    Some(DiscountedKnots::new(times, yield_curve))
}

/// Accrual on default of `coupon` over `grid`, with its sensitivity to the
/// zero hazard rate of `node`, scaled by the coupon's year-fraction ratio.
///
/// `grid` must run from `max(protection start, coupon start)` to the coupon's
/// effective end.
#[must_use]
pub fn accrual_on_default(
    coupon: &CdsCoupon,
    grid: &DiscountedKnots,
    formula: AccrualOnDefaultFormula,
    curve: &CreditCurve,
    node: usize,
) -> LegValue {
    let times = grid.times();
    let offset = formula.omega() - coupon.eff_start();

    let mut s0 = KnotState::at(grid, 0, curve, node);
    let mut t0 = times[0] + offset;
    let mut total = LegValue::default();

    for j in 1..grid.len() {
        let s1 = KnotState::at(grid, j, curve, node);
        let t1 = times[j] + offset;
        let dt = times[j] - times[j - 1];
        let dht = s1.ht - s0.ht;
        let drt = s1.rt - s0.rt;
        let dhrt = dht + drt;
        let small = dhrt.abs() < SMALL_INCREMENT;

        total += if formula == AccrualOnDefaultFormula::MarkitFix {
            markit_fix_segment(&s0, &s1, dt, dht, dhrt, small)
        } else {
            exact_segment(&s0, &s1, t0, t1, dt, dht, dhrt, small)
        };

        s0 = s1;
        t0 = t1;
    }

    total.scaled(coupon.yf_ratio())
}

fn markit_fix_segment(
    s0: &KnotState,
    s1: &KnotState,
    dt: f64,
    dht: f64,
    x: f64,
    small: bool,
) -> LegValue {
    if small {
        let ep = epsilon_p(-x);
        let epp = epsilon_pp(-x);
        let dpv_dq0 = s0.p * dt * ((1.0 + dht) * ep - dht * epp);
        let dpv_dq1 = s0.b * dt / s1.q * (-ep + dht * epp);
        LegValue::new(
            dht * dt * s0.b * ep,
            dpv_dq0 * s0.dqdr + dpv_dq1 * s1.dqdr,
        )
    } else {
        let w1 = (s0.b - s1.b) / x;
        let w2 = w1 - s1.b;
        let w3 = dht / x;
        let w4 = dt / x;
        let w5 = (1.0 - w3) * w2;
        let dpv_dq0 = w4 / s0.q * (w5 + w3 * (s0.b - w1));
        let dpv_dq1 = w4 / s1.q * (w5 + w3 * (s1.b * (1.0 + x) - w1));
        LegValue::new(dht * w4 * w2, dpv_dq0 * s0.dqdr - dpv_dq1 * s1.dqdr)
    }
}

#[allow(clippy::too_many_arguments)]
fn exact_segment(
    s0: &KnotState,
    s1: &KnotState,
    t0: f64,
    t1: f64,
    dt: f64,
    dht: f64,
    x: f64,
    small: bool,
) -> LegValue {
    if small {
        let e = epsilon(-x);
        let ep = epsilon_p(-x);
        let epp = epsilon_pp(-x);
        let w1 = t0 * e + dt * ep;
        let w2 = t0 * ep + dt * epp;
        let dpv_dq0 = s0.p * ((1.0 + dht) * w1 - dht * w2);
        let dpv_dq1 = s0.b / s1.q * (-w1 + dht * w2);
        LegValue::new(dht * s0.b * w1, dpv_dq0 * s0.dqdr + dpv_dq1 * s1.dqdr)
    } else {
        let w1 = dt / x;
        let w2 = dht / x;
        let w3 = (t0 + w1) * s0.b - (t1 + w1) * s1.b;
        let w4 = (1.0 - w2) / x;
        let w5 = w1 / x * (s0.b - s1.b);
        let dpv_dq0 = w4 * w3 / s0.q + w2 * ((t0 + w1) * s0.p - w5 / s0.q);
        let dpv_dq1 = w4 * w3 / s1.q + w2 * ((t1 + w1) * s1.p - w5 / s1.q);
        LegValue::new(w2 * w3, dpv_dq0 * s0.dqdr - dpv_dq1 * s1.dqdr)
    }
}

/// Sensitivity of [`accrual_on_default`] to the zero rate of yield curve node
/// `yield_node`, with the credit curve held fixed.
///
/// `grid` must have been built from `yield_curve`. On each interval the
/// accrual is written exactly as `Δht·p0·q0·(t0·ε(-x) + Δt·ε'(-x))` (the
/// Markit fix keeps only the second term with `t0 = 0`), so no branch on the
/// size of `x` is needed.
#[must_use]
pub fn accrual_on_default_yield_sensitivity(
    coupon: &CdsCoupon,
    grid: &DiscountedKnots,
    formula: AccrualOnDefaultFormula,
    credit_curve: &CreditCurve,
    yield_curve: &YieldCurve,
    yield_node: usize,
) -> f64 {
    let times = grid.times();
    let rt = grid.rt();
    let df = grid.discount_factors();
    let offset = formula.omega() - coupon.eff_start();

    let mut ht0 = credit_curve.rt(times[0]);
    let mut dpdr0 = yield_curve.discount_factor_sensitivity(times[0], yield_node);
    let mut sensitivity = 0.0;

    for j in 1..grid.len() {
        let ht1 = credit_curve.rt(times[j]);
        let dpdr1 = yield_curve.discount_factor_sensitivity(times[j], yield_node);
        let dt = times[j] - times[j - 1];
        let dht = ht1 - ht0;
        let x = dht + rt[j] - rt[j - 1];
        let q0 = (-ht0).exp();
        let b0 = df[j - 1] * q0;

        let ep = epsilon_p(-x);
        let epp = epsilon_pp(-x);
        let (dpv_dp0, dpv_dp1) = if formula == AccrualOnDefaultFormula::MarkitFix {
            (dht * dt * q0 * (ep - epp), dht * dt * b0 / df[j] * epp)
        } else {
            let t0 = times[j - 1] + offset;
            let w = t0 * epsilon(-x) + dt * ep;
            let dw = t0 * ep + dt * epp;
            (dht * q0 * (w - dw), dht * b0 / df[j] * dw)
        };
        sensitivity += dpv_dp0 * dpdr0 + dpv_dp1 * dpdr1;

        ht0 = ht1;
        dpdr0 = dpdr1;
    }

    sensitivity * coupon.yf_ratio()
}

/// One premium coupon valued directly from the curves.
///
/// Unlike [`PremiumLegElement`](super::PremiumLegElement), nothing is
/// precomputed: the knots and yield curve are supplied on each call. The
/// accrual on default goes through [`accrual_on_default`], so both give the
/// same numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdsPremiumPayment {
    coupon: CdsCoupon,
    protection_start: f64,
    formula: AccrualOnDefaultFormula,
}

impl CdsPremiumPayment {
    /// Creates a premium payment for `coupon` under a protection window
    /// starting at `protection_start`.
    #[must_use]
    pub fn new(coupon: CdsCoupon, protection_start: f64, formula: AccrualOnDefaultFormula) -> Self {
        Self {
            coupon,
            protection_start,
            formula,
        }
    }

    /// The coupon.
    #[must_use]
    pub fn coupon(&self) -> &CdsCoupon {
        &self.coupon
    }

    /// Accrual-on-default formula.
    #[must_use]
    pub fn formula(&self) -> AccrualOnDefaultFormula {
        self.formula
    }

    /// `yearFrac · P(payment) · Q(effEnd)`, the coupon paid on survival.
    #[must_use]
    pub fn coupon_pv(&self, yield_curve: &YieldCurve, credit_curve: &CreditCurve) -> f64 {
        self.coupon.year_frac()
            * yield_curve.discount_factor(self.coupon.payment_time())
            * credit_curve.survival_probability(self.coupon.eff_end())
    }

    /// Accrual on default and its sensitivity to `node`.
    ///
    /// `knots` should contain the knots of both curves; it is truncated to the
    /// coupon's protected accrual window.
    #[must_use]
    pub fn accrual_on_default(
        &self,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        knots: &[f64],
        node: usize,
    ) -> LegValue {
        accrual_knots(&self.coupon, self.protection_start, knots, yield_curve).map_or_else(
            LegValue::default,
            |grid| accrual_on_default(&self.coupon, &grid, self.formula, credit_curve, node),
        )
    }

    /// Coupon plus accrual on default.
    #[must_use]
    pub fn pv(&self, yield_curve: &YieldCurve, credit_curve: &CreditCurve, knots: &[f64]) -> f64 {
        self.coupon_pv(yield_curve, credit_curve)
            + self.accrual_on_default(yield_curve, credit_curve, knots, 0).pv
    }

    /// Sensitivity of [`pv`](Self::pv) to the zero rate of yield curve node
    /// `yield_node`.
    #[must_use]
    pub fn yield_sensitivity(
        &self,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        knots: &[f64],
        yield_node: usize,
    ) -> f64 {
        let coupon = self.coupon.year_frac()
            * credit_curve.survival_probability(self.coupon.eff_end())
            * yield_curve.discount_factor_sensitivity(self.coupon.payment_time(), yield_node);
        let accrual = accrual_knots(&self.coupon, self.protection_start, knots, yield_curve)
            .map_or(0.0, |grid| {
                accrual_on_default_yield_sensitivity(
                    &self.coupon,
                    &grid,
                    self.formula,
                    credit_curve,
                    yield_curve,
                    yield_node,
                )
            });
        coupon + accrual
    }
}
