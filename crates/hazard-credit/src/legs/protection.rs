//! Protection leg element.

use hazard_curves::knots::truncate_set_inclusive;
use hazard_curves::{CreditCurve, YieldCurve};
use hazard_math::epsilon::{epsilon, epsilon_p};

use super::{DiscountedKnots, KnotState, LegValue, SMALL_INCREMENT};

/// Default payoff over `[start, end]` per unit loss, discounted to today.
///
/// Between two knots the forward hazard and forward interest rates are both
/// flat, so the integral of `P(s)·(-dQ(s))` over the interval is
/// `Δht·(b0 - b1)/(Δht + Δrt)` with `b = P·Q`. When `Δht + Δrt` is tiny the
/// equivalent `Δht·b0·ε(-(Δht + Δrt))` is used.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtectionLegElement {
    grid: DiscountedKnots,
    node: usize,
}

impl ProtectionLegElement {
    /// Builds the element over `[start, end]`.
    ///
    /// `knots` is the global integration grid; it is truncated to the
    /// element's window with both endpoints included. `node` is the credit
    /// curve node the sensitivity is taken against.
    #[must_use]
    pub fn new(start: f64, end: f64, yield_curve: &YieldCurve, node: usize, knots: &[f64]) -> Self {
        let times = truncate_set_inclusive(start, end, knots);
        Self {
            grid: DiscountedKnots::new(times, yield_curve),
            node,
        }
    }

    /// Credit curve node this element is sensitive to.
    #[must_use]
    pub fn node(&self) -> usize {
        self.node
    }

    /// Integration knots.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        self.grid.times()
    }

    /// Value and sensitivity to the element's own node.
    #[must_use]
    pub fn pv_and_sensitivity(&self, curve: &CreditCurve) -> LegValue {
        self.pv_and_sensitivity_for(curve, self.node)
    }

    /// Value and sensitivity to an arbitrary credit curve node.
    #[must_use]
    pub fn pv_and_sensitivity_for(&self, curve: &CreditCurve, node: usize) -> LegValue {
        let mut s0 = KnotState::at(&self.grid, 0, curve, node);
        let mut pv = 0.0;
        let mut sensitivity = 0.0;

        for j in 1..self.grid.len() {
            let s1 = KnotState::at(&self.grid, j, curve, node);
            let dht = s1.ht - s0.ht;
            let drt = s1.rt - s0.rt;
            let dhrt = dht + drt;

            let (dpv, dsense) = if dhrt.abs() < SMALL_INCREMENT {
                let e = epsilon(-dhrt);
                let ep = epsilon_p(-dhrt);
                let dpv_dq0 = s0.p * ((1.0 + dht) * e - dht * ep);
                let dpv_dq1 = -s0.p * s0.q / s1.q * (e - dht * ep);
                (
                    dht * s0.b * e,
                    dpv_dq0 * s0.dqdr + dpv_dq1 * s1.dqdr,
                )
            } else {
                let w = drt / dhrt * (s0.b - s1.b);
                let dpv_dq0 = (w / s0.q + dht * s0.p) / dhrt;
                let dpv_dq1 = (w / s1.q + dht * s1.p) / dhrt;
                (
                    dht * (s0.b - s1.b) / dhrt,
                    dpv_dq0 * s0.dqdr - dpv_dq1 * s1.dqdr,
                )
            };

            pv += dpv;
            sensitivity += dsense;
            s0 = s1;
        }

        LegValue::new(pv, sensitivity)
    }

    /// Sensitivity of the value to the zero rate of yield curve node
    /// `yield_node`, with the credit curve held fixed.
    ///
    /// `yield_curve` must be the curve the element was built with. Per
    /// interval the value is `Δht·p0·q0·ε(-x)`, which is differentiated with
    /// respect to the discount factors at both knots.
    #[must_use]
    pub fn yield_sensitivity(
        &self,
        credit_curve: &CreditCurve,
        yield_curve: &YieldCurve,
        yield_node: usize,
    ) -> f64 {
        let times = self.grid.times();
        let rt = self.grid.rt();
        let df = self.grid.discount_factors();

        let mut ht0 = credit_curve.rt(times[0]);
        let mut dpdr0 = yield_curve.discount_factor_sensitivity(times[0], yield_node);
        let mut sensitivity = 0.0;

        for j in 1..self.grid.len() {
            let ht1 = credit_curve.rt(times[j]);
            let dpdr1 = yield_curve.discount_factor_sensitivity(times[j], yield_node);
            let dht = ht1 - ht0;
            let x = dht + rt[j] - rt[j - 1];
            let q0 = (-ht0).exp();

            let e = epsilon(-x);
            let ep = epsilon_p(-x);
            let dpv_dp0 = q0 * dht * (e - ep);
            let dpv_dp1 = dht * df[j - 1] * q0 / df[j] * ep;
            sensitivity += dpv_dp0 * dpdr0 + dpv_dp1 * dpdr1;

            ht0 = ht1;
            dpdr0 = dpdr1;
        }

        sensitivity
    }
}
