//! Premium leg elements.

use hazard_curves::{CreditCurve, YieldCurve};

use super::accrual::{accrual_knots, accrual_on_default, AccrualOnDefaultFormula};
use super::{DiscountedKnots, LegValue};
use crate::coupon::CdsCoupon;

/// A single coupon paid on survival to the end of its accrual period.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponOnlyElement {
    coupon: CdsCoupon,
    payment_df: f64,
    node: usize,
}

impl CouponOnlyElement {
    /// Builds the element; the discount factor to the payment time is fixed
    /// here.
    #[must_use]
    pub fn new(coupon: &CdsCoupon, yield_curve: &YieldCurve, node: usize) -> Self {
        Self {
            coupon: *coupon,
            payment_df: yield_curve.discount_factor(coupon.payment_time()),
            node,
        }
    }

    /// The coupon.
    #[must_use]
    pub fn coupon(&self) -> &CdsCoupon {
        &self.coupon
    }

    /// Credit curve node this element is sensitive to.
    #[must_use]
    pub fn node(&self) -> usize {
        self.node
    }

    /// Value and sensitivity to the element's own node.
    #[must_use]
    pub fn pv_and_sensitivity(&self, curve: &CreditCurve) -> LegValue {
        self.pv_and_sensitivity_for(curve, self.node)
    }

    /// Value and sensitivity to an arbitrary credit curve node.
    #[must_use]
    pub fn pv_and_sensitivity_for(&self, curve: &CreditCurve, node: usize) -> LegValue {
        let (ht, sense) = curve.rt_and_sensitivity(self.coupon.eff_end(), node);
        let pv = self.coupon.year_frac() * self.payment_df * (-ht).exp();
        LegValue::new(pv, -pv * sense)
    }
}

/// Premium leg contribution of one coupon.
#[derive(Debug, Clone, PartialEq)]
pub enum PremiumLegElement {
    /// Coupon paid on survival only.
    CouponOnly(CouponOnlyElement),
    /// Coupon plus the premium accrued up to a default inside the period.
    PayAccruedOnDefault {
        /// The survival-contingent coupon.
        coupon: CouponOnlyElement,
        /// Accrual knots, `None` if the coupon accrues before protection starts.
        accrual: Option<DiscountedKnots>,
        /// Accrual-on-default formula.
        formula: AccrualOnDefaultFormula,
    },
}

impl PremiumLegElement {
    /// Element for a CDS that does not pay accrued premium on default.
    #[must_use]
    pub fn coupon_only(coupon: &CdsCoupon, yield_curve: &YieldCurve, node: usize) -> Self {
        Self::CouponOnly(CouponOnlyElement::new(coupon, yield_curve, node))
    }

    /// Element for a CDS that pays accrued premium on default.
    ///
    /// The accrual is integrated from `max(protection_start, coupon start)`
    /// over the global `knots`, truncated to the coupon.
    #[must_use]
    pub fn with_accrual_on_default(
        protection_start: f64,
        coupon: &CdsCoupon,
        yield_curve: &YieldCurve,
        node: usize,
        knots: &[f64],
        formula: AccrualOnDefaultFormula,
    ) -> Self {
        Self::PayAccruedOnDefault {
            coupon: CouponOnlyElement::new(coupon, yield_curve, node),
            accrual: accrual_knots(coupon, protection_start, knots, yield_curve),
            formula,
        }
    }

    /// The coupon-only part.
    #[must_use]
    pub fn coupon_element(&self) -> &CouponOnlyElement {
        match self {
            Self::CouponOnly(coupon) | Self::PayAccruedOnDefault { coupon, .. } => coupon,
        }
    }

    /// The coupon.
    #[must_use]
    pub fn coupon(&self) -> &CdsCoupon {
        self.coupon_element().coupon()
    }

    /// Credit curve node this element is sensitive to.
    #[must_use]
    pub fn node(&self) -> usize {
        self.coupon_element().node()
    }

    /// Value and sensitivity to the element's own node.
    #[must_use]
    pub fn pv_and_sensitivity(&self, curve: &CreditCurve) -> LegValue {
        self.pv_and_sensitivity_for(curve, self.node())
    }

    /// Value and sensitivity to an arbitrary credit curve node.
    #[must_use]
    pub fn pv_and_sensitivity_for(&self, curve: &CreditCurve, node: usize) -> LegValue {
        match self {
            Self::CouponOnly(coupon) => coupon.pv_and_sensitivity_for(curve, node),
            Self::PayAccruedOnDefault {
                coupon,
                accrual,
                formula,
            } => {
                let mut value = coupon.pv_and_sensitivity_for(curve, node);
                if let Some(grid) = accrual {
                    value += accrual_on_default(coupon.coupon(), grid, *formula, curve, node);
                }
                value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legs::accrual::CdsPremiumPayment;
    use crate::legs::test_support::{bump_node, credit_curve, yield_curve};
    use approx::assert_relative_eq;
    use hazard_curves::knots::integration_points;

    fn coupon() -> CdsCoupon {
        CdsCoupon::new(4.25, 4.5, 4.5, 0.25 * 365.0 / 360.0).unwrap()
    }

    #[test]
    fn test_coupon_only_value() {
        let yc = yield_curve();
        let cc = credit_curve();
        let element = CouponOnlyElement::new(&coupon(), &yc, 2);
        let value = element.pv_and_sensitivity(&cc);
        let expected =
            coupon().year_frac() * yc.discount_factor(4.5) * cc.survival_probability(4.5);
        assert_relative_eq!(value.pv, expected, epsilon = 1e-15);

        let fd = bump_node(&cc, 2, |c| element.pv_and_sensitivity(c).pv);
        assert_relative_eq!(value.sensitivity, fd, epsilon = 1e-10);
    }

    #[test]
    fn test_accrual_adds_to_coupon() {
        let yc = yield_curve();
        let cc = credit_curve();
        let knots = integration_points(0.0, 7.0, yc.knot_times(), cc.times());
        let plain = PremiumLegElement::coupon_only(&coupon(), &yc, 2);
        let full = PremiumLegElement::with_accrual_on_default(
            0.0,
            &coupon(),
            &yc,
            2,
            &knots,
            AccrualOnDefaultFormula::OriginalIsda,
        );
        assert!(full.pv_and_sensitivity(&cc).pv > plain.pv_and_sensitivity(&cc).pv);
        assert_eq!(full.node(), 2);
        assert_eq!(full.coupon(), &coupon());
    }

    #[test]
    fn test_matches_standalone_premium_payment() {
        let yc = yield_curve();
        let cc = credit_curve();
        let knots = integration_points(0.0, 7.0, yc.knot_times(), cc.times());
        for formula in [
            AccrualOnDefaultFormula::OriginalIsda,
            AccrualOnDefaultFormula::MarkitFix,
            AccrualOnDefaultFormula::Correct,
        ] {
            let element =
                PremiumLegElement::with_accrual_on_default(0.0, &coupon(), &yc, 2, &knots, formula);
            let payment = CdsPremiumPayment::new(coupon(), 0.0, formula);

            let value = element.pv_and_sensitivity(&cc);
            let coupon_part = element.coupon_element().pv_and_sensitivity(&cc);
            let accrual = payment.accrual_on_default(&yc, &cc, &knots, 2);
            assert_eq!(value.pv, coupon_part.pv + accrual.pv);
            assert_eq!(value.sensitivity, coupon_part.sensitivity + accrual.sensitivity);
        }
    }

    #[test]
    fn test_sensitivity_matches_finite_difference() {
        let yc = yield_curve();
        let cc = credit_curve();
        let knots = integration_points(0.0, 7.0, yc.knot_times(), cc.times());
        let element = PremiumLegElement::with_accrual_on_default(
            0.0,
            &coupon(),
            &yc,
            2,
            &knots,
            AccrualOnDefaultFormula::MarkitFix,
        );
        for node in 0..cc.num_nodes() {
            let analytic = element.pv_and_sensitivity_for(&cc, node).sensitivity;
            let fd = bump_node(&cc, node, |c| element.pv_and_sensitivity(c).pv);
            assert_relative_eq!(analytic, fd, epsilon = 1e-10);
        }
    }
}
