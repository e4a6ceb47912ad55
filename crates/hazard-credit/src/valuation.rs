//! Net present value of a CDS from prebuilt leg elements.

use hazard_curves::knots::integration_points;
use hazard_curves::{CreditCurve, YieldCurve};

use crate::cds::CdsAnalytic;
use crate::legs::{AccrualOnDefaultFormula, PremiumLegElement, ProtectionLegElement};
use crate::market::CdsMarketInfo;

/// A CDS whose yield-curve dependent parts are fixed, valued against any
/// credit curve.
///
/// Values follow the calibration convention: legs are discounted to today,
/// the net value is rolled to the cash-settle time and compared with the
/// quoted upfront less accrued premium. A correctly calibrated curve gives a
/// [`pv`](Self::pv) of zero.
#[derive(Debug, Clone)]
pub struct Cds {
    protection: ProtectionLegElement,
    premium: Vec<PremiumLegElement>,
    valuation_df: f64,
    accrued_year_fraction: f64,
}

impl Cds {
    /// Builds the legs of `cds`.
    ///
    /// `credit_knots` are the node times of the credit curves this CDS will
    /// be valued against; they are merged with the yield curve knots.
    #[must_use]
    pub fn new(
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_knots: &[f64],
        formula: AccrualOnDefaultFormula,
    ) -> Self {
        let start = cds.effective_protection_start();
        let end = integration_end(cds);
        let knots = integration_points(start, end, yield_curve.knot_times(), credit_knots);

        let protection =
            ProtectionLegElement::new(start, cds.protection_end(), yield_curve, 0, &knots);
        let premium = cds
            .coupons()
            .iter()
            .map(|c| {
                if cds.pay_acc_on_default() {
                    PremiumLegElement::with_accrual_on_default(
                        start,
                        c,
                        yield_curve,
                        0,
                        &knots,
                        formula,
                    )
                } else {
                    PremiumLegElement::coupon_only(c, yield_curve, 0)
                }
            })
            .collect();

        Self {
            protection,
            premium,
            valuation_df: yield_curve.discount_factor(cds.cash_settle_time()),
            accrued_year_fraction: cds.accrued_year_fraction(),
        }
    }

    /// Protection leg per unit loss, discounted to today.
    #[must_use]
    pub fn protection_leg(&self, curve: &CreditCurve) -> f64 {
        self.protection.pv_and_sensitivity(curve).pv
    }

    /// Dirty premium leg per unit coupon, discounted to today.
    #[must_use]
    pub fn premium_leg(&self, curve: &CreditCurve) -> f64 {
        self.premium
            .iter()
            .map(|e| e.pv_and_sensitivity(curve).pv)
            .sum()
    }

    /// Value to the protection buyer at the cash-settle time, net of the
    /// quoted upfront and accrued premium.
    #[must_use]
    pub fn pv(&self, curve: &CreditCurve, market: &CdsMarketInfo) -> f64 {
        let legs =
            market.lgd() * self.protection_leg(curve) - market.coupon() * self.premium_leg(curve);
        legs / self.valuation_df - (market.puf() - market.coupon() * self.accrued_year_fraction)
    }

    /// Derivative of [`pv`](Self::pv) with respect to the zero hazard rate
    /// of `node`.
    #[must_use]
    pub fn dpv_dh(&self, curve: &CreditCurve, market: &CdsMarketInfo, node: usize) -> f64 {
        let protection = self.protection.pv_and_sensitivity_for(curve, node).sensitivity;
        let premium: f64 = self
            .premium
            .iter()
            .map(|e| e.pv_and_sensitivity_for(curve, node).sensitivity)
            .sum();
        (market.lgd() * protection - market.coupon() * premium) / self.valuation_df
    }
}

/// Last time any leg of `cds` needs integrating to.
pub(crate) fn integration_end(cds: &CdsAnalytic) -> f64 {
    cds.coupons()
        .iter()
        .map(|c| c.eff_end())
        .fold(cds.protection_end(), f64::max)
}
