//! Analytic ISDA pricer for a single CDS.
//!
//! Unlike the calibrator, nothing is cached: every call builds its knot grid
//! from the yield and credit curves it is given. Values are per unit notional
//! and rolled (risk free) to the cash-settle time.

use hazard_curves::knots::integration_points;
use hazard_curves::{CreditCurve, YieldCurve};
use serde::{Deserialize, Serialize};

use crate::cds::CdsAnalytic;
use crate::legs::{AccrualOnDefaultFormula, CdsPremiumPayment, ProtectionLegElement};
use crate::valuation::integration_end;

/// Whether accrued premium is included in a premium leg value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    /// Accrued premium subtracted (the quoted convention).
    #[default]
    Clean,
    /// Accrued premium included.
    Dirty,
}

/// CDS pricer under the ISDA standard model.
///
/// # Example
///
/// ```rust
/// use hazard_credit::prelude::*;
///
/// let cds = CdsAnalytic::builder().maturity(5.0).build().unwrap();
/// let yield_curve = YieldCurve::flat(0.02);
/// let credit_curve = CreditCurve::new(vec![5.0], vec![0.0167]).unwrap();
///
/// let pricer = AnalyticCdsPricer::default();
/// let spread = pricer.par_spread(&cds, &yield_curve, &credit_curve);
/// // Roughly hazard times loss given default
/// assert!((spread - 0.0167 * 0.6).abs() < 5e-4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalyticCdsPricer {
    formula: AccrualOnDefaultFormula,
}

impl AnalyticCdsPricer {
    /// Creates a pricer using the given accrual-on-default formula.
    #[must_use]
    pub fn new(formula: AccrualOnDefaultFormula) -> Self {
        Self { formula }
    }

    /// The accrual-on-default formula.
    #[must_use]
    pub fn formula(&self) -> AccrualOnDefaultFormula {
        self.formula
    }

    /// Protection leg value per unit notional (loss given default applied),
    /// at the cash-settle time.
    #[must_use]
    pub fn protection_leg(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
    ) -> f64 {
        self.protection_leg_at(cds, yield_curve, credit_curve, cds.cash_settle_time())
    }

    /// Protection leg value rolled to `valuation_time`; zero values it today.
    #[must_use]
    pub fn protection_leg_at(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        valuation_time: f64,
    ) -> f64 {
        let element = self.protection_element(cds, yield_curve, credit_curve);
        cds.lgd() * element.pv_and_sensitivity(credit_curve).pv
            / yield_curve.discount_factor(valuation_time)
    }

    /// Premium leg per unit coupon including accrued, discounted to today.
    #[must_use]
    pub fn dirty_annuity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
    ) -> f64 {
        self.dirty_annuity_and_sensitivity(cds, yield_curve, credit_curve, 0).0
    }

    /// Premium leg per unit coupon (the risky annuity), at the cash-settle time.
    #[must_use]
    pub fn annuity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        price_type: PriceType,
    ) -> f64 {
        let cash_settle = cds.cash_settle_time();
        self.annuity_at(cds, yield_curve, credit_curve, price_type, cash_settle)
    }

    /// Risky annuity rolled (risk free) to `valuation_time`.
    ///
    /// The clean annuity subtracts the accrued premium, paid at the
    /// cash-settle time and weighted by survival to the protection start.
    #[must_use]
    pub fn annuity_at(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        price_type: PriceType,
        valuation_time: f64,
    ) -> f64 {
        let mut pv = self.dirty_annuity(cds, yield_curve, credit_curve);
        if price_type == PriceType::Clean {
            let cs_df = yield_curve.discount_factor(cds.cash_settle_time());
            pv -= cds.accrued_year_fraction() * cs_df * start_survival(cds, credit_curve);
        }
        pv / yield_curve.discount_factor(valuation_time)
    }

    /// Value to the protection buyer paying `spread`.
    #[must_use]
    pub fn pv(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        spread: f64,
        price_type: PriceType,
    ) -> f64 {
        self.protection_leg(cds, yield_curve, credit_curve)
            - spread * self.annuity(cds, yield_curve, credit_curve, price_type)
    }

    /// Spread that makes the clean value zero.
    #[must_use]
    pub fn par_spread(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
    ) -> f64 {
        self.protection_leg(cds, yield_curve, credit_curve)
            / self.annuity(cds, yield_curve, credit_curve, PriceType::Clean)
    }

    /// Sensitivity of the protection leg to the zero hazard rate of `node`.
    #[must_use]
    pub fn protection_leg_credit_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        node: usize,
    ) -> f64 {
        let element = self.protection_element(cds, yield_curve, credit_curve);
        cds.lgd() * element.pv_and_sensitivity_for(credit_curve, node).sensitivity
            / yield_curve.discount_factor(cds.cash_settle_time())
    }

    /// Sensitivity of the clean annuity to the zero hazard rate of `node`.
    #[must_use]
    pub fn annuity_credit_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        node: usize,
    ) -> f64 {
        let cs_df = yield_curve.discount_factor(cds.cash_settle_time());
        let (_, mut sense) =
            self.dirty_annuity_and_sensitivity(cds, yield_curve, credit_curve, node);
        let start = cds.effective_protection_start();
        if start > 0.0 {
            let (ht, dht) = credit_curve.rt_and_sensitivity(start, node);
            sense += cds.accrued_year_fraction() * cs_df * (-ht).exp() * dht;
        }
        sense / cs_df
    }

    /// Sensitivity of the clean value to the zero hazard rate of `node`.
    #[must_use]
    pub fn pv_credit_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        spread: f64,
        node: usize,
    ) -> f64 {
        self.protection_leg_credit_sensitivity(cds, yield_curve, credit_curve, node)
            - spread * self.annuity_credit_sensitivity(cds, yield_curve, credit_curve, node)
    }

    /// Sensitivity of the par spread to the zero hazard rate of `node`.
    #[must_use]
    pub fn par_spread_credit_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        node: usize,
    ) -> f64 {
        let a = self.protection_leg(cds, yield_curve, credit_curve);
        let b = self.annuity(cds, yield_curve, credit_curve, PriceType::Clean);
        let da = self.protection_leg_credit_sensitivity(cds, yield_curve, credit_curve, node);
        let db = self.annuity_credit_sensitivity(cds, yield_curve, credit_curve, node);
        a / b * (da / a - db / b)
    }

    /// Sensitivity of the protection leg (at cash settle) to the zero rate of
    /// yield curve node `yield_node`.
    #[must_use]
    pub fn protection_leg_yield_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        yield_node: usize,
    ) -> f64 {
        let element = self.protection_element(cds, yield_curve, credit_curve);
        let pv = cds.lgd() * element.pv_and_sensitivity(credit_curve).pv;
        let sense = cds.lgd() * element.yield_sensitivity(credit_curve, yield_curve, yield_node);
        roll_to_cash_settle_sensitivity(cds, yield_curve, pv, sense, yield_node)
    }

    /// Sensitivity of the annuity (at cash settle) to the zero rate of yield
    /// curve node `yield_node`.
    ///
    /// Clean and dirty agree: the accrued premium is paid at the cash-settle
    /// time, so rolling it there removes all dependence on the yield curve.
    #[must_use]
    pub fn annuity_yield_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        yield_node: usize,
    ) -> f64 {
        let start = cds.effective_protection_start();
        let knots = integration_points(
            start,
            integration_end(cds),
            yield_curve.knot_times(),
            credit_curve.times(),
        );

        let mut sense = 0.0;
        for coupon in cds.coupons() {
            let payment = CdsPremiumPayment::new(*coupon, start, self.formula);
            sense += if cds.pay_acc_on_default() {
                payment.yield_sensitivity(yield_curve, credit_curve, &knots, yield_node)
            } else {
                coupon.year_frac()
                    * credit_curve.survival_probability(coupon.eff_end())
                    * yield_curve.discount_factor_sensitivity(coupon.payment_time(), yield_node)
            };
        }
        let pv = self.dirty_annuity(cds, yield_curve, credit_curve);
        roll_to_cash_settle_sensitivity(cds, yield_curve, pv, sense, yield_node)
    }

    /// Sensitivity of the value to the zero rate of yield curve node
    /// `yield_node`.
    #[must_use]
    pub fn pv_yield_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        spread: f64,
        yield_node: usize,
    ) -> f64 {
        self.protection_leg_yield_sensitivity(cds, yield_curve, credit_curve, yield_node)
            - spread * self.annuity_yield_sensitivity(cds, yield_curve, credit_curve, yield_node)
    }

    fn protection_element(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
    ) -> ProtectionLegElement {
        let start = cds.effective_protection_start();
        let end = cds.protection_end();
        let knots = integration_points(start, end, yield_curve.knot_times(), credit_curve.times());
        ProtectionLegElement::new(start, end, yield_curve, 0, &knots)
    }

    /// Dirty annuity today and its sensitivity to `node`.
    fn dirty_annuity_and_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yield_curve: &YieldCurve,
        credit_curve: &CreditCurve,
        node: usize,
    ) -> (f64, f64) {
        let start = cds.effective_protection_start();
        let knots = integration_points(
            start,
            integration_end(cds),
            yield_curve.knot_times(),
            credit_curve.times(),
        );

        let mut pv = 0.0;
        let mut sense = 0.0;
        for coupon in cds.coupons() {
            let (ht, dht) = credit_curve.rt_and_sensitivity(coupon.eff_end(), node);
            let payment_df = yield_curve.discount_factor(coupon.payment_time());
            let coupon_pv = coupon.year_frac() * payment_df * (-ht).exp();
            pv += coupon_pv;
            sense -= coupon_pv * dht;

            if cds.pay_acc_on_default() {
                let payment = CdsPremiumPayment::new(*coupon, start, self.formula);
                let accrual = payment.accrual_on_default(yield_curve, credit_curve, &knots, node);
                pv += accrual.pv;
                sense += accrual.sensitivity;
            }
        }
        (pv, sense)
    }
}

/// Derivative of `pv / P(cashSettle)` given `pv` today and its derivative.
fn roll_to_cash_settle_sensitivity(
    cds: &CdsAnalytic,
    yield_curve: &YieldCurve,
    pv: f64,
    sense: f64,
    yield_node: usize,
) -> f64 {
    let (rt, drt) = yield_curve.rt_and_sensitivity(cds.cash_settle_time(), yield_node);
    let cs_df = (-rt).exp();
    (sense + pv * drt) / cs_df
}

/// Survival to the start of protection (one for spot-starting CDS).
fn start_survival(cds: &CdsAnalytic, credit_curve: &CreditCurve) -> f64 {
    let start = cds.effective_protection_start();
    if start > 0.0 {
        credit_curve.survival_probability(start)
    } else {
        1.0
    }
}
