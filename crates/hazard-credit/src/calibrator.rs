//! Node-by-node bootstrap of a credit curve from CDS quotes.
//!
//! The calibrator is built once per set of CDS and yield curve. Construction
//! fixes everything that does not depend on the credit curve:
//!
//! - the global knot grid (yield curve knots merged with CDS maturities)
//! - one protection leg element per maturity bucket `[T_{i-1}, T_i]`
//! - one premium element per distinct coupon
//! - the coupon maps that decide which cached values a node can move
//!
//! [`CreditCurveCalibrator::calibrate`] then solves one Newton-Raphson
//! problem per maturity in increasing order. Leg values of solved nodes are
//! cached and only the frontier node is recomputed inside the solver.

use std::collections::HashMap;

use hazard_curves::knots::{integration_points, KNOT_TOLERANCE};
use hazard_curves::{CreditCurve, YieldCurve};
use hazard_math::solvers::{newton_raphson_fdf, SolverConfig, DEFAULT_MAX_ITERATIONS};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cds::CdsAnalytic;
use crate::coupon::{CdsCoupon, CouponKey};
use crate::error::{CreditError, CreditResult, QuoteKind};
use crate::legs::{AccrualOnDefaultFormula, LegValue, PremiumLegElement, ProtectionLegElement};
use crate::valuation::integration_end;

/// Default Newton tolerance for calibration (PV per unit notional).
pub const DEFAULT_CALIBRATION_TOLERANCE: f64 = 1e-12;

/// What to do when a quote implies a negative forward hazard rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrageHandling {
    /// Solve without constraint; forward hazards may go negative.
    #[default]
    Ignore,
    /// Return [`CreditError::Arbitrage`].
    Fail,
    /// Floor the forward hazard of the offending segment at zero.
    ZeroHazardRate,
}

/// Solver configuration used when none is given.
#[must_use]
pub fn default_solver_config() -> SolverConfig {
    SolverConfig::new(DEFAULT_CALIBRATION_TOLERANCE, DEFAULT_MAX_ITERATIONS)
}

/// Bootstraps credit curves for a fixed set of CDS and a fixed yield curve.
///
/// The node times of every calibrated curve are the CDS protection ends.
///
/// # Example
///
/// ```rust
/// use hazard_credit::prelude::*;
///
/// let yield_curve = YieldCurve::flat(0.02);
/// let cds: Vec<_> = [1.0, 3.0, 5.0]
///     .iter()
///     .map(|&m| CdsAnalytic::builder().maturity(m).build().unwrap())
///     .collect();
///
/// let calibrator = CreditCurveCalibrator::new(
///     &cds,
///     &yield_curve,
///     AccrualOnDefaultFormula::OriginalIsda,
///     ArbitrageHandling::Ignore,
/// )
/// .unwrap();
/// let curve = calibrator.calibrate_par_spreads(&[0.006, 0.008, 0.01]).unwrap();
/// assert_eq!(curve.times(), &[1.0, 3.0, 5.0]);
/// ```
#[derive(Debug, Clone)]
pub struct CreditCurveCalibrator {
    maturities: Vec<f64>,
    knots: Vec<f64>,
    lgd: Vec<f64>,
    valuation_df: Vec<f64>,
    accrued: Vec<f64>,
    protection: Vec<ProtectionLegElement>,
    premium: Vec<PremiumLegElement>,
    cds_coupons: Vec<Vec<usize>>,
    knot_coupons: Vec<Vec<usize>>,
    cds_knot_coupons: Vec<Vec<usize>>,
    formula: AccrualOnDefaultFormula,
    arbitrage: ArbitrageHandling,
    solver: SolverConfig,
}

impl CreditCurveCalibrator {
    /// Builds the calibrator.
    ///
    /// The CDS must have strictly increasing protection ends and share the
    /// accrual start, effective protection start, cash-settle time and
    /// pay-accrued-on-default flag.
    pub fn new(
        cds: &[CdsAnalytic],
        yield_curve: &YieldCurve,
        formula: AccrualOnDefaultFormula,
        arbitrage: ArbitrageHandling,
    ) -> CreditResult<Self> {
        check_instruments(cds)?;

        let n = cds.len();
        let maturities: Vec<f64> = cds.iter().map(CdsAnalytic::protection_end).collect();
        let protection_start = cds[0].effective_protection_start();
        let end = cds.iter().map(integration_end).fold(f64::NEG_INFINITY, f64::max);
        let knots =
            integration_points(protection_start, end, yield_curve.knot_times(), &maturities);

        let protection = (0..n)
            .map(|i| {
                let start = if i == 0 { protection_start } else { maturities[i - 1] };
                ProtectionLegElement::new(start, maturities[i], yield_curve, i, &knots)
            })
            .collect();

        let mut index: HashMap<CouponKey, usize> = HashMap::new();
        let mut unique: Vec<CdsCoupon> = Vec::new();
        let mut cds_coupons: Vec<Vec<usize>> = Vec::with_capacity(n);
        for c in cds {
            let mut own = Vec::with_capacity(c.num_payments());
            for coupon in c.coupons() {
                let next = unique.len();
                let k = *index.entry(coupon.key()).or_insert(next);
                if k == next {
                    unique.push(*coupon);
                }
                own.push(k);
            }
            cds_coupons.push(own);
        }

        let coupon_nodes: Vec<usize> = unique
            .iter()
            .map(|c| coupon_node(&maturities, c.eff_end()))
            .collect();

        let pay_accrued = cds[0].pay_acc_on_default();
        let premium = unique
            .iter()
            .zip(&coupon_nodes)
            .map(|(coupon, &node)| {
                if pay_accrued {
                    PremiumLegElement::with_accrual_on_default(
                        protection_start,
                        coupon,
                        yield_curve,
                        node,
                        &knots,
                        formula,
                    )
                } else {
                    PremiumLegElement::coupon_only(coupon, yield_curve, node)
                }
            })
            .collect();

        // Coupon indices are visited in increasing order, so every list is sorted.
        let mut knot_coupons = vec![Vec::new(); n];
        for (c, coupon) in unique.iter().enumerate() {
            for (i, list) in knot_coupons.iter_mut().enumerate() {
                let lower = if i == 0 { f64::NEG_INFINITY } else { maturities[i - 1] };
                let overlaps = coupon.eff_start() < maturities[i] - KNOT_TOLERANCE
                    && coupon.eff_end() > lower + KNOT_TOLERANCE;
                if coupon_nodes[c] == i || overlaps {
                    list.push(c);
                }
            }
        }

        let cds_knot_coupons = cds_coupons
            .iter()
            .zip(&knot_coupons)
            .map(|(own, touching)| {
                own.iter()
                    .copied()
                    .filter(|c| touching.binary_search(c).is_ok())
                    .collect()
            })
            .collect();

        Ok(Self {
            lgd: cds.iter().map(CdsAnalytic::lgd).collect(),
            valuation_df: cds
                .iter()
                .map(|c| yield_curve.discount_factor(c.cash_settle_time()))
                .collect(),
            accrued: cds.iter().map(CdsAnalytic::accrued_year_fraction).collect(),
            maturities,
            knots,
            protection,
            premium,
            cds_coupons,
            knot_coupons,
            cds_knot_coupons,
            formula,
            arbitrage,
            solver: default_solver_config(),
        })
    }

    /// Replaces the Newton-Raphson configuration.
    #[must_use]
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Number of calibration instruments (and curve nodes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.maturities.len()
    }

    /// Always false; construction rejects an empty set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maturities.is_empty()
    }

    /// Curve node times.
    #[must_use]
    pub fn maturities(&self) -> &[f64] {
        &self.maturities
    }

    /// The global integration grid.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Protection leg elements, one per maturity bucket.
    #[must_use]
    pub fn protection_elements(&self) -> &[ProtectionLegElement] {
        &self.protection
    }

    /// Premium elements, one per distinct coupon.
    #[must_use]
    pub fn premium_elements(&self) -> &[PremiumLegElement] {
        &self.premium
    }

    /// Number of distinct coupons across all CDS.
    #[must_use]
    pub fn num_premium_elements(&self) -> usize {
        self.premium.len()
    }

    /// Premium element indices of CDS `index`.
    #[must_use]
    pub fn cds_coupons(&self, index: usize) -> &[usize] {
        &self.cds_coupons[index]
    }

    /// Premium element indices whose value depends on node `index`.
    #[must_use]
    pub fn knot_coupons(&self, index: usize) -> &[usize] {
        &self.knot_coupons[index]
    }

    /// Premium element indices of CDS `index` that depend on node `index`.
    #[must_use]
    pub fn cds_knot_coupons(&self, index: usize) -> &[usize] {
        &self.cds_knot_coupons[index]
    }

    /// The accrual-on-default formula.
    #[must_use]
    pub fn formula(&self) -> AccrualOnDefaultFormula {
        self.formula
    }

    /// The arbitrage policy.
    #[must_use]
    pub fn arbitrage_handling(&self) -> ArbitrageHandling {
        self.arbitrage
    }

    /// The Newton-Raphson configuration.
    #[must_use]
    pub fn solver_config(&self) -> &SolverConfig {
        &self.solver
    }

    /// Calibrates to par spreads (no points-upfront).
    pub fn calibrate_par_spreads(&self, spreads: &[f64]) -> CreditResult<CreditCurve> {
        self.calibrate(spreads, &vec![0.0; spreads.len()])
    }

    /// Calibrates to running premiums and points-upfront, one per CDS.
    ///
    /// Either a fully calibrated curve or an error is returned.
    pub fn calibrate(&self, premiums: &[f64], points_upfront: &[f64]) -> CreditResult<CreditCurve> {
        self.check_quotes("premiums", premiums)?;
        self.check_quotes("points_upfront", points_upfront)?;
        self.solver
            .validate()
            .map_err(|e| CreditError::config(e.to_string()))?;

        let mut run = Bootstrap::new(self)?;
        for i in 0..self.len() {
            run.solve_node(i, premiums[i], points_upfront[i])?;
        }
        Ok(run.finish())
    }

    fn check_quotes(&self, what: &'static str, values: &[f64]) -> CreditResult<()> {
        if values.is_empty() {
            return Err(CreditError::EmptyInput { what });
        }
        if values.len() != self.len() {
            return Err(CreditError::length_mismatch(what, self.len(), values.len()));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(CreditError::invalid_market_data(format!(
                "{what} must be finite, got {v}"
            )));
        }
        Ok(())
    }
}

fn check_instruments(cds: &[CdsAnalytic]) -> CreditResult<()> {
    let Some(first) = cds.first() else {
        return Err(CreditError::EmptyInput { what: "cds" });
    };

    for (i, pair) in cds.windows(2).enumerate() {
        let (prev, current) = (pair[0].protection_end(), pair[1].protection_end());
        if current <= prev {
            return Err(CreditError::NonIncreasingMaturity {
                index: i + 1,
                prev,
                current,
            });
        }
    }

    for (index, c) in cds.iter().enumerate().skip(1) {
        let field = if c.pay_acc_on_default() != first.pay_acc_on_default() {
            "pay_accrued_on_default"
        } else if c.acc_start() != first.acc_start() {
            "accrual_start"
        } else if c.effective_protection_start() != first.effective_protection_start() {
            "effective_protection_start"
        } else if c.cash_settle_time() != first.cash_settle_time() {
            "cash_settle_time"
        } else {
            continue;
        };
        return Err(CreditError::InconsistentConventions { index, field });
    }
    Ok(())
}

/// First node at or after `eff_end`, or the last node.
fn coupon_node(maturities: &[f64], eff_end: f64) -> usize {
    maturities
        .partition_point(|&t| t < eff_end - KNOT_TOLERANCE)
        .min(maturities.len() - 1)
}

/// The terms of node `i`'s equation that do not move while it is solved.
struct NodeEquation {
    node: usize,
    premium: f64,
    lgd: f64,
    valuation_df: f64,
    dirty_pv: f64,
    fixed_protection: f64,
    fixed_premium: f64,
}

/// State of one calibration run.
///
/// `curve` holds solved rates for nodes `0..solved`; only node `solved` is
/// written while it is being solved.
struct Bootstrap<'a> {
    calibrator: &'a CreditCurveCalibrator,
    curve: CreditCurve,
    protection_pv: Vec<f64>,
    premium_pv: Vec<f64>,
    solved: usize,
}

impl<'a> Bootstrap<'a> {
    fn new(calibrator: &'a CreditCurveCalibrator) -> CreditResult<Self> {
        Ok(Self {
            calibrator,
            curve: CreditCurve::flat_with_nodes(calibrator.maturities.clone(), 0.0)?,
            protection_pv: vec![0.0; calibrator.protection.len()],
            premium_pv: vec![0.0; calibrator.premium.len()],
            solved: 0,
        })
    }

    fn equation(&self, i: usize, premium: f64, puf: f64) -> NodeEquation {
        let cal = self.calibrator;
        let frontier = &cal.cds_knot_coupons[i];
        let fixed_premium = cal.cds_coupons[i]
            .iter()
            .filter(|c| frontier.binary_search(c).is_err())
            .map(|&c| self.premium_pv[c])
            .sum();
        NodeEquation {
            node: i,
            premium,
            lgd: cal.lgd[i],
            valuation_df: cal.valuation_df[i],
            dirty_pv: puf - premium * cal.accrued[i],
            fixed_protection: self.protection_pv[..i].iter().sum(),
            fixed_premium,
        }
    }

    /// Writes `rate` into the frontier node and returns the residual and its
    /// derivative.
    fn evaluate(&mut self, eq: &NodeEquation, rate: f64) -> (f64, f64) {
        let cal = self.calibrator;
        let i = eq.node;
        self.curve.set_rate(i, rate);

        let protection = cal.protection[i].pv_and_sensitivity(&self.curve);
        let mut premium = LegValue::new(eq.fixed_premium, 0.0);
        for &c in &cal.cds_knot_coupons[i] {
            premium += cal.premium[c].pv_and_sensitivity_for(&self.curve, i);
        }

        let value = (eq.lgd * (eq.fixed_protection + protection.pv) - eq.premium * premium.pv)
            / eq.valuation_df
            - eq.dirty_pv;
        let derivative =
            (eq.lgd * protection.sensitivity - eq.premium * premium.sensitivity) / eq.valuation_df;
        (value, derivative)
    }

    fn solve_node(&mut self, i: usize, premium: f64, puf: f64) -> CreditResult<()> {
        debug_assert_eq!(i, self.solved, "nodes are solved in order");
        let cal = self.calibrator;
        let eq = self.equation(i, premium, puf);
        let t = cal.maturities[i];
        let mut guess = (premium + puf / t) / eq.lgd;

        match (cal.arbitrage, i) {
            (ArbitrageHandling::Ignore, _) => {}
            (_, 0) => guess = guess.max(0.0),
            (policy, _) => {
                let min_rate = self.curve.rt_at_index(i - 1) / t;
                let (pv_at_floor, _) = self.evaluate(&eq, min_rate);
                if pv_at_floor > 0.0 {
                    if policy == ArbitrageHandling::Fail {
                        let quote = if puf == 0.0 {
                            QuoteKind::ParSpread
                        } else {
                            QuoteKind::PremiumAndUpfront
                        };
                        return Err(CreditError::Arbitrage {
                            index: i,
                            quote,
                            pv_at_floor,
                        });
                    }
                    warn!(
                        node = i,
                        maturity = t,
                        pv_at_floor,
                        "quote implies a negative forward hazard rate; flooring at zero"
                    );
                    self.accept(i, min_rate);
                    return Ok(());
                }
                guess = guess.max(min_rate);
            }
        }

        let result = newton_raphson_fdf(|h| self.evaluate(&eq, h), guess, &cal.solver)
            .map_err(|source| CreditError::SolverFailed { index: i, source })?;
        debug!(
            node = i,
            maturity = t,
            rate = result.root,
            iterations = result.iterations,
            residual = result.residual,
            "solved credit curve node"
        );
        self.accept(i, result.root);
        Ok(())
    }

    /// Fixes the rate of node `i` and refreshes every cached value it moves.
    fn accept(&mut self, i: usize, rate: f64) {
        let cal = self.calibrator;
        self.curve.set_rate(i, rate);
        self.protection_pv[i] = cal.protection[i].pv_and_sensitivity(&self.curve).pv;
        for &c in &cal.knot_coupons[i] {
            self.premium_pv[c] = cal.premium[c].pv_and_sensitivity(&self.curve).pv;
        }
        self.solved = i + 1;
    }

    fn finish(self) -> CreditCurve {
        self.curve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::CdsMarketInfo;
    use crate::valuation::Cds;
    use approx::assert_relative_eq;

    fn ladder(maturities: &[f64]) -> Vec<CdsAnalytic> {
        maturities
            .iter()
            .map(|&m| {
                CdsAnalytic::builder()
                    .accrual_start(-0.1)
                    .maturity(m)
                    .cash_settle_time(3.0 / 365.0)
                    .build()
                    .unwrap()
            })
            .collect()
    }

    fn yield_curve() -> YieldCurve {
        YieldCurve::new(vec![0.25, 1.0, 2.0, 5.0, 10.0], vec![0.01, 0.015, 0.02, 0.025, 0.03])
            .unwrap()
    }

    fn calibrator(arbitrage: ArbitrageHandling) -> CreditCurveCalibrator {
        CreditCurveCalibrator::new(
            &ladder(&[1.0, 2.0, 3.0, 5.0, 7.0]),
            &yield_curve(),
            AccrualOnDefaultFormula::OriginalIsda,
            arbitrage,
        )
        .unwrap()
    }

    #[test]
    fn test_shared_coupons_are_deduplicated() {
        let cal = calibrator(ArbitrageHandling::Ignore);
        // Regular quarterly schedules share every coupon with the longest CDS
        assert_eq!(cal.num_premium_elements(), 28);
        assert_eq!(cal.cds_coupons(0).len(), 4);
        assert_eq!(cal.cds_coupons(4).len(), 28);
        assert_eq!(cal.cds_coupons(0), &cal.cds_coupons(4)[..4]);
    }

    #[test]
    fn test_coupon_maps() {
        let cal = calibrator(ArbitrageHandling::Ignore);
        // Node 1 covers (1, 2]: coupons 4..8 of the 7Y schedule
        assert_eq!(cal.knot_coupons(1), &[4, 5, 6, 7]);
        assert_eq!(cal.cds_knot_coupons(1), &[4, 5, 6, 7]);
        // The 1Y CDS has no coupons after its maturity
        for i in 0..cal.len() {
            for c in cal.cds_knot_coupons(i) {
                assert!(cal.knot_coupons(i).contains(c));
                assert!(cal.cds_coupons(i).contains(c));
            }
        }
        assert_eq!(cal.protection_elements().len(), 5);
        assert_eq!(cal.protection_elements()[3].node(), 3);
    }

    #[test]
    fn test_calibrated_curve_reprices_quotes() {
        let cds = ladder(&[1.0, 2.0, 3.0, 5.0, 7.0]);
        let yc = yield_curve();
        let cal = CreditCurveCalibrator::new(
            &cds,
            &yc,
            AccrualOnDefaultFormula::MarkitFix,
            ArbitrageHandling::Ignore,
        )
        .unwrap();
        let premiums = [0.01; 5];
        let puf = [0.0, 0.005, 0.01, 0.02, 0.03];
        let curve = cal.calibrate(&premiums, &puf).unwrap();

        for (i, c) in cds.iter().enumerate() {
            let pricer = Cds::new(c, &yc, curve.times(), AccrualOnDefaultFormula::MarkitFix);
            let market = CdsMarketInfo::new(premiums[i], puf[i], 0.4).unwrap();
            assert!(pricer.pv(&curve, &market).abs() < 1e-10, "CDS {i}");
        }
    }

    #[test]
    fn test_flat_spreads_give_near_flat_hazard() {
        let curve = calibrator(ArbitrageHandling::Ignore)
            .calibrate_par_spreads(&[0.012; 5])
            .unwrap();
        for &r in curve.zero_rates() {
            assert_relative_eq!(r, 0.012 / 0.6, max_relative = 0.02);
        }
    }

    #[test]
    fn test_quote_validation() {
        let cal = calibrator(ArbitrageHandling::Ignore);
        assert!(matches!(
            cal.calibrate(&[], &[]),
            Err(CreditError::EmptyInput { what: "premiums" })
        ));
        assert!(matches!(
            cal.calibrate(&[0.01; 5], &[0.0; 4]),
            Err(CreditError::LengthMismatch {
                what: "points_upfront",
                expected: 5,
                got: 4
            })
        ));
        assert!(matches!(
            cal.calibrate_par_spreads(&[0.01, 0.01, f64::NAN, 0.01, 0.01]),
            Err(CreditError::InvalidMarketData { .. })
        ));
    }

    #[test]
    fn test_instrument_validation() {
        let yc = yield_curve();
        let formula = AccrualOnDefaultFormula::OriginalIsda;
        let policy = ArbitrageHandling::Ignore;

        let err = CreditCurveCalibrator::new(&[], &yc, formula, policy).unwrap_err();
        assert_eq!(err, CreditError::EmptyInput { what: "cds" });

        let err = CreditCurveCalibrator::new(&ladder(&[1.0, 3.0, 2.0]), &yc, formula, policy)
            .unwrap_err();
        assert!(matches!(err, CreditError::NonIncreasingMaturity { index: 2, .. }));

        let mut cds = ladder(&[1.0, 2.0]);
        cds.push(
            CdsAnalytic::builder()
                .accrual_start(-0.1)
                .maturity(3.0)
                .build()
                .unwrap(),
        );
        let err = CreditCurveCalibrator::new(&cds, &yc, formula, policy).unwrap_err();
        assert_eq!(
            err,
            CreditError::InconsistentConventions {
                index: 2,
                field: "cash_settle_time"
            }
        );
    }

    #[test]
    fn test_solver_failure_names_node() {
        let cal = calibrator(ArbitrageHandling::Ignore)
            .with_solver_config(SolverConfig::new(1e-15, 1));
        let err = cal.calibrate_par_spreads(&[0.01; 5]).unwrap_err();
        assert!(matches!(err, CreditError::SolverFailed { index: 0, .. }));
    }
}
