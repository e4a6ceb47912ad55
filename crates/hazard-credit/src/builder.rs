//! Entry point for credit curve calibration.

use hazard_curves::{CreditCurve, YieldCurve};
use hazard_math::solvers::SolverConfig;

use crate::calibrator::{default_solver_config, ArbitrageHandling, CreditCurveCalibrator};
use crate::cds::CdsAnalytic;
use crate::config::CalibrationConfig;
use crate::error::CreditResult;
use crate::legs::AccrualOnDefaultFormula;

/// One independent calibration for [`SuperFastCreditCurveBuilder::calibrate_batch`].
#[derive(Debug, Clone, Copy)]
pub struct CalibrationRequest<'a> {
    /// Calibration instruments, in increasing maturity.
    pub cds: &'a [CdsAnalytic],
    /// Running premium per CDS.
    pub premiums: &'a [f64],
    /// Points-upfront per CDS.
    pub points_upfront: &'a [f64],
    /// Discount curve.
    pub yield_curve: &'a YieldCurve,
}

/// Builds credit curves from CDS quotes.
///
/// Holds the accrual-on-default formula, the arbitrage policy and the solver
/// settings; every call builds a fresh [`CreditCurveCalibrator`].
///
/// # Example
///
/// ```rust
/// use hazard_credit::prelude::*;
///
/// let yield_curve = YieldCurve::flat(0.02);
/// let cds = vec![CdsAnalytic::builder().maturity(5.0).recovery_rate(0.4).build().unwrap()];
///
/// let builder = SuperFastCreditCurveBuilder::new()
///     .with_formula(AccrualOnDefaultFormula::MarkitFix)
///     .with_arbitrage_handling(ArbitrageHandling::Fail);
/// let curve = builder.calibrate(&cds, &[0.01], &yield_curve, &[0.0]).unwrap();
///
/// // Credit triangle: hazard is close to spread / (1 - recovery)
/// assert!((curve.zero_rates()[0] - 0.01 / 0.6).abs() < 5e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuperFastCreditCurveBuilder {
    formula: AccrualOnDefaultFormula,
    arbitrage: ArbitrageHandling,
    solver: SolverConfig,
}

impl Default for SuperFastCreditCurveBuilder {
    fn default() -> Self {
        Self {
            formula: AccrualOnDefaultFormula::default(),
            arbitrage: ArbitrageHandling::default(),
            solver: default_solver_config(),
        }
    }
}

impl SuperFastCreditCurveBuilder {
    /// Creates a builder with the ISDA formula and no arbitrage checks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from validated settings.
    pub fn from_config(config: &CalibrationConfig) -> CreditResult<Self> {
        config.validate()?;
        Ok(Self {
            formula: config.accrual_formula,
            arbitrage: config.arbitrage_handling,
            solver: config.solver_config(),
        })
    }

    /// Sets the accrual-on-default formula.
    #[must_use]
    pub fn with_formula(mut self, formula: AccrualOnDefaultFormula) -> Self {
        self.formula = formula;
        self
    }

    /// Sets the arbitrage policy.
    #[must_use]
    pub fn with_arbitrage_handling(mut self, arbitrage: ArbitrageHandling) -> Self {
        self.arbitrage = arbitrage;
        self
    }

    /// Sets the Newton-Raphson configuration.
    #[must_use]
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
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

    /// Builds a calibrator that can be reused for many quote sets.
    pub fn calibrator(
        &self,
        cds: &[CdsAnalytic],
        yield_curve: &YieldCurve,
    ) -> CreditResult<CreditCurveCalibrator> {
        Ok(
            CreditCurveCalibrator::new(cds, yield_curve, self.formula, self.arbitrage)?
                .with_solver_config(self.solver),
        )
    }

    /// Calibrates a credit curve to running premiums and points-upfront.
    pub fn calibrate(
        &self,
        cds: &[CdsAnalytic],
        premiums: &[f64],
        yield_curve: &YieldCurve,
        points_upfront: &[f64],
    ) -> CreditResult<CreditCurve> {
        self.calibrator(cds, yield_curve)?
            .calibrate(premiums, points_upfront)
    }

    /// Calibrates a credit curve to par spreads.
    pub fn calibrate_par_spreads(
        &self,
        cds: &[CdsAnalytic],
        spreads: &[f64],
        yield_curve: &YieldCurve,
    ) -> CreditResult<CreditCurve> {
        self.calibrator(cds, yield_curve)?.calibrate_par_spreads(spreads)
    }

    /// Runs independent calibrations, in parallel with the `parallel`
    /// feature. Results are in request order.
    #[allow(clippy::let_and_return)]
    pub fn calibrate_batch(
        &self,
        requests: &[CalibrationRequest<'_>],
    ) -> Vec<CreditResult<CreditCurve>> {
        let run = |request: &CalibrationRequest<'_>| {
            self.calibrate(
                request.cds,
                request.premiums,
                request.yield_curve,
                request.points_upfront,
            )
        };

        #[cfg(feature = "parallel")]
        let results = {
            use rayon::prelude::*;
            requests.par_iter().map(run).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let results = requests.iter().map(run).collect();

        results
    }
}
