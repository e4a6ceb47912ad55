//! Serializable calibration settings.

use hazard_math::solvers::{SolverConfig, DEFAULT_MAX_ITERATIONS};
use serde::{Deserialize, Serialize};

use crate::calibrator::{ArbitrageHandling, DEFAULT_CALIBRATION_TOLERANCE};
use crate::error::{CreditError, CreditResult};
use crate::legs::AccrualOnDefaultFormula;

/// Settings for [`SuperFastCreditCurveBuilder`](crate::builder::SuperFastCreditCurveBuilder).
///
/// Every field has a default, so a partial JSON object is accepted:
///
/// ```rust
/// use hazard_credit::config::CalibrationConfig;
/// use hazard_credit::calibrator::ArbitrageHandling;
///
/// let config = CalibrationConfig::from_json(r#"{ "arbitrage_handling": "fail" }"#).unwrap();
/// assert_eq!(config.arbitrage_handling, ArbitrageHandling::Fail);
/// assert_eq!(config.max_iterations, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Accrual-on-default integral.
    pub accrual_formula: AccrualOnDefaultFormula,
    /// Policy for quotes implying negative forward hazard rates.
    pub arbitrage_handling: ArbitrageHandling,
    /// Newton-Raphson tolerance.
    pub tolerance: f64,
    /// Newton-Raphson iteration limit per node.
    pub max_iterations: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            accrual_formula: AccrualOnDefaultFormula::default(),
            arbitrage_handling: ArbitrageHandling::default(),
            tolerance: DEFAULT_CALIBRATION_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl CalibrationConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> CreditResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CreditError::config(format!("malformed calibration config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> CreditResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CreditError::config(e.to_string()))
    }

    /// Checks the solver settings.
    pub fn validate(&self) -> CreditResult<()> {
        self.solver_config()
            .validate()
            .map_err(|e| CreditError::config(e.to_string()))
    }

    /// Newton-Raphson settings.
    #[must_use]
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.tolerance, self.max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CalibrationConfig::default();
        assert_eq!(config.accrual_formula, AccrualOnDefaultFormula::OriginalIsda);
        assert_eq!(config.arbitrage_handling, ArbitrageHandling::Ignore);
        assert_eq!(config.tolerance, 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = CalibrationConfig {
            accrual_formula: AccrualOnDefaultFormula::MarkitFix,
            arbitrage_handling: ArbitrageHandling::ZeroHazardRate,
            tolerance: 1e-10,
            max_iterations: 50,
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"markit_fix\""));
        assert!(json.contains("\"zero_hazard_rate\""));
        assert_eq!(CalibrationConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            CalibrationConfig::from_json(r#"{ "tolerance": -1.0 }"#),
            Err(CreditError::Config { .. })
        ));
        assert!(matches!(
            CalibrationConfig::from_json(r#"{ "max_iterations": 0 }"#),
            Err(CreditError::Config { .. })
        ));
        assert!(matches!(
            CalibrationConfig::from_json(r#"{ "accrual_formula": "exact" }"#),
            Err(CreditError::Config { .. })
        ));
    }
}
