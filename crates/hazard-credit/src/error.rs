//! Error types for CDS valuation and credit curve calibration.

use std::fmt;

use hazard_curves::CurveError;
use hazard_math::MathError;
use thiserror::Error;

/// A specialized Result type for credit operations.
pub type CreditResult<T> = Result<T, CreditError>;

/// How the offending quote of an arbitrage error was expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    /// Par spread (no points-upfront).
    ParSpread,
    /// Running premium plus points-upfront.
    PremiumAndUpfront,
}

impl fmt::Display for QuoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParSpread => write!(f, "par spread"),
            Self::PremiumAndUpfront => write!(f, "premium and points-upfront"),
        }
    }
}

/// Errors that can occur while building instruments or calibrating curves.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreditError {
    /// A CDS or coupon description is invalid.
    #[error("Invalid instrument: {reason}")]
    InvalidInstrument {
        /// What is wrong with the instrument.
        reason: String,
    },

    /// Calibration instruments do not share the same conventions.
    #[error("Inconsistent conventions at CDS {index}: {field} differs from CDS 0")]
    InconsistentConventions {
        /// Index of the first CDS that differs.
        index: usize,
        /// Name of the differing field.
        field: &'static str,
    },

    /// Calibration maturities are not strictly increasing.
    #[error("CDS maturities must be strictly increasing: {prev:.6} >= {current:.6} at index {index}")]
    NonIncreasingMaturity {
        /// Index of the offending CDS.
        index: usize,
        /// Previous maturity.
        prev: f64,
        /// Offending maturity.
        current: f64,
    },

    /// No calibration input was given.
    #[error("Empty input: {what}")]
    EmptyInput {
        /// Which input was empty.
        what: &'static str,
    },

    /// Input arrays have different lengths.
    #[error("Length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        /// Which input was mis-sized.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// A quote implies a negative forward hazard rate.
    #[error(
        "Quote {index} ({quote}) cannot be matched by a non-negative forward hazard rate \
         (PV at the zero-forward floor is {pv_at_floor:.3e})"
    )]
    Arbitrage {
        /// Index of the offending quote.
        index: usize,
        /// How the quote was expressed.
        quote: QuoteKind,
        /// Residual PV with a zero forward hazard on the new segment.
        pv_at_floor: f64,
    },

    /// The root finder failed on a curve node.
    #[error("Failed to solve credit curve node {index}: {source}")]
    SolverFailed {
        /// Node index.
        index: usize,
        /// Underlying solver error.
        #[source]
        source: MathError,
    },

    /// Invalid market data (recovery rate, quotes).
    #[error("Invalid market data: {reason}")]
    InvalidMarketData {
        /// What is wrong with the data.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {reason}")]
    Config {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Curve construction error.
    #[error(transparent)]
    Curve(#[from] CurveError),
}

impl CreditError {
    /// Creates an invalid instrument error.
    #[must_use]
    pub fn invalid_instrument(reason: impl Into<String>) -> Self {
        Self::InvalidInstrument {
            reason: reason.into(),
        }
    }

    /// Creates an invalid market data error.
    #[must_use]
    pub fn invalid_market_data(reason: impl Into<String>) -> Self {
        Self::InvalidMarketData {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Creates a length mismatch error.
    #[must_use]
    pub fn length_mismatch(what: &'static str, expected: usize, got: usize) -> Self {
        Self::LengthMismatch {
            what,
            expected,
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arbitrage_message_names_quote() {
        let err = CreditError::Arbitrage {
            index: 3,
            quote: QuoteKind::ParSpread,
            pv_at_floor: 1.5e-3,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Quote 3 (par spread)"));

        let err = CreditError::Arbitrage {
            index: 1,
            quote: QuoteKind::PremiumAndUpfront,
            pv_at_floor: 2e-4,
        };
        assert!(err.to_string().contains("premium and points-upfront"));
    }

    #[test]
    fn test_solver_failure_keeps_source() {
        use std::error::Error;

        let err = CreditError::SolverFailed {
            index: 2,
            source: MathError::convergence_failed(100, 1e-3),
        };
        assert!(err.to_string().contains("node 2"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_curve_error_converts() {
        let err: CreditError = CurveError::insufficient_points(1, 0).into();
        assert!(matches!(err, CreditError::Curve(_)));
    }
}
