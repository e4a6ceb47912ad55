//! # Hazard Curves
//!
//! ISDA-style term structures for the Hazard credit curve library.
//!
//! This crate provides:
//!
//! - **Yield curve**: [`YieldCurve`], zero rates with linear `RT` interpolation
//! - **Credit curve**: [`CreditCurve`], zero hazard rates on the same
//!   representation, with per-node sensitivities for bootstrapping
//! - **Knots**: [`knots`], merged integration grids for the leg integrals
//!
//! ## Quick Start
//!
//! ```rust
//! use hazard_curves::prelude::*;
//!
//! let yield_curve = YieldCurve::new(vec![1.0, 5.0], vec![0.02, 0.025]).unwrap();
//! let credit_curve = CreditCurve::new(vec![1.0, 5.0], vec![0.01, 0.015]).unwrap();
//!
//! // Risky discount factor at 3 years
//! let risky_df = yield_curve.discount_factor(3.0) * credit_curve.survival_probability(3.0);
//! assert!(risky_df < 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]

pub mod credit_curve;
pub mod error;
pub mod isda_curve;
pub mod knots;
pub mod yield_curve;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::credit_curve::CreditCurve;
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::knots::{integration_points, truncate_set_inclusive};
    pub use crate::yield_curve::YieldCurve;
}

pub use credit_curve::CreditCurve;
pub use error::{CurveError, CurveResult};
pub use yield_curve::YieldCurve;
