//! # Hazard Math
//!
//! Numerical primitives for the Hazard credit curve library.
//!
//! This crate provides:
//!
//! - **Epsilon functions**: Stable evaluation of `(e^x - 1)/x` and its first two
//!   derivatives, used by the default-contingent leg integrals when the
//!   combined hazard and discount increment over a knot interval is tiny
//! - **Solvers**: Newton-Raphson root finding with an analytic derivative
//!
//! ## Design Philosophy
//!
//! - **Numerical Stability**: Closed forms where they are accurate, Taylor
//!   expansions where they are not
//! - **Explicit Errors**: Non-convergence is reported, never silently accepted

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]

pub mod epsilon;
pub mod error;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::epsilon::{epsilon, epsilon_p, epsilon_pp};
    pub use crate::error::{MathError, MathResult};
    pub use crate::solvers::{newton_raphson, newton_raphson_fdf, SolverConfig, SolverResult};
}

pub use error::{MathError, MathResult};
