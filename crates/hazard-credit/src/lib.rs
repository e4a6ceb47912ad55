//! # Hazard Credit
//!
//! CDS valuation and credit curve bootstrapping under the ISDA standard model.
//!
//! This crate provides:
//!
//! - **Instruments**: [`CdsCoupon`] and [`CdsAnalytic`], a CDS reduced to
//!   year fractions from today
//! - **Leg elements**: protection and premium leg values with analytic
//!   sensitivities to one credit curve node ([`legs`])
//! - **Calibration**: [`CreditCurveCalibrator`] and the
//!   [`SuperFastCreditCurveBuilder`] facade, with configurable
//!   accrual-on-default formula and arbitrage handling
//! - **Pricing**: [`Cds`] for the calibration-consistent net value and
//!   [`AnalyticCdsPricer`] for par spreads, annuities and their sensitivities
//!   to credit and yield curve nodes
//!
//! ## Quick Start
//!
//! ```rust
//! use hazard_credit::prelude::*;
//!
//! let yield_curve = YieldCurve::new(vec![1.0, 5.0, 10.0], vec![0.02, 0.025, 0.03]).unwrap();
//! let cds: Vec<_> = [1.0, 3.0, 5.0, 7.0]
//!     .iter()
//!     .map(|&m| {
//!         CdsAnalytic::builder()
//!             .accrual_start(-0.1)
//!             .maturity(m)
//!             .recovery_rate(0.4)
//!             .build()
//!             .unwrap()
//!     })
//!     .collect();
//!
//! let spreads = [0.005, 0.007, 0.009, 0.01];
//! let curve = SuperFastCreditCurveBuilder::new()
//!     .calibrate_par_spreads(&cds, &spreads, &yield_curve)
//!     .unwrap();
//!
//! let pricer = AnalyticCdsPricer::default();
//! let par = pricer.par_spread(&cds[2], &yield_curve, &curve);
//! assert!((par - 0.009).abs() < 1e-10);
//! ```
//!
//! ## Features
//!
//! - `parallel`: run [`SuperFastCreditCurveBuilder::calibrate_batch`] on the
//!   rayon thread pool

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]

pub mod builder;
pub mod calibrator;
pub mod cds;
pub mod config;
pub mod coupon;
pub mod error;
pub mod legs;
pub mod market;
pub mod pricer;
pub mod valuation;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{CalibrationRequest, SuperFastCreditCurveBuilder};
    pub use crate::calibrator::{ArbitrageHandling, CreditCurveCalibrator};
    pub use crate::cds::{CdsAnalytic, CdsAnalyticBuilder};
    pub use crate::config::CalibrationConfig;
    pub use crate::coupon::CdsCoupon;
    pub use crate::error::{CreditError, CreditResult, QuoteKind};
    pub use crate::legs::{
        AccrualOnDefaultFormula, CdsPremiumPayment, CouponOnlyElement, LegValue,
        PremiumLegElement, ProtectionLegElement,
    };
    pub use crate::market::CdsMarketInfo;
    pub use crate::pricer::{AnalyticCdsPricer, PriceType};
    pub use crate::valuation::Cds;
    pub use hazard_curves::{CreditCurve, YieldCurve};
    pub use hazard_math::solvers::SolverConfig;
}

pub use builder::{CalibrationRequest, SuperFastCreditCurveBuilder};
pub use calibrator::{ArbitrageHandling, CreditCurveCalibrator};
pub use cds::CdsAnalytic;
pub use coupon::CdsCoupon;
pub use error::{CreditError, CreditResult};
pub use legs::AccrualOnDefaultFormula;
pub use market::CdsMarketInfo;
pub use pricer::AnalyticCdsPricer;
pub use valuation::Cds;
