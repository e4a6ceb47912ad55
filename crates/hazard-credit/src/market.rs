//! Market quote for a single CDS.

use crate::error::{CreditError, CreditResult};

/// A CDS quote in the form the valuation code consumes: running coupon,
/// points-upfront and loss given default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdsMarketInfo {
    coupon: f64,
    puf: f64,
    lgd: f64,
}

impl CdsMarketInfo {
    /// Creates a quote from a fractional coupon (0.01 for 100bp), fractional
    /// points-upfront and a recovery rate in `[0, 1)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hazard_credit::market::CdsMarketInfo;
    ///
    /// let quote = CdsMarketInfo::new(0.01, 0.02, 0.4).unwrap();
    /// assert!((quote.lgd() - 0.6).abs() < 1e-15);
    /// ```
    pub fn new(coupon: f64, points_upfront: f64, recovery_rate: f64) -> CreditResult<Self> {
        if !(0.0..1.0).contains(&recovery_rate) {
            return Err(CreditError::invalid_market_data(format!(
                "recovery rate must be in [0, 1), got {recovery_rate}"
            )));
        }
        if !coupon.is_finite() || !points_upfront.is_finite() {
            return Err(CreditError::invalid_market_data(format!(
                "coupon and points-upfront must be finite, got {coupon} and {points_upfront}"
            )));
        }
        Ok(Self {
            coupon,
            puf: points_upfront,
            lgd: 1.0 - recovery_rate,
        })
    }

    /// Running coupon.
    #[must_use]
    pub fn coupon(&self) -> f64 {
        self.coupon
    }

    /// Points-upfront.
    #[must_use]
    pub fn puf(&self) -> f64 {
        self.puf
    }

    /// Loss given default.
    #[must_use]
    pub fn lgd(&self) -> f64 {
        self.lgd
    }
}
