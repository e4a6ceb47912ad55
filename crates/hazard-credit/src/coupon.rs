//! CDS premium coupons.

use crate::error::{CreditError, CreditResult};

/// One accrual period of a CDS premium leg, in year fractions from today.
///
/// The effective start and end are the times over which the protection
/// buyer accrues premium (and over which accrual on default is integrated);
/// the payment time is when the coupon is paid. `year_frac` is measured in the
/// premium day count, so it generally differs from `eff_end - eff_start`; the
/// ratio of the two scales the accrual on default integral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdsCoupon {
    eff_start: f64,
    eff_end: f64,
    payment_time: f64,
    year_frac: f64,
    yf_ratio: f64,
}

impl CdsCoupon {
    /// Creates a coupon whose year-fraction ratio is
    /// `year_frac / (eff_end - eff_start)`.
    pub fn new(
        eff_start: f64,
        eff_end: f64,
        payment_time: f64,
        year_frac: f64,
    ) -> CreditResult<Self> {
        let ratio = year_frac / (eff_end - eff_start);
        Self::with_ratio(eff_start, eff_end, payment_time, year_frac, ratio)
    }

    /// Creates a coupon with an explicit year-fraction ratio.
    pub fn with_ratio(
        eff_start: f64,
        eff_end: f64,
        payment_time: f64,
        year_frac: f64,
        yf_ratio: f64,
    ) -> CreditResult<Self> {
        let values = [eff_start, eff_end, payment_time, year_frac, yf_ratio];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CreditError::invalid_instrument(format!(
                "coupon fields must be finite: {values:?}"
            )));
        }
        if eff_end <= eff_start {
            return Err(CreditError::invalid_instrument(format!(
                "coupon accrual end {eff_end} must be after its start {eff_start}"
            )));
        }
        if year_frac < 0.0 || yf_ratio < 0.0 {
            return Err(CreditError::invalid_instrument(
                "coupon year fraction must be non-negative",
            ));
        }
        Ok(Self {
            eff_start,
            eff_end,
            payment_time,
            year_frac,
            yf_ratio,
        })
    }

    /// Start of accrual.
    #[must_use]
    pub fn eff_start(&self) -> f64 {
        self.eff_start
    }

    /// End of accrual; survival to this time earns the coupon.
    #[must_use]
    pub fn eff_end(&self) -> f64 {
        self.eff_end
    }

    /// Payment time.
    #[must_use]
    pub fn payment_time(&self) -> f64 {
        self.payment_time
    }

    /// Accrual year fraction in the premium day count.
    #[must_use]
    pub fn year_frac(&self) -> f64 {
        self.year_frac
    }

    /// `year_frac` per unit of curve time.
    #[must_use]
    pub fn yf_ratio(&self) -> f64 {
        self.yf_ratio
    }

    pub(crate) fn key(&self) -> CouponKey {
        CouponKey([
            self.eff_start.to_bits(),
            self.eff_end.to_bits(),
            self.payment_time.to_bits(),
            self.year_frac.to_bits(),
        ])
    }
}

/// Hashable coupon identity used to share one premium element between CDS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CouponKey([u64; 4]);
