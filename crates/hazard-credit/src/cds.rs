//! Analytic (time-based) description of a CDS.
//!
//! A [`CdsAnalytic`] holds everything the ISDA model needs to value a CDS once
//! dates have been turned into year fractions from today: the premium coupons,
//! the protection window, the cash-settle time, whether accrued premium is
//! paid on default, the loss given default and the accrued year fraction at
//! trade time.
//!
//! [`CdsAnalyticBuilder`] generates a regular schedule directly in time
//! (periods rolled back from maturity, front stub from the accrual start).
//! It does not model dates, calendars or business-day adjustment.

use crate::coupon::CdsCoupon;
use crate::error::{CreditError, CreditResult};

/// Ratio of ACT/365F curve time to ACT/360 premium accrual.
pub const ACT_360_SCALE: f64 = 365.0 / 360.0;

/// Standard quarterly premium frequency, in years.
pub const QUARTERLY: f64 = 0.25;

/// Periods shorter than this are not generated.
const SCHEDULE_TOLERANCE: f64 = 1e-10;

/// A CDS expressed in year fractions from today.
#[derive(Debug, Clone, PartialEq)]
pub struct CdsAnalytic {
    coupons: Vec<CdsCoupon>,
    acc_start: f64,
    effective_protection_start: f64,
    protection_end: f64,
    cash_settle_time: f64,
    pay_acc_on_default: bool,
    lgd: f64,
    accrued_year_fraction: f64,
}

impl CdsAnalytic {
    /// Returns a builder for a CDS.
    #[must_use]
    pub fn builder() -> CdsAnalyticBuilder {
        CdsAnalyticBuilder::default()
    }

    /// The premium coupons, in accrual order.
    #[must_use]
    pub fn coupons(&self) -> &[CdsCoupon] {
        &self.coupons
    }

    /// Number of premium payments.
    #[must_use]
    pub fn num_payments(&self) -> usize {
        self.coupons.len()
    }

    /// Start of the first accrual period.
    #[must_use]
    pub fn acc_start(&self) -> f64 {
        self.acc_start
    }

    /// Start of protection.
    #[must_use]
    pub fn effective_protection_start(&self) -> f64 {
        self.effective_protection_start
    }

    /// End of protection (the maturity).
    #[must_use]
    pub fn protection_end(&self) -> f64 {
        self.protection_end
    }

    /// Time at which the upfront amount is settled; values are quoted here.
    #[must_use]
    pub fn cash_settle_time(&self) -> f64 {
        self.cash_settle_time
    }

    /// Whether accrued premium is paid on default.
    #[must_use]
    pub fn pay_acc_on_default(&self) -> bool {
        self.pay_acc_on_default
    }

    /// Loss given default, `1 - recovery`.
    #[must_use]
    pub fn lgd(&self) -> f64 {
        self.lgd
    }

    /// Premium accrued at trade time, per unit coupon.
    #[must_use]
    pub fn accrued_year_fraction(&self) -> f64 {
        self.accrued_year_fraction
    }

    fn validate(&self) -> CreditResult<()> {
        if self.coupons.is_empty() {
            return Err(CreditError::invalid_instrument("CDS has no coupons"));
        }
        for (i, pair) in self.coupons.windows(2).enumerate() {
            if pair[1].eff_end() <= pair[0].eff_end() {
                return Err(CreditError::invalid_instrument(format!(
                    "coupon {} ends at {} which is not after the previous end {}",
                    i + 1,
                    pair[1].eff_end(),
                    pair[0].eff_end()
                )));
            }
        }
        if !(self.protection_end > 0.0 && self.protection_end.is_finite()) {
            return Err(CreditError::invalid_instrument(format!(
                "protection end must be positive, got {}",
                self.protection_end
            )));
        }
        if self.effective_protection_start >= self.protection_end {
            return Err(CreditError::invalid_instrument(format!(
                "protection start {} is not before protection end {}",
                self.effective_protection_start, self.protection_end
            )));
        }
        if !(self.cash_settle_time >= 0.0) {
            return Err(CreditError::invalid_instrument(format!(
                "cash settle time must be non-negative, got {}",
                self.cash_settle_time
            )));
        }
        if !(self.lgd > 0.0 && self.lgd <= 1.0) {
            return Err(CreditError::invalid_instrument(format!(
                "loss given default must be in (0, 1], got {}",
                self.lgd
            )));
        }
        if !(self.accrued_year_fraction >= 0.0 && self.accrued_year_fraction.is_finite()) {
            return Err(CreditError::invalid_instrument(format!(
                "accrued year fraction must be non-negative, got {}",
                self.accrued_year_fraction
            )));
        }
        Ok(())
    }
}

/// Builder for [`CdsAnalytic`].
///
/// # Example
///
/// ```rust
/// use hazard_credit::cds::CdsAnalytic;
///
/// // 5Y CDS, quarterly premiums, accrual started a month ago
/// let cds = CdsAnalytic::builder()
///     .accrual_start(-1.0 / 12.0)
///     .maturity(5.0)
///     .recovery_rate(0.4)
///     .build()
///     .unwrap();
///
/// assert_eq!(cds.num_payments(), 20);
/// assert!(cds.accrued_year_fraction() > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct CdsAnalyticBuilder {
    accrual_start: f64,
    effective_protection_start: Option<f64>,
    maturity: Option<f64>,
    cash_settle_time: f64,
    pay_acc_on_default: bool,
    recovery_rate: f64,
    payment_interval: f64,
    accrual_scale: f64,
    coupons: Option<Vec<CdsCoupon>>,
    accrued_year_fraction: Option<f64>,
}

impl Default for CdsAnalyticBuilder {
    fn default() -> Self {
        Self {
            accrual_start: 0.0,
            effective_protection_start: None,
            maturity: None,
            cash_settle_time: 0.0,
            pay_acc_on_default: true,
            recovery_rate: 0.4,
            payment_interval: QUARTERLY,
            accrual_scale: ACT_360_SCALE,
            coupons: None,
            accrued_year_fraction: None,
        }
    }
}

impl CdsAnalyticBuilder {
    /// Start of the first accrual period (negative if accrual began before today).
    #[must_use]
    pub fn accrual_start(mut self, t: f64) -> Self {
        self.accrual_start = t;
        self
    }

    /// Start of protection; defaults to `max(accrual_start, 0)`.
    #[must_use]
    pub fn effective_protection_start(mut self, t: f64) -> Self {
        self.effective_protection_start = Some(t);
        self
    }

    /// End of protection.
    #[must_use]
    pub fn maturity(mut self, t: f64) -> Self {
        self.maturity = Some(t);
        self
    }

    /// Cash-settle time.
    #[must_use]
    pub fn cash_settle_time(mut self, t: f64) -> Self {
        self.cash_settle_time = t;
        self
    }

    /// Whether accrued premium is paid on default.
    #[must_use]
    pub fn pay_accrued_on_default(mut self, pay: bool) -> Self {
        self.pay_acc_on_default = pay;
        self
    }

    /// Recovery rate in `[0, 1)`.
    #[must_use]
    pub fn recovery_rate(mut self, recovery: f64) -> Self {
        self.recovery_rate = recovery;
        self
    }

    /// Length of a regular accrual period.
    #[must_use]
    pub fn payment_interval(mut self, interval: f64) -> Self {
        self.payment_interval = interval;
        self
    }

    /// Premium year fraction per unit of curve time.
    #[must_use]
    pub fn accrual_scale(mut self, scale: f64) -> Self {
        self.accrual_scale = scale;
        self
    }

    /// Uses the given coupons instead of generating a schedule.
    #[must_use]
    pub fn coupons(mut self, coupons: Vec<CdsCoupon>) -> Self {
        self.coupons = Some(coupons);
        self
    }

    /// Overrides the accrued year fraction.
    #[must_use]
    pub fn accrued_year_fraction(mut self, accrued: f64) -> Self {
        self.accrued_year_fraction = Some(accrued);
        self
    }

    /// Builds and validates the CDS.
    pub fn build(self) -> CreditResult<CdsAnalytic> {
        let maturity = self
            .maturity
            .ok_or_else(|| CreditError::invalid_instrument("maturity is required"))?;
        if !(0.0..1.0).contains(&self.recovery_rate) {
            return Err(CreditError::invalid_instrument(format!(
                "recovery rate must be in [0, 1), got {}",
                self.recovery_rate
            )));
        }

        let coupons = match self.coupons {
            Some(coupons) => coupons,
            None => self.regular_schedule(maturity)?,
        };
        let acc_start = coupons.first().map_or(self.accrual_start, CdsCoupon::eff_start);
        let accrued_year_fraction = self
            .accrued_year_fraction
            .unwrap_or_else(|| accrued_at_trade(&coupons));

        let cds = CdsAnalytic {
            coupons,
            acc_start,
            effective_protection_start: self
                .effective_protection_start
                .unwrap_or(acc_start.max(0.0)),
            protection_end: maturity,
            cash_settle_time: self.cash_settle_time,
            pay_acc_on_default: self.pay_acc_on_default,
            lgd: 1.0 - self.recovery_rate,
            accrued_year_fraction,
        };
        cds.validate()?;
        Ok(cds)
    }

    /// Periods rolled back from maturity by the payment interval. Roll times
    /// at or before today are dropped, so the first period runs from the
    /// accrual start to the first roll after today.
    fn regular_schedule(&self, maturity: f64) -> CreditResult<Vec<CdsCoupon>> {
        if !(self.payment_interval > 0.0) {
            return Err(CreditError::invalid_instrument(format!(
                "payment interval must be positive, got {}",
                self.payment_interval
            )));
        }
        if maturity <= self.accrual_start + SCHEDULE_TOLERANCE {
            return Err(CreditError::invalid_instrument(format!(
                "maturity {maturity} is not after the accrual start {}",
                self.accrual_start
            )));
        }

        let mut ends = Vec::new();
        let mut k = 0_u32;
        loop {
            let end = maturity - f64::from(k) * self.payment_interval;
            if end <= self.accrual_start + SCHEDULE_TOLERANCE || end <= 0.0 {
                break;
            }
            ends.push(end);
            k += 1;
        }
        ends.reverse();

        let mut coupons = Vec::with_capacity(ends.len());
        let mut start = self.accrual_start;
        for end in ends {
            let year_frac = (end - start) * self.accrual_scale;
            coupons.push(CdsCoupon::with_ratio(
                start,
                end,
                end,
                year_frac,
                self.accrual_scale,
            )?);
            start = end;
        }
        Ok(coupons)
    }
}

/// Premium accrued at time zero on the coupon whose accrual spans it.
fn accrued_at_trade(coupons: &[CdsCoupon]) -> f64 {
    coupons
        .iter()
        .find(|c| c.eff_start() < 0.0 && c.eff_end() > 0.0)
        .map_or(0.0, |c| -c.eff_start() * c.yf_ratio())
}
