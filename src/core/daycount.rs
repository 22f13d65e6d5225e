//! ACT/252 yield and forward-rate conversions.
//!
//! Rates are decimal fractions (0.05 = 5%) compounded annually over a year of
//! 252 business days. Prices are quoted as the discounted value of a fixed
//! redemption amount, [`FACE_VALUE`].

use crate::core::error::{CurveError, CurveResult};

/// Redemption value of one contract at expiry.
pub const FACE_VALUE: f64 = 100_000.0;

/// Business days per year under ACT/252.
pub const BUSINESS_DAYS_PER_YEAR: f64 = 252.0;

/// Day basis of the ACT/360 interpolation conventions.
pub const DAYS_PER_YEAR_360: f64 = 360.0;

/// Year fraction of a business-day span under ACT/252.
pub fn year_fraction(business_days: i64) -> f64 {
    business_days as f64 / BUSINESS_DAYS_PER_YEAR
}

/// Implied annual yield of a contract priced at `price` with `business_days`
/// to expiry: `(FACE_VALUE / price)^(252 / business_days) - 1`.
///
/// # Examples
///
/// ```
/// use futures_curve::core::daycount::price_to_yield;
///
/// let rate = price_to_yield(92_000.0, 252).unwrap();
/// assert!((rate - 0.0869565).abs() < 1e-6);
/// ```
pub fn price_to_yield(price: f64, business_days: i64) -> CurveResult<f64> {
    if business_days <= 0 {
        return Err(CurveError::domain(format!(
            "business days to expiry must be positive, got {business_days}"
        )));
    }
    if !(price > 0.0) {
        return Err(CurveError::domain(format!(
            "price must be positive, got {price}"
        )));
    }
    Ok((FACE_VALUE / price).powf(BUSINESS_DAYS_PER_YEAR / business_days as f64) - 1.0)
}

/// Price of a contract yielding `rate` with `business_days` to expiry.
pub fn yield_to_price(rate: f64, business_days: i64) -> CurveResult<f64> {
    if business_days < 0 {
        return Err(CurveError::domain(format!(
            "business days to expiry must not be negative, got {business_days}"
        )));
    }
    if !(rate > -1.0) {
        return Err(CurveError::domain(format!(
            "rate must be greater than -100%, got {rate}"
        )));
    }
    Ok(FACE_VALUE / (1.0 + rate).powf(year_fraction(business_days)))
}

/// Forward rate implied between two tenors by no-arbitrage carry:
///
/// `[(1+rate)^(bd/252) / (1+prev_rate)^(prev_bd/252)]^(252/forward_bd) - 1`
pub fn forward_rate(
    rate: f64,
    prev_rate: f64,
    business_days: i64,
    prev_business_days: i64,
    forward_business_days: i64,
) -> CurveResult<f64> {
    if forward_business_days <= 0 {
        return Err(CurveError::domain(format!(
            "forward business days must be positive, got {forward_business_days}"
        )));
    }
    let carry = (1.0 + rate).powf(year_fraction(business_days));
    let prev_carry = (1.0 + prev_rate).powf(year_fraction(prev_business_days));
    Ok((carry / prev_carry).powf(BUSINESS_DAYS_PER_YEAR / forward_business_days as f64) - 1.0)
}

/// Annualise a daily overnight rate quoted in percent: `(1 + pct/100)^252 - 1`.
pub fn annualize_overnight(daily_percent: f64) -> f64 {
    (1.0 + daily_percent / 100.0).powf(BUSINESS_DAYS_PER_YEAR) - 1.0
}
