//! Synthetic futures strips for testing and benchmarking.
//!
//! Generates an upward-sloping term structure with small random noise and
//! prices a strip of consecutive delivery months off it.

use crate::core::calendar::Calendar;
use crate::core::contract::PriceQuote;
use crate::core::daycount::{year_fraction, yield_to_price, BUSINESS_DAYS_PER_YEAR};
use crate::core::error::{CurveError, CurveResult};
use crate::core::ticker::Ticker;
use crate::providers::MarketSnapshot;
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a synthetic strip.
#[derive(Debug, Clone)]
pub struct StripConfig {
    /// Futures family the quotes are filed under.
    pub family: String,
    /// Policy-rate series written alongside the quotes.
    pub policy_rate_series: String,
    /// Number of contracts in the strip.
    pub contracts: usize,
    /// Months between consecutive delivery months.
    pub month_step: u32,
    /// Annual rate at the short end.
    pub base_rate: f64,
    /// Rate added per year of maturity.
    pub slope: f64,
    /// Maximum absolute noise added to each contract's rate.
    pub noise: f64,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            family: "DI1".to_string(),
            policy_rate_series: "12".to_string(),
            contracts: 12,
            month_step: 3,
            base_rate: 0.1065,
            slope: 0.002,
            noise: 0.0005,
        }
    }
}

impl StripConfig {
    /// Tickers of the strip, starting with the month after `reference_date`.
    pub fn tickers(&self, reference_date: NaiveDate) -> CurveResult<Vec<Ticker>> {
        let out_of_range = || {
            CurveError::domain(format!(
                "{} contracts every {} months leave the ticker range",
                self.contracts, self.month_step
            ))
        };
        let step = i32::try_from(self.month_step.max(1)).map_err(|_| out_of_range())?;
        // Months counted from year 0 so that stepping wraps across years.
        let start = reference_date.year() * 12 + reference_date.month0() as i32 + 1;
        (0..self.contracts)
            .map(|i| {
                let index = i32::try_from(i)
                    .ok()
                    .and_then(|i| i.checked_mul(step))
                    .and_then(|offset| start.checked_add(offset))
                    .ok_or_else(out_of_range)?;
                Ticker::from_year_month(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
            })
            .collect()
    }

    /// Last calendar year touched by a strip starting at `reference_date`.
    pub fn last_year(&self, reference_date: NaiveDate) -> CurveResult<i32> {
        Ok(self
            .tickers(reference_date)?
            .last()
            .map(|t| t.year())
            .unwrap_or_else(|| reference_date.year()))
    }
}

/// Generate a strip of settlement prices using the thread-local RNG.
pub fn generate_strip(
    reference_date: NaiveDate,
    config: &StripConfig,
    calendar: &Calendar,
) -> CurveResult<Vec<PriceQuote>> {
    generate_strip_with_rng(reference_date, config, calendar, &mut rand::thread_rng())
}

/// Generate a strip of settlement prices from the given RNG.
///
/// Prices strictly decrease along the strip as long as the sampled rates stay
/// positive.
pub fn generate_strip_with_rng<R: Rng>(
    reference_date: NaiveDate,
    config: &StripConfig,
    calendar: &Calendar,
    rng: &mut R,
) -> CurveResult<Vec<PriceQuote>> {
    if !(config.noise >= 0.0) {
        return Err(CurveError::domain(format!(
            "noise must be non-negative, got {}",
            config.noise
        )));
    }

    let mut quotes = Vec::with_capacity(config.contracts);
    for ticker in config.tickers(reference_date)? {
        let expiry = calendar.expiry_of(&ticker)?;
        let business_days = calendar.business_days_between(reference_date, expiry)?;
        if business_days <= 0 {
            continue;
        }

        let noise = if config.noise > 0.0 {
            rng.gen_range(-config.noise..config.noise)
        } else {
            0.0
        };
        let rate = config.base_rate + config.slope * year_fraction(business_days) + noise;
        let price = yield_to_price(rate, business_days)?;
        let price = Decimal::from_f64_retain(price)
            .ok_or_else(|| CurveError::domain(format!("unrepresentable price {price}")))?
            .round_dp(2);

        quotes.push(PriceQuote::new(ticker.to_string(), price));
    }

    log::debug!(
        "generated {} synthetic {} quotes from {}",
        quotes.len(),
        config.family,
        reference_date
    );
    Ok(quotes)
}

/// Generate a snapshot holding one strip and the matching overnight fixing.
pub fn generate_snapshot(
    reference_date: NaiveDate,
    config: &StripConfig,
    calendar: &Calendar,
) -> CurveResult<MarketSnapshot> {
    let quotes = generate_strip(reference_date, config, calendar)?;
    let daily_percent =
        ((1.0 + config.base_rate).powf(1.0 / BUSINESS_DAYS_PER_YEAR) - 1.0) * 100.0;

    let mut snapshot = MarketSnapshot::new();
    snapshot.set_quotes(reference_date, config.family.clone(), quotes);
    snapshot.set_policy_rate(config.policy_rate_series.clone(), reference_date, daily_percent);
    Ok(snapshot)
}
