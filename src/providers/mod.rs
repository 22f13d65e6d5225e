//! Data collaborators consumed by the curve engine.
//!
//! The engine only depends on the traits below. Retrieval mechanics (HTTP,
//! bulletin scraping) live outside this crate; the implementations shipped
//! here are in-memory, file-backed or rule-based.

pub mod holidays;
pub mod snapshot;

use crate::core::contract::PriceQuote;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use thiserror::Error;

pub use holidays::{BrazilianHolidays, HolidayList};
pub use snapshot::MarketSnapshot;

/// Errors reported by data collaborators.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of exchange settlement prices.
pub trait MarketDataProvider {
    /// Settlement prices for every listed ticker of `family` on `date`.
    fn settlement_prices(
        &self,
        date: NaiveDate,
        family: &str,
    ) -> Result<Vec<PriceQuote>, ProviderError>;
}

/// Source of overnight policy-rate fixings.
pub trait PolicyRateProvider {
    /// Daily fixings of `series` in `[start, end]`, in percent per day.
    fn daily_rates(
        &self,
        series: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, ProviderError>;
}

/// Source of non-business dates for a jurisdiction.
pub trait HolidaySource {
    fn name(&self) -> &str;

    /// All holidays falling in the given calendar years.
    fn holidays(&self, years: RangeInclusive<i32>) -> Result<BTreeSet<NaiveDate>, ProviderError>;
}
