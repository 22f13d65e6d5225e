use super::{MarketDataProvider, PolicyRateProvider, ProviderError};
use crate::core::contract::PriceQuote;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Captured market data: settlement prices per date and family, plus
/// policy-rate fixings per series.
///
/// Serves as both a [`MarketDataProvider`] and a [`PolicyRateProvider`].
/// Lookups for dates or families that were never captured fail with
/// [`ProviderError::NotFound`] rather than returning an empty strip.
///
/// # JSON format
///
/// ```json
/// {
///   "quotes": {
///     "2023-09-01": { "DI1": [ { "ticker": "F24", "price": "97512.34" } ] }
///   },
///   "policy_rates": {
///     "12": { "2023-09-01": 0.049037 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    quotes: BTreeMap<NaiveDate, BTreeMap<String, Vec<PriceQuote>>>,
    /// series -> date -> fixing in percent per day
    #[serde(default)]
    policy_rates: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String, ProviderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Record settlement prices for `family` on `date`, replacing earlier ones.
    pub fn set_quotes(
        &mut self,
        date: NaiveDate,
        family: impl Into<String>,
        quotes: impl IntoIterator<Item = PriceQuote>,
    ) {
        self.quotes
            .entry(date)
            .or_default()
            .insert(family.into(), quotes.into_iter().collect());
    }

    /// Record a policy-rate fixing, in percent per day.
    pub fn set_policy_rate(&mut self, series: impl Into<String>, date: NaiveDate, percent: f64) {
        self.policy_rates
            .entry(series.into())
            .or_default()
            .insert(date, percent);
    }

    /// Dates for which settlement prices were captured.
    pub fn quote_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.quotes.keys().copied()
    }
}

impl MarketDataProvider for MarketSnapshot {
    fn settlement_prices(
        &self,
        date: NaiveDate,
        family: &str,
    ) -> Result<Vec<PriceQuote>, ProviderError> {
        self.quotes
            .get(&date)
            .and_then(|families| families.get(family))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                what: format!("{family} settlement prices for {date}"),
            })
    }
}

impl PolicyRateProvider for MarketSnapshot {
    fn daily_rates(
        &self,
        series: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, ProviderError> {
        let fixings = self
            .policy_rates
            .get(series)
            .ok_or_else(|| ProviderError::NotFound {
                what: format!("policy-rate series '{series}'"),
            })?;
        if end < start {
            return Ok(BTreeMap::new());
        }
        Ok(fixings
            .range(start..=end)
            .map(|(d, r)| (*d, *r))
            .collect())
    }
}
