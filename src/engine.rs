//! Request-level entry points wiring the data collaborators to the curve core.
//!
//! Every request builds its own [`Calendar`] for the years it touches and
//! threads it through bootstrap, projection and exposure. Nothing is cached
//! between requests.

use crate::core::calendar::Calendar;
use crate::core::daycount::annualize_overnight;
use crate::core::error::{CurveError, CurveResult};
use crate::core::ticker::{InstrumentId, Ticker};
use crate::curve::bootstrap::{CurveBootstrap, ForwardCurveTable};
use crate::curve::interpolation::InterpolationMethod;
use crate::curve::projection::{CurveMode, DailyCurve};
use crate::providers::{
    HolidaySource, MarketDataProvider, PolicyRateProvider, ProviderError,
};
use crate::risk::exposure::{ExposureEngine, ExposureTable};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine settings. Missing fields in a config file take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Futures family requested from the market data provider.
    pub instrument_family: String,
    /// Overnight policy-rate series anchoring the reference date.
    pub policy_rate_series: String,
    pub mode: CurveMode,
    pub interpolation: InterpolationMethod,
    /// Parallel rate shock for exposures, as a decimal (0.01 = 100 bp).
    pub shock: f64,
    /// Calendar days past the target date covered by a single-date lookup.
    pub yield_day_horizon_days: i64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            instrument_family: "DI1".to_string(),
            policy_rate_series: "12".to_string(),
            mode: CurveMode::Forward,
            interpolation: InterpolationMethod::Linear,
            shock: 0.01,
            yield_day_horizon_days: 365,
        }
    }
}

impl CurveConfig {
    /// Parse a JSON config. An unknown `interpolation` name fails with
    /// `UnsupportedInterpolation`; other malformed input surfaces as a parse
    /// error.
    pub fn from_json(json: &str) -> CurveResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(ProviderError::from)?;
        if let Some(name) = value.get("interpolation").and_then(|v| v.as_str()) {
            name.parse::<InterpolationMethod>()?;
        }
        Ok(serde_json::from_value(value).map_err(ProviderError::from)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> CurveResult<Self> {
        Self::from_json(&fs::read_to_string(path).map_err(ProviderError::from)?)
    }
}

/// Curve construction and exposure requests over a set of collaborators.
///
/// # Examples
///
/// ```
/// use futures_curve::prelude::*;
/// use futures_curve::providers::{BrazilianHolidays, MarketSnapshot};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let reference = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
/// let mut snapshot = MarketSnapshot::new();
/// snapshot.set_quotes(reference, "DI1", vec![
///     PriceQuote::new("F24", dec!(97_130)),
///     PriceQuote::new("J24", dec!(94_600)),
/// ]);
/// snapshot.set_policy_rate("12", reference, 0.049037);
///
/// let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, CurveConfig::default());
/// let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
/// let table = engine.forward_table(reference, end).unwrap();
/// assert_eq!(table.len(), 2);
/// ```
pub struct CurveEngine<'a> {
    market: &'a dyn MarketDataProvider,
    rates: &'a dyn PolicyRateProvider,
    holidays: &'a dyn HolidaySource,
    config: CurveConfig,
}

impl<'a> CurveEngine<'a> {
    pub fn new(
        market: &'a dyn MarketDataProvider,
        rates: &'a dyn PolicyRateProvider,
        holidays: &'a dyn HolidaySource,
        config: CurveConfig,
    ) -> Self {
        Self {
            market,
            rates,
            holidays,
            config,
        }
    }

    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Calendar covering every year from `start` through `end`.
    pub fn calendar(&self, start: NaiveDate, end: NaiveDate) -> CurveResult<Calendar> {
        if end < start {
            return Err(CurveError::InvalidDateRange { start, end });
        }
        Calendar::from_source(self.holidays, start.year()..=end.year())
    }

    pub fn forward_table(
        &self,
        reference_date: NaiveDate,
        end_date: NaiveDate,
    ) -> CurveResult<ForwardCurveTable> {
        let calendar = self.calendar(reference_date, end_date)?;
        self.forward_table_with(reference_date, end_date, &calendar)
    }

    fn forward_table_with(
        &self,
        reference_date: NaiveDate,
        end_date: NaiveDate,
        calendar: &Calendar,
    ) -> CurveResult<ForwardCurveTable> {
        let quotes = self
            .market
            .settlement_prices(reference_date, &self.config.instrument_family)?;
        log::debug!(
            "{} {} quotes on {}",
            quotes.len(),
            self.config.instrument_family,
            reference_date
        );
        CurveBootstrap::forward_table(reference_date, end_date, &quotes, calendar)
    }

    /// Exposures of the curve under a parallel `shock`.
    pub fn exposure_table(
        &self,
        reference_date: NaiveDate,
        end_date: NaiveDate,
        shock: f64,
    ) -> CurveResult<ExposureTable> {
        let table = self.forward_table(reference_date, end_date)?;
        ExposureEngine::exposure_table(&table, shock)
    }

    /// Annualised overnight policy rate fixed on `date`.
    pub fn short_rate(&self, date: NaiveDate) -> CurveResult<f64> {
        let series = &self.config.policy_rate_series;
        let fixings = self.rates.daily_rates(series, date, date)?;
        let daily = fixings
            .get(&date)
            .copied()
            .ok_or_else(|| CurveError::MissingPolicyRate {
                series: series.clone(),
                date,
            })?;
        Ok(annualize_overnight(daily))
    }

    /// Daily curve over `[reference_date, end_date]` using the configured
    /// mode and interpolation.
    pub fn daily_curve(
        &self,
        reference_date: NaiveDate,
        end_date: NaiveDate,
    ) -> CurveResult<DailyCurve> {
        let calendar = self.calendar(reference_date, end_date)?;
        let table = self.forward_table_with(reference_date, end_date, &calendar)?;
        let short_rate = self.short_rate(reference_date)?;
        DailyCurve::project(
            &table,
            short_rate,
            self.config.mode,
            self.config.interpolation,
            &calendar,
        )
    }

    /// Projected rate on a single future business day.
    pub fn yield_on_date(&self, reference_date: NaiveDate, date: NaiveDate) -> CurveResult<f64> {
        if date < reference_date {
            return Err(CurveError::NotABusinessDay { date });
        }
        let end_date = Duration::try_days(self.config.yield_day_horizon_days.max(1))
            .and_then(|horizon| date.checked_add_signed(horizon))
            .ok_or(CurveError::InvalidDateRange {
                start: reference_date,
                end: date,
            })?;
        self.daily_curve(reference_date, end_date)?
            .yield_on_date(date)
    }

    /// Duration exposure of one listed contract, e.g. `DI1-F24`.
    pub fn duration_exposure(&self, reference_date: NaiveDate, instrument: &str) -> CurveResult<f64> {
        let id: InstrumentId = instrument.parse()?;
        let quotes = self.market.settlement_prices(reference_date, &id.family)?;
        let quote = quotes
            .iter()
            .find(|q| Ticker::parse(&q.ticker).ok() == Some(id.ticker))
            .ok_or_else(|| ProviderError::NotFound {
                what: format!("{id} settlement price for {reference_date}"),
            })?;

        let last_year = id.ticker.year().max(reference_date.year());
        let calendar = Calendar::from_source(self.holidays, reference_date.year()..=last_year)?;
        ExposureEngine::contract_duration(reference_date, quote, &calendar)
    }
}
