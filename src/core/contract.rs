use crate::core::calendar::Calendar;
use crate::core::error::{CurveError, CurveResult};
use crate::core::ticker::Ticker;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A settlement price published by the exchange for one ticker.
///
/// # Examples
///
/// ```
/// use futures_curve::core::contract::PriceQuote;
/// use rust_decimal_macros::dec;
///
/// let quote = PriceQuote::new("F24", dec!(97_512.34));
/// assert_eq!(quote.ticker, "F24");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Month-code ticker as published; decoded when the contract is resolved.
    pub ticker: String,
    pub price: Decimal,
}

impl PriceQuote {
    pub fn new(ticker: impl Into<String>, price: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            price,
        }
    }
}

/// A futures contract with its expiry resolved against a calendar.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    ticker: Ticker,
    expiry: NaiveDate,
    settlement_price: Decimal,
}

impl Contract {
    /// Resolve a quote into a contract. The settlement price must be positive.
    pub fn resolve(quote: &PriceQuote, calendar: &Calendar) -> CurveResult<Self> {
        let ticker = Ticker::parse(&quote.ticker)?;
        let expiry = calendar.expiry_of(&ticker)?;
        Self::new(ticker, expiry, quote.price)
    }

    pub fn new(ticker: Ticker, expiry: NaiveDate, settlement_price: Decimal) -> CurveResult<Self> {
        if settlement_price <= Decimal::ZERO {
            return Err(CurveError::domain(format!(
                "settlement price of {ticker} must be positive, got {settlement_price}"
            )));
        }
        Ok(Self {
            ticker,
            expiry,
            settlement_price,
        })
    }

    pub fn ticker(&self) -> Ticker {
        self.ticker
    }

    pub fn expiry(&self) -> NaiveDate {
        self.expiry
    }

    pub fn settlement_price(&self) -> Decimal {
        self.settlement_price
    }
}

/// Convert an exchange price to `f64` for rate arithmetic.
pub fn price_as_f64(price: Decimal) -> CurveResult<f64> {
    price
        .to_f64()
        .ok_or_else(|| CurveError::domain(format!("price {price} is not representable")))
}
