//! # futures-curve
//!
//! Forward-rate curve bootstrap and rate-shock exposure engine for
//! interest-rate futures strips quoted as discounted prices of a fixed face
//! value under the ACT/252 business-day convention.
//!
//! Given settlement prices for a strip of contracts, the engine derives each
//! contract's implied spot yield, chains consecutive contracts into forward
//! rates, projects a daily curve over the business-day grid, and decomposes
//! the price sensitivity of every contract into per-segment forward
//! exposures.
//!
//! ## Architecture
//!
//! - **core**: Tickers, calendars, contracts, ACT/252 conversions, errors
//! - **curve**: Forward bootstrap, interpolation conventions, daily projection
//! - **risk**: Spot, duration and forward-decomposed exposures
//! - **providers**: Market data, policy-rate and holiday collaborators
//! - **engine**: Request-level facade and configuration
//! - **simulation**: Synthetic strips for testing and benchmarking

pub mod core;
pub mod curve;
pub mod engine;
pub mod providers;
pub mod risk;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::calendar::Calendar;
    pub use crate::core::contract::{Contract, PriceQuote};
    pub use crate::core::error::{CurveError, CurveResult};
    pub use crate::core::ticker::{InstrumentId, Ticker};
    pub use crate::curve::bootstrap::{CurveBootstrap, CurveVertex, ForwardCurveTable};
    pub use crate::curve::interpolation::InterpolationMethod;
    pub use crate::curve::projection::{CurveMode, DailyCurve, PointSource};
    pub use crate::engine::{CurveConfig, CurveEngine};
    pub use crate::providers::{
        BrazilianHolidays, HolidaySource, MarketDataProvider, MarketSnapshot, PolicyRateProvider,
    };
    pub use crate::risk::exposure::{ExposureEngine, ExposureTable, ForwardExposureMatrix};
}
