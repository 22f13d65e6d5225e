use crate::providers::ProviderError;
use chrono::NaiveDate;
use thiserror::Error;

/// Result alias used throughout the curve engine.
pub type CurveResult<T> = Result<T, CurveError>;

/// Errors raised while building curves and computing exposures.
///
/// Malformed tickers and non-positive inputs are caller bugs and are never
/// retried. Collaborator failures are surfaced unchanged so the caller can
/// apply its own retry policy.
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("invalid ticker format: '{ticker}'")]
    InvalidTickerFormat { ticker: String },

    #[error("domain error: {reason}")]
    DomainError { reason: String },

    #[error("no contracts expire between {reference_date} and {end_date}")]
    EmptyCurve {
        reference_date: NaiveDate,
        end_date: NaiveDate,
    },

    #[error("unsupported interpolation method: '{name}'")]
    UnsupportedInterpolation { name: String },

    #[error("{date} is not a business day of the curve")]
    NotABusinessDay { date: NaiveDate },

    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(#[from] ProviderError),

    #[error("{date} is outside the calendar coverage {first_year}..={last_year}")]
    CalendarOutOfRange {
        date: NaiveDate,
        first_year: i32,
        last_year: i32,
    },

    #[error("invalid date range: {start} must precede {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("no policy rate for series '{series}' on {date}")]
    MissingPolicyRate { series: String, date: NaiveDate },
}

impl CurveError {
    pub(crate) fn domain(reason: impl Into<String>) -> Self {
        CurveError::DomainError {
            reason: reason.into(),
        }
    }
}
