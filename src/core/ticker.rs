use crate::core::error::{CurveError, CurveResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exchange month codes, January through December.
pub const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

/// Delivery month of a futures contract, decoded from a month-code ticker.
///
/// A ticker is one month-code letter followed by a two-digit year, e.g.
/// `F24` for January 2024. Years are interpreted in the 2000s.
///
/// # Examples
///
/// ```
/// use futures_curve::core::ticker::Ticker;
///
/// let ticker: Ticker = "N25".parse().unwrap();
/// assert_eq!(ticker.year(), 2025);
/// assert_eq!(ticker.month(), 7);
/// assert!("A24".parse::<Ticker>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker {
    // Field order gives chronological ordering.
    year: i32,
    month: u32,
}

impl Ticker {
    /// Parse a ticker such as `F24`.
    pub fn parse(code: &str) -> CurveResult<Self> {
        let invalid = || CurveError::InvalidTickerFormat {
            ticker: code.to_string(),
        };

        let mut chars = code.chars();
        let (Some(letter), Some(d1), Some(d2), None) =
            (chars.next(), chars.next(), chars.next(), chars.next())
        else {
            return Err(invalid());
        };

        let month = month_of_code(letter).ok_or_else(invalid)?;
        let (Some(tens), Some(units)) = (d1.to_digit(10), d2.to_digit(10)) else {
            return Err(invalid());
        };

        Ok(Self {
            year: 2000 + (tens * 10 + units) as i32,
            month,
        })
    }

    /// Build a ticker from a delivery year and month (1-12).
    pub fn from_year_month(year: i32, month: u32) -> CurveResult<Self> {
        if !(2000..=2099).contains(&year) || !(1..=12).contains(&month) {
            return Err(CurveError::InvalidTickerFormat {
                ticker: format!("{year}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The exchange month-code letter.
    pub fn month_code(&self) -> char {
        MONTH_CODES[(self.month - 1) as usize]
    }
}

fn month_of_code(letter: char) -> Option<u32> {
    MONTH_CODES
        .iter()
        .position(|&c| c == letter)
        .map(|idx| idx as u32 + 1)
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}{:02}", self.month_code(), self.year % 100))
    }
}

impl FromStr for Ticker {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ticker::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = CurveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticker::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.to_string()
    }
}

/// A listed contract identifier of the form `FAMILY-TICKER`, e.g. `DI1-F24`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentId {
    pub family: String,
    pub ticker: Ticker,
}

impl InstrumentId {
    pub fn new(family: impl Into<String>, ticker: Ticker) -> Self {
        Self {
            family: family.into(),
            ticker,
        }
    }
}

impl FromStr for InstrumentId {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CurveError::InvalidTickerFormat {
            ticker: s.to_string(),
        };
        let (family, code) = s.split_once('-').ok_or_else(invalid)?;
        if family.is_empty() || !family.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
        let ticker = Ticker::parse(code).map_err(|_| invalid())?;
        Ok(Self::new(family, ticker))
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.family, self.ticker)
    }
}
