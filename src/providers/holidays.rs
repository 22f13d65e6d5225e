use super::{HolidaySource, ProviderError};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Brazilian national (exchange settlement) holidays, generated by rule.
///
/// Fixed-date holidays, the Easter-relative Carnival Monday and Tuesday, Good
/// Friday and Corpus Christi, and Black Consciousness Day from 2024 on.
///
/// # Examples
///
/// ```
/// use futures_curve::providers::{BrazilianHolidays, HolidaySource};
/// use chrono::NaiveDate;
///
/// let holidays = BrazilianHolidays.holidays(2024..=2024).unwrap();
/// assert!(holidays.contains(&NaiveDate::from_ymd_opt(2024, 2, 13).unwrap())); // Carnival
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BrazilianHolidays;

const FIXED: [(u32, u32); 8] = [
    (1, 1),   // Confraternização Universal
    (4, 21),  // Tiradentes
    (5, 1),   // Dia do Trabalho
    (9, 7),   // Independência
    (10, 12), // Nossa Senhora Aparecida
    (11, 2),  // Finados
    (11, 15), // Proclamação da República
    (12, 25), // Natal
];

/// Easter-relative holidays as day offsets from Easter Sunday.
const EASTER_OFFSETS: [i64; 4] = [-48, -47, -2, 60];

const FIRST_GREGORIAN_YEAR: i32 = 1583;

impl BrazilianHolidays {
    fn year(year: i32) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = FIXED
            .iter()
            .filter_map(|&(m, d)| NaiveDate::from_ymd_opt(year, m, d))
            .collect();

        if let Some(easter) = easter_sunday(year) {
            days.extend(EASTER_OFFSETS.iter().map(|&o| easter + Duration::days(o)));
        }

        if year >= 2024 {
            days.extend(NaiveDate::from_ymd_opt(year, 11, 20));
        }
        days
    }
}

impl HolidaySource for BrazilianHolidays {
    fn name(&self) -> &str {
        "Brazil"
    }

    fn holidays(&self, years: RangeInclusive<i32>) -> Result<BTreeSet<NaiveDate>, ProviderError> {
        if *years.start() < FIRST_GREGORIAN_YEAR {
            return Err(ProviderError::Unavailable {
                provider: self.name().to_string(),
                reason: format!("no holiday rules before {FIRST_GREGORIAN_YEAR}"),
            });
        }
        Ok(years.flat_map(Self::year).collect())
    }
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// An explicit list of holidays, typically loaded from a JSON file.
///
/// ```json
/// { "name": "B3", "holidays": ["2024-01-01", "2024-02-12"] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HolidayList {
    pub name: String,
    pub holidays: BTreeSet<NaiveDate>,
}

impl HolidayList {
    pub fn new(name: impl Into<String>, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            name: name.into(),
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl HolidaySource for HolidayList {
    fn name(&self) -> &str {
        &self.name
    }

    fn holidays(&self, years: RangeInclusive<i32>) -> Result<BTreeSet<NaiveDate>, ProviderError> {
        Ok(self
            .holidays
            .iter()
            .filter(|d| years.contains(&d.year()))
            .copied()
            .collect())
    }
}
