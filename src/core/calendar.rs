use crate::core::error::{CurveError, CurveResult};
use crate::core::ticker::Ticker;
use crate::providers::HolidaySource;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Business-day calendar for one jurisdiction over a fixed range of years.
///
/// Saturdays, Sundays and the listed holidays are non-business days. The
/// calendar refuses to answer for dates outside its year coverage instead of
/// guessing, so a request must build a calendar wide enough for every date it
/// touches.
///
/// Business-day spans use a half-open convention: `business_days_between(a, b)`
/// counts business days `d` with `a <= d < b`. Spans are therefore additive,
/// `BD(a, c) = BD(a, b) + BD(b, c)`.
///
/// # Examples
///
/// ```
/// use futures_curve::core::calendar::Calendar;
/// use chrono::NaiveDate;
///
/// let cal = Calendar::weekends_only(2024..=2024).unwrap();
/// let mon = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
/// let next_mon = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// assert_eq!(cal.business_days_between(mon, next_mon).unwrap(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    name: String,
    first_year: i32,
    last_year: i32,
    holidays: BTreeSet<NaiveDate>,
}

impl Calendar {
    /// Build a calendar covering `years`. Holidays outside the range are dropped.
    pub fn new(
        name: impl Into<String>,
        years: RangeInclusive<i32>,
        holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> CurveResult<Self> {
        let (first_year, last_year) = (*years.start(), *years.end());
        if first_year > last_year {
            return Err(CurveError::domain(format!(
                "calendar year range {first_year}..={last_year} is empty"
            )));
        }
        let holidays = holidays
            .into_iter()
            .filter(|d| years.contains(&d.year()))
            .collect();
        Ok(Self {
            name: name.into(),
            first_year,
            last_year,
            holidays,
        })
    }

    /// A calendar with weekends only and no holidays.
    pub fn weekends_only(years: RangeInclusive<i32>) -> CurveResult<Self> {
        Self::new("Weekends", years, std::iter::empty())
    }

    /// Build a calendar from a holiday source for the given years.
    pub fn from_source(
        source: &dyn HolidaySource,
        years: RangeInclusive<i32>,
    ) -> CurveResult<Self> {
        let holidays = source.holidays(years.clone())?;
        log::debug!(
            "built {} calendar for {}..={} with {} holidays",
            source.name(),
            years.start(),
            years.end(),
            holidays.len()
        );
        Self::new(source.name(), years, holidays)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    pub fn last_year(&self) -> i32 {
        self.last_year
    }

    pub fn holidays(&self) -> &BTreeSet<NaiveDate> {
        &self.holidays
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        (self.first_year..=self.last_year).contains(&date.year())
    }

    pub fn ensure_covers(&self, date: NaiveDate) -> CurveResult<()> {
        if self.covers(date) {
            Ok(())
        } else {
            Err(CurveError::CalendarOutOfRange {
                date,
                first_year: self.first_year,
                last_year: self.last_year,
            })
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(date)
    }

    /// First business day on or after `date`.
    pub fn next_business_day(&self, date: NaiveDate) -> CurveResult<NaiveDate> {
        self.ensure_covers(date)?;
        for day in date.iter_days() {
            self.ensure_covers(day)?;
            if self.is_business_day(day) {
                return Ok(day);
            }
        }
        // iter_days only ends at NaiveDate::MAX, which no calendar covers.
        Err(CurveError::CalendarOutOfRange {
            date,
            first_year: self.first_year,
            last_year: self.last_year,
        })
    }

    /// Expiry of a contract: the first business day of its delivery month.
    pub fn expiry_of(&self, ticker: &Ticker) -> CurveResult<NaiveDate> {
        let first_of_month = NaiveDate::from_ymd_opt(ticker.year(), ticker.month(), 1)
            .ok_or_else(|| CurveError::InvalidTickerFormat {
                ticker: ticker.to_string(),
            })?;
        self.next_business_day(first_of_month)
    }

    /// Business days `d` with `start <= d < end`.
    ///
    /// Fails with `InvalidDateRange` when `end < start`.
    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> CurveResult<i64> {
        if end < start {
            return Err(CurveError::InvalidDateRange { start, end });
        }
        self.ensure_covers(start)?;
        self.ensure_covers(end)?;
        Ok(start
            .iter_days()
            .take_while(|d| *d < end)
            .filter(|d| self.is_business_day(*d))
            .count() as i64)
    }

    /// Every business day in `[start, end]`, ascending.
    pub fn business_days(&self, start: NaiveDate, end: NaiveDate) -> CurveResult<Vec<NaiveDate>> {
        if end < start {
            return Err(CurveError::InvalidDateRange { start, end });
        }
        self.ensure_covers(start)?;
        self.ensure_covers(end)?;
        Ok(start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_business_day(*d))
            .collect())
    }

    /// Number of business days in `[start, end]`, both endpoints included.
    pub fn business_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> CurveResult<usize> {
        Ok(self.business_days(start, end)?.len())
    }
}
