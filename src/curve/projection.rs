use crate::core::calendar::Calendar;
use crate::core::error::{CurveError, CurveResult};
use crate::curve::bootstrap::{CurveVertex, ForwardCurveTable};
use crate::curve::interpolation::InterpolationMethod;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which vertex rate anchors the daily curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveMode {
    /// Anchor on each vertex's spot yield.
    Spot,
    /// Anchor on each vertex's forward rate.
    #[default]
    Forward,
}

impl CurveMode {
    fn anchor_rate(&self, vertex: &CurveVertex) -> f64 {
        match self {
            CurveMode::Spot => vertex.spot_yield,
            CurveMode::Forward => vertex.forward_rate,
        }
    }
}

impl fmt::Display for CurveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveMode::Spot => f.write_str("spot"),
            CurveMode::Forward => f.write_str("forward"),
        }
    }
}

impl FromStr for CurveMode {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spot" => Ok(CurveMode::Spot),
            "forward" => Ok(CurveMode::Forward),
            _ => Err(CurveError::domain(format!(
                "curve mode must be 'spot' or 'forward', got '{s}'"
            ))),
        }
    }
}

/// How a projected rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointSource {
    /// A vertex rate or the reference-date short rate.
    Anchor,
    /// Interpolated between the surrounding anchors.
    Interpolated,
    /// After the last anchor; the last anchor rate carried forward.
    CarriedForward,
}

/// Projected rate for one business day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRate {
    pub date: NaiveDate,
    /// Business days from the reference date.
    pub business_days: i64,
    pub rate: f64,
    pub source: PointSource,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    position: i64,
    rate: f64,
}

/// Anchors ordered by position on the business-day grid.
struct Anchors(Vec<Anchor>);

impl Anchors {
    fn at_or_before(&self, position: i64) -> Option<Anchor> {
        let idx = self.0.partition_point(|a| a.position <= position);
        idx.checked_sub(1).map(|i| self.0[i])
    }

    fn after(&self, position: i64) -> Option<Anchor> {
        let idx = self.0.partition_point(|a| a.position <= position);
        self.0.get(idx).copied()
    }
}

/// A rate for every business day in `[reference_date, end_date]`.
///
/// # Examples
///
/// ```
/// use futures_curve::prelude::*;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let cal = Calendar::weekends_only(2023..=2024).unwrap();
/// let reference = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
/// let quotes = vec![
///     PriceQuote::new("F24", dec!(96_900)),
///     PriceQuote::new("J24", dec!(94_300)),
/// ];
/// let table = CurveBootstrap::forward_table(reference, end, &quotes, &cal).unwrap();
/// let curve = DailyCurve::project(&table, 0.1265, CurveMode::Forward,
///     InterpolationMethod::Linear, &cal).unwrap();
///
/// assert_eq!(curve.yield_on_date(reference).unwrap(), 0.1265);
/// assert!(curve.yield_on_date(NaiveDate::from_ymd_opt(2023, 9, 2).unwrap()).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCurve {
    reference_date: NaiveDate,
    end_date: NaiveDate,
    mode: CurveMode,
    method: InterpolationMethod,
    points: Vec<ProjectedRate>,
}

impl DailyCurve {
    /// Project a bootstrapped table onto the business-day grid.
    ///
    /// Vertex expiries anchor at their spot or forward rate according to
    /// `mode`; the reference date anchors at `short_rate` (annualised) and
    /// overrides any vertex there. Days between anchors are interpolated with
    /// `method`; days past the last anchor carry it forward.
    pub fn project(
        table: &ForwardCurveTable,
        short_rate: f64,
        mode: CurveMode,
        method: InterpolationMethod,
        calendar: &Calendar,
    ) -> CurveResult<Self> {
        let reference_date = table.reference_date();
        let end_date = table.end_date();

        if !calendar.is_business_day(reference_date) {
            return Err(CurveError::NotABusinessDay {
                date: reference_date,
            });
        }
        let grid = calendar.business_days(reference_date, end_date)?;

        let mut by_date: BTreeMap<NaiveDate, f64> = table
            .vertices()
            .iter()
            .map(|v| (v.expiry, mode.anchor_rate(v)))
            .collect();
        by_date.insert(reference_date, short_rate);

        let mut anchors = Vec::with_capacity(by_date.len());
        for (date, rate) in by_date {
            let position = grid
                .binary_search(&date)
                .map_err(|_| CurveError::NotABusinessDay { date })?;
            anchors.push(Anchor {
                position: position as i64,
                rate,
            });
        }
        let anchors = Anchors(anchors);

        let mut points = Vec::with_capacity(grid.len());
        for (idx, date) in grid.iter().enumerate() {
            let position = idx as i64;
            let prev = anchors
                .at_or_before(position)
                .ok_or_else(|| CurveError::domain(format!("no anchor precedes {date}")))?;

            let (rate, source) = if prev.position == position {
                (prev.rate, PointSource::Anchor)
            } else {
                match anchors.after(position) {
                    Some(next) => (
                        method.interpolate(
                            prev.rate,
                            next.rate,
                            prev.position,
                            next.position,
                            position,
                        )?,
                        PointSource::Interpolated,
                    ),
                    None => (prev.rate, PointSource::CarriedForward),
                }
            };

            points.push(ProjectedRate {
                date: *date,
                business_days: position,
                rate,
                source,
            });
        }

        log::info!(
            "projected {} curve over {} business days ({} anchors, {})",
            mode,
            points.len(),
            anchors.0.len(),
            method
        );

        Ok(Self {
            reference_date,
            end_date,
            mode,
            method,
            points,
        })
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn mode(&self) -> CurveMode {
        self.mode
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    pub fn points(&self) -> &[ProjectedRate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, date: NaiveDate) -> Option<&ProjectedRate> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| &self.points[idx])
    }

    /// Projected rate on `date`. Weekends, holidays and dates outside the
    /// curve window fail with `NotABusinessDay`.
    pub fn yield_on_date(&self, date: NaiveDate) -> CurveResult<f64> {
        self.point(date)
            .map(|p| p.rate)
            .ok_or(CurveError::NotABusinessDay { date })
    }
}

impl fmt::Display for DailyCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Daily {} Curve ({}) ===", self.mode, self.method)?;
        writeln!(f, "Reference Date: {}", self.reference_date)?;
        writeln!(f, "End Date:       {}", self.end_date)?;
        writeln!(f, "Business Days:  {}", self.points.len())?;
        writeln!(f)?;
        for p in &self.points {
            let marker = match p.source {
                PointSource::Anchor => "*",
                PointSource::Interpolated => "",
                PointSource::CarriedForward => ">",
            };
            writeln!(
                f,
                "{}  {:>5}  {:>9.4}% {}",
                p.date,
                p.business_days,
                p.rate * 100.0,
                marker
            )?;
        }
        Ok(())
    }
}
