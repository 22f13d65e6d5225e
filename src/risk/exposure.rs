use crate::core::calendar::Calendar;
use crate::core::contract::{price_as_f64, Contract, PriceQuote};
use crate::core::daycount::{price_to_yield, year_fraction, FACE_VALUE};
use crate::core::error::{CurveError, CurveResult};
use crate::core::ticker::Ticker;
use crate::curve::bootstrap::{CurveVertex, ForwardCurveTable};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

fn shocked_factor(rate: f64, shock: f64) -> CurveResult<f64> {
    let factor = 1.0 + rate + shock;
    if factor > 0.0 {
        Ok(factor)
    } else {
        Err(CurveError::domain(format!(
            "shock {shock} takes rate {rate} to or below -100%"
        )))
    }
}

/// PV change of holding a contract to expiry under a parallel yield shock:
/// `FACE_VALUE / (1 + yield + shock)^(bd/252) - present_value`.
pub fn spot_exposure(vertex: &CurveVertex, shock: f64) -> CurveResult<f64> {
    let factor = shocked_factor(vertex.spot_yield, shock)?;
    Ok(FACE_VALUE / factor.powf(year_fraction(vertex.business_days)) - vertex.present_value_f64()?)
}

/// Analytic sensitivity of a contract to its own yield, scaled to one
/// percentage point: `-(bd/252) * present_value / (1 + yield + shock) / 100`.
///
/// Forward-matrix rows decompose this figure across forward segments.
pub fn spot_duration(vertex: &CurveVertex, shock: f64) -> CurveResult<f64> {
    let factor = shocked_factor(vertex.spot_yield, shock)?;
    Ok(-year_fraction(vertex.business_days) * (vertex.present_value_f64()? / factor / 100.0))
}

/// Duration exposure of a single contract from its own price and day count:
/// `-(bd/252) * price * (1 + yield)`.
pub fn duration_exposure(price: f64, business_days: i64) -> CurveResult<f64> {
    let rate = price_to_yield(price, business_days)?;
    Ok(-year_fraction(business_days) * price * (1.0 + rate))
}

/// Lower-triangular forward exposure matrix.
///
/// `entry(i, j)` is the sensitivity of contract `i`'s present value to a
/// shock on forward segment `j`, defined only for `i >= j`. Indices are the
/// vertices' 1-based sequence indices. Entries above the diagonal do not
/// exist and are reported as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardExposureMatrix {
    /// Row `i` (0-based) holds columns `0..=i`.
    rows: Vec<Vec<f64>>,
}

impl ForwardExposureMatrix {
    /// `Exposure[i][j] = -(fwd_bd[j]/252) * (pv[i] / (1 + fwd[j] + shock) / 100)`.
    pub fn compute(table: &ForwardCurveTable, shock: f64) -> CurveResult<Self> {
        let vertices = table.vertices();

        let mut segments = Vec::with_capacity(vertices.len());
        for v in vertices {
            let factor = shocked_factor(v.forward_rate, shock)?;
            segments.push(year_fraction(v.forward_business_days) / factor);
        }

        let mut rows = Vec::with_capacity(vertices.len());
        for (i, vi) in vertices.iter().enumerate() {
            let pv = vi.present_value_f64()? / 100.0;
            rows.push(segments[..=i].iter().map(|seg| -seg * pv).collect());
        }
        Ok(Self { rows })
    }

    /// Number of contracts (rows and columns).
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    pub fn entry(&self, row: usize, column: usize) -> Option<f64> {
        if column == 0 || column > row {
            return None;
        }
        self.row(row).and_then(|r| r.get(column - 1)).copied()
    }

    /// The defined entries of a row, columns `1..=row`.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        row.checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
            .map(Vec::as_slice)
    }

    /// Total forward-curve exposure of a contract.
    pub fn row_total(&self, row: usize) -> Option<f64> {
        self.row(row).map(|r| r.iter().sum())
    }

    /// Total exposure to one forward segment across all contracts.
    pub fn column_total(&self, column: usize) -> Option<f64> {
        if column == 0 || column > self.rows.len() {
            return None;
        }
        Some(self.rows[column - 1..].iter().map(|r| r[column - 1]).sum())
    }
}

/// Per-contract exposure figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureRow {
    pub sequence_index: usize,
    pub ticker: Ticker,
    pub expiry: NaiveDate,
    pub business_days: i64,
    pub forward_business_days: i64,
    pub spot_yield: f64,
    pub forward_rate: f64,
    pub present_value: Decimal,
    /// PV change under the parallel shock.
    pub spot_exposure: f64,
    /// Analytic spot sensitivity, see [`spot_duration`].
    pub spot_duration: f64,
    /// Row total of the forward exposure matrix.
    pub forward_exposure: f64,
}

/// Spot and forward exposures of every vertex under one shock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureTable {
    reference_date: NaiveDate,
    shock: f64,
    rows: Vec<ExposureRow>,
    forward: ForwardExposureMatrix,
}

impl ExposureTable {
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn shock(&self) -> f64 {
        self.shock
    }

    pub fn rows(&self) -> &[ExposureRow] {
        &self.rows
    }

    pub fn forward_matrix(&self) -> &ForwardExposureMatrix {
        &self.forward
    }

    /// Sum of the parallel-shock PV changes across the strip.
    pub fn total_spot_exposure(&self) -> f64 {
        self.rows.iter().map(|r| r.spot_exposure).sum()
    }
}

impl fmt::Display for ExposureTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Exposure Table ===")?;
        writeln!(f, "Reference Date: {}", self.reference_date)?;
        writeln!(f, "Shock:          {:+.4}%", self.shock * 100.0)?;
        writeln!(
            f,
            "\n{:>3}  {:<6} {:<10} {:>5} {:>14} {:>14} {:>14}",
            "#", "Ticker", "Expiry", "DU", "Spot PV Chg", "Spot Dur", "Fwd Total"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:>3}  {:<6} {:<10} {:>5} {:>14.2} {:>14.4} {:>14.4}",
                r.sequence_index,
                r.ticker,
                r.expiry,
                r.business_days,
                r.spot_exposure,
                r.spot_duration,
                r.forward_exposure
            )?;
        }
        writeln!(f, "\nTotal spot PV change: {:.2}", self.total_spot_exposure())?;

        writeln!(f, "\nForward exposure by segment:")?;
        for i in 1..=self.forward.dimension() {
            if let Some(row) = self.forward.row(i) {
                let cells: Vec<String> = row.iter().map(|v| format!("{v:10.4}")).collect();
                writeln!(f, "{:>3}  {}", i, cells.join(" "))?;
            }
        }
        Ok(())
    }
}

/// Rate-shock exposure computations over a bootstrapped curve.
pub struct ExposureEngine;

impl ExposureEngine {
    /// Spot exposure, spot duration and forward decomposition for every vertex.
    pub fn exposure_table(table: &ForwardCurveTable, shock: f64) -> CurveResult<ExposureTable> {
        let forward = ForwardExposureMatrix::compute(table, shock)?;

        let mut rows = Vec::with_capacity(table.len());
        for v in table.vertices() {
            rows.push(ExposureRow {
                sequence_index: v.sequence_index,
                ticker: v.ticker,
                expiry: v.expiry,
                business_days: v.business_days,
                forward_business_days: v.forward_business_days,
                spot_yield: v.spot_yield,
                forward_rate: v.forward_rate,
                present_value: v.present_value,
                spot_exposure: spot_exposure(v, shock)?,
                spot_duration: spot_duration(v, shock)?,
                forward_exposure: forward.row_total(v.sequence_index).ok_or_else(|| {
                    CurveError::domain(format!(
                        "no forward exposure row for vertex {}",
                        v.sequence_index
                    ))
                })?,
            });
        }

        log::debug!(
            "computed exposures for {} vertices under shock {}",
            rows.len(),
            shock
        );

        Ok(ExposureTable {
            reference_date: table.reference_date(),
            shock,
            rows,
            forward,
        })
    }

    /// Duration exposure of one quoted contract, independent of any curve.
    pub fn contract_duration(
        reference_date: NaiveDate,
        quote: &PriceQuote,
        calendar: &Calendar,
    ) -> CurveResult<f64> {
        let contract = Contract::resolve(quote, calendar)?;
        let business_days = calendar.business_days_between(reference_date, contract.expiry())?;
        duration_exposure(price_as_f64(contract.settlement_price())?, business_days)
    }
}
