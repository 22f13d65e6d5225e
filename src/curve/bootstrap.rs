use crate::core::calendar::Calendar;
use crate::core::contract::{price_as_f64, Contract, PriceQuote};
use crate::core::daycount::{forward_rate, price_to_yield};
use crate::core::error::{CurveError, CurveResult};
use crate::core::ticker::Ticker;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One bootstrapped point of the curve, at a contract's expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveVertex {
    /// Rank by expiry, starting at 1.
    pub sequence_index: usize,
    pub ticker: Ticker,
    pub expiry: NaiveDate,
    pub price: Decimal,
    /// Business days from the reference date to expiry.
    pub business_days: i64,
    /// Business days since the previous vertex (since the reference date for
    /// the first vertex).
    pub forward_business_days: i64,
    pub spot_yield: f64,
    /// Rate over the forward segment ending at this vertex.
    pub forward_rate: f64,
    /// Settlement price; no discounting is applied at bootstrap time.
    pub present_value: Decimal,
}

impl CurveVertex {
    /// One step of the forward fold.
    ///
    /// The first vertex (`prev == None`) is the spot vertex: its forward segment
    /// starts at the reference date and its forward rate is its spot yield.
    /// Later vertices forward from the immediately preceding vertex only.
    pub fn chain(
        prev: Option<&CurveVertex>,
        contract: &Contract,
        business_days: i64,
    ) -> CurveResult<Self> {
        let price = price_as_f64(contract.settlement_price())?;
        let spot_yield = price_to_yield(price, business_days)?;

        let (sequence_index, forward_business_days, forward) = match prev {
            None => (1, business_days, spot_yield),
            Some(prev) => {
                let forward_business_days = business_days - prev.business_days;
                let forward = forward_rate(
                    spot_yield,
                    prev.spot_yield,
                    business_days,
                    prev.business_days,
                    forward_business_days,
                )?;
                (prev.sequence_index + 1, forward_business_days, forward)
            }
        };

        Ok(Self {
            sequence_index,
            ticker: contract.ticker(),
            expiry: contract.expiry(),
            price: contract.settlement_price(),
            business_days,
            forward_business_days,
            spot_yield,
            forward_rate: forward,
            present_value: contract.settlement_price(),
        })
    }

    pub fn present_value_f64(&self) -> CurveResult<f64> {
        price_as_f64(self.present_value)
    }
}

/// The ordered vertices bootstrapped for one `(reference_date, end_date)` window.
///
/// Read-only once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardCurveTable {
    reference_date: NaiveDate,
    end_date: NaiveDate,
    vertices: Vec<CurveVertex>,
}

impl ForwardCurveTable {
    /// Assemble a table from vertices already chained with [`CurveVertex::chain`].
    ///
    /// Checks the ordering invariants: sequence indices run 1..=N, business
    /// days strictly increase and each forward span is the difference from the
    /// previous vertex.
    pub fn from_vertices(
        reference_date: NaiveDate,
        end_date: NaiveDate,
        vertices: Vec<CurveVertex>,
    ) -> CurveResult<Self> {
        let mut prev_days = 0;
        for (idx, v) in vertices.iter().enumerate() {
            if v.sequence_index != idx + 1 {
                return Err(CurveError::domain(format!(
                    "vertex {} found at position {}",
                    v.sequence_index,
                    idx + 1
                )));
            }
            if v.business_days <= prev_days || v.forward_business_days != v.business_days - prev_days
            {
                return Err(CurveError::domain(format!(
                    "vertex {} breaks the business-day ordering",
                    v.sequence_index
                )));
            }
            prev_days = v.business_days;
        }
        Ok(Self {
            reference_date,
            end_date,
            vertices,
        })
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn vertices(&self) -> &[CurveVertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex by 1-based sequence index.
    pub fn vertex(&self, sequence_index: usize) -> Option<&CurveVertex> {
        sequence_index
            .checked_sub(1)
            .and_then(|idx| self.vertices.get(idx))
    }

    /// Vertex expiring on `date`, if any.
    pub fn vertex_at(&self, date: NaiveDate) -> Option<&CurveVertex> {
        self.vertices
            .binary_search_by_key(&date, |v| v.expiry)
            .ok()
            .map(|idx| &self.vertices[idx])
    }
}

impl fmt::Display for ForwardCurveTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Forward Curve ===")?;
        writeln!(f, "Reference Date: {}", self.reference_date)?;
        writeln!(f, "End Date:       {}", self.end_date)?;
        writeln!(f, "Vertices:       {}", self.vertices.len())?;
        writeln!(
            f,
            "\n{:>3}  {:<6} {:<10} {:>12} {:>5} {:>5} {:>9} {:>9}",
            "#", "Ticker", "Expiry", "Price", "DU", "Fwd", "Spot %", "Fwd %"
        )?;
        for v in &self.vertices {
            writeln!(
                f,
                "{:>3}  {:<6} {:<10} {:>12} {:>5} {:>5} {:>9.4} {:>9.4}",
                v.sequence_index,
                v.ticker,
                v.expiry,
                v.price,
                v.business_days,
                v.forward_business_days,
                v.spot_yield * 100.0,
                v.forward_rate * 100.0
            )?;
        }
        Ok(())
    }
}

/// Sequential forward-rate bootstrap from futures settlement prices.
pub struct CurveBootstrap;

impl CurveBootstrap {
    /// Build the forward curve for contracts expiring strictly between
    /// `reference_date` and `end_date`.
    ///
    /// # Algorithm
    ///
    /// 1. Resolve each quote's expiry; drop expiries `<= reference_date` or
    ///    `>= end_date`. Fails with `EmptyCurve` if nothing remains.
    /// 2. Sort by expiry and count business days from the reference date.
    ///    A contract whose count does not strictly exceed its predecessor's
    ///    (zero for the first contract) is excluded.
    /// 3. Fold left to right: each vertex derives its forward rate from its own
    ///    spot yield and the previous vertex's.
    ///
    /// Any malformed ticker fails the whole request with `InvalidTickerFormat`.
    pub fn forward_table(
        reference_date: NaiveDate,
        end_date: NaiveDate,
        quotes: &[PriceQuote],
        calendar: &Calendar,
    ) -> CurveResult<ForwardCurveTable> {
        if end_date <= reference_date {
            return Err(CurveError::InvalidDateRange {
                start: reference_date,
                end: end_date,
            });
        }
        calendar.ensure_covers(reference_date)?;
        calendar.ensure_covers(end_date)?;

        let contracts = Self::live_contracts(reference_date, end_date, quotes, calendar)?;

        // Spot day counts are independent per contract; only the forward fold
        // below is order dependent.
        let mut dated = Vec::with_capacity(contracts.len());
        for contract in contracts {
            let business_days = calendar.business_days_between(reference_date, contract.expiry())?;
            dated.push((contract, business_days));
        }

        let mut vertices: Vec<CurveVertex> = Vec::with_capacity(dated.len());
        for (contract, business_days) in &dated {
            let prev = vertices.last();
            // The reference date itself sits at day 0.
            let floor = prev.map_or(0, |p| p.business_days);
            if *business_days <= floor {
                log::warn!(
                    "excluding {}: {} business days does not follow {} at {}",
                    contract.ticker(),
                    business_days,
                    prev.map_or_else(|| reference_date.to_string(), |p| p.ticker.to_string()),
                    floor
                );
                continue;
            }
            let vertex = CurveVertex::chain(prev, contract, *business_days)?;
            log::debug!(
                "vertex {} {} du={} spot={:.6} fwd={:.6}",
                vertex.sequence_index,
                vertex.ticker,
                vertex.business_days,
                vertex.spot_yield,
                vertex.forward_rate
            );
            vertices.push(vertex);
        }

        if vertices.is_empty() {
            return Err(CurveError::EmptyCurve {
                reference_date,
                end_date,
            });
        }

        log::info!(
            "bootstrapped {} vertices for {}..{}",
            vertices.len(),
            reference_date,
            end_date
        );

        Ok(ForwardCurveTable {
            reference_date,
            end_date,
            vertices,
        })
    }

    /// Contracts expiring in `(reference_date, end_date)`, ascending by expiry.
    fn live_contracts(
        reference_date: NaiveDate,
        end_date: NaiveDate,
        quotes: &[PriceQuote],
        calendar: &Calendar,
    ) -> CurveResult<Vec<Contract>> {
        let mut contracts = Vec::new();
        let mut nearest_expiry: Option<NaiveDate> = None;

        for quote in quotes {
            let ticker = Ticker::parse(&quote.ticker)?;
            let (month_start, next_month_start) = month_bounds(&ticker)?;

            // An expiry never leaves its delivery month, so whole months outside
            // the window are dropped without consulting the calendar.
            if next_month_start <= reference_date {
                continue;
            }
            if month_start >= end_date {
                nearest_expiry = Some(nearest_expiry.map_or(month_start, |d| d.min(month_start)));
                continue;
            }

            let contract = Contract::new(ticker, calendar.expiry_of(&ticker)?, quote.price)?;
            if contract.expiry() <= reference_date {
                continue;
            }
            nearest_expiry = Some(
                nearest_expiry.map_or(contract.expiry(), |d| d.min(contract.expiry())),
            );
            if contract.expiry() < end_date {
                contracts.push(contract);
            }
        }

        if contracts.is_empty() {
            if let Some(nearest) = nearest_expiry {
                log::warn!("nearest expiry {nearest} is not before end date {end_date}");
            }
            return Err(CurveError::EmptyCurve {
                reference_date,
                end_date,
            });
        }

        contracts.sort_by_key(|c| c.expiry());
        Ok(contracts)
    }
}

fn month_bounds(ticker: &Ticker) -> CurveResult<(NaiveDate, NaiveDate)> {
    let invalid = || CurveError::InvalidTickerFormat {
        ticker: ticker.to_string(),
    };
    let start = NaiveDate::from_ymd_opt(ticker.year(), ticker.month(), 1).ok_or_else(invalid)?;
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((start, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn strip() -> Vec<PriceQuote> {
        vec![
            // Deliberately out of order.
            PriceQuote::new("J24", dec!(94_300)),
            PriceQuote::new("V23", dec!(99_250)),
            PriceQuote::new("F25", dec!(87_300)),
            PriceQuote::new("F24", dec!(96_900)),
            PriceQuote::new("N24", dec!(91_800)),
            PriceQuote::new("F26", dec!(80_000)),
        ]
    }

    fn table() -> ForwardCurveTable {
        let cal = Calendar::weekends_only(2023..=2026).unwrap();
        CurveBootstrap::forward_table(date(2023, 9, 1), date(2025, 6, 30), &strip(), &cal).unwrap()
    }

    #[test]
    fn test_vertices_sorted_and_filtered() {
        let table = table();
        let tickers: Vec<String> = table.vertices().iter().map(|v| v.ticker.to_string()).collect();
        assert_eq!(tickers, ["V23", "F24", "J24", "N24", "F25"]);

        let indices: Vec<usize> = table.vertices().iter().map(|v| v.sequence_index).collect();
        assert_eq!(indices, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_business_day_counts() {
        let table = table();
        let bd: Vec<i64> = table.vertices().iter().map(|v| v.business_days).collect();
        assert_eq!(bd, [21, 86, 151, 216, 348]);
        let fwd: Vec<i64> = table
            .vertices()
            .iter()
            .map(|v| v.forward_business_days)
            .collect();
        assert_eq!(fwd, [21, 65, 65, 65, 132]);
    }

    #[test]
    fn test_spot_vertex_forward_equals_spot() {
        let table = table();
        let first = table.vertex(1).unwrap();
        assert_eq!(first.forward_rate, first.spot_yield);
        assert_relative_eq!(first.spot_yield, 0.0945454873, max_relative = 1e-8);
    }

    #[test]
    fn test_forward_rates() {
        let table = table();
        let expected = [
            0.0945454873, 0.0973524161, 0.1112059093, 0.1097875798, 0.1007088836,
        ];
        for (v, fwd) in table.vertices().iter().zip(expected) {
            assert_relative_eq!(v.forward_rate, fwd, max_relative = 1e-8);
        }
    }

    #[test]
    fn test_present_value_is_price() {
        for v in table().vertices() {
            assert_eq!(v.present_value, v.price);
        }
    }

    #[test]
    fn test_single_vertex_one_year() {
        let contract = Contract::new(Ticker::parse("F25").unwrap(), date(2025, 1, 2), dec!(92_000))
            .unwrap();
        let vertex = CurveVertex::chain(None, &contract, 252).unwrap();
        assert_relative_eq!(vertex.spot_yield, 100_000.0 / 92_000.0 - 1.0, epsilon = 1e-12);
        assert_eq!(vertex.forward_rate, vertex.spot_yield);
        assert_eq!(vertex.forward_business_days, 252);
    }

    #[test]
    fn test_chain_uses_previous_vertex() {
        let c1 = Contract::new(Ticker::parse("J24").unwrap(), date(2024, 4, 1), dec!(96_000))
            .unwrap();
        let c2 = Contract::new(Ticker::parse("F25").unwrap(), date(2025, 1, 2), dec!(92_000))
            .unwrap();
        let v1 = CurveVertex::chain(None, &c1, 126).unwrap();
        let v2 = CurveVertex::chain(Some(&v1), &c2, 252).unwrap();

        assert_eq!(v2.sequence_index, 2);
        assert_eq!(v2.forward_business_days, 126);
        assert!(v2.spot_yield > v1.spot_yield);
        assert!(v2.forward_rate > v2.spot_yield);
        // Spot carry to vertex 1 followed by the forward segment reproduces
        // the carry to vertex 2.
        let carry = (1.0 + v1.spot_yield).powf(0.5) * (1.0 + v2.forward_rate).powf(0.5);
        assert_relative_eq!(carry, 1.0 + v2.spot_yield, max_relative = 1e-12);
    }

    #[test]
    fn test_duplicate_expiry_excluded() {
        let cal = Calendar::weekends_only(2023..=2025).unwrap();
        let quotes = vec![
            PriceQuote::new("F24", dec!(96_900)),
            PriceQuote::new("F24", dec!(96_950)),
            PriceQuote::new("J24", dec!(94_300)),
        ];
        let table =
            CurveBootstrap::forward_table(date(2023, 9, 1), date(2025, 1, 31), &quotes, &cal)
                .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.vertex(2).unwrap().ticker.to_string(), "J24");
    }

    #[test]
    fn test_weekend_reference_drops_zero_day_contract() {
        let cal = Calendar::weekends_only(2023..=2025).unwrap();
        let quotes = vec![
            PriceQuote::new("V23", dec!(99_950)),
            PriceQuote::new("F24", dec!(97_130)),
        ];
        // Saturday; V23 expires on the following Monday, zero business days away.
        let table =
            CurveBootstrap::forward_table(date(2023, 9, 30), date(2024, 6, 28), &quotes, &cal)
                .unwrap();
        assert_eq!(table.len(), 1);
        let first = table.vertex(1).unwrap();
        assert_eq!(first.ticker.to_string(), "F24");
        assert_eq!(first.sequence_index, 1);
        assert_eq!(first.forward_business_days, first.business_days);
    }

    #[test]
    fn test_only_zero_day_contract_is_empty_curve() {
        let cal = Calendar::weekends_only(2023..=2025).unwrap();
        let quotes = vec![PriceQuote::new("V23", dec!(99_950))];
        let result =
            CurveBootstrap::forward_table(date(2023, 9, 30), date(2024, 6, 28), &quotes, &cal);
        assert!(matches!(result, Err(CurveError::EmptyCurve { .. })));
    }

    #[test]
    fn test_empty_curve_when_first_expiry_after_end() {
        let cal = Calendar::weekends_only(2023..=2026).unwrap();
        let result =
            CurveBootstrap::forward_table(date(2023, 9, 1), date(2023, 9, 29), &strip(), &cal);
        assert!(matches!(result, Err(CurveError::EmptyCurve { .. })));
    }

    #[test]
    fn test_expired_contracts_dropped() {
        let cal = Calendar::weekends_only(2023..=2026).unwrap();
        let table =
            CurveBootstrap::forward_table(date(2024, 1, 1), date(2025, 6, 30), &strip(), &cal)
                .unwrap();
        // F24 expires on the reference date itself.
        assert_eq!(table.vertex(1).unwrap().ticker.to_string(), "J24");
    }

    #[test]
    fn test_invalid_ticker_fails() {
        let cal = Calendar::weekends_only(2023..=2026).unwrap();
        let mut quotes = strip();
        quotes.push(PriceQuote::new("A24", dec!(95_000)));
        let result =
            CurveBootstrap::forward_table(date(2023, 9, 1), date(2025, 6, 30), &quotes, &cal);
        assert!(matches!(result, Err(CurveError::InvalidTickerFormat { .. })));
    }

    #[test]
    fn test_reversed_window_fails() {
        let cal = Calendar::weekends_only(2023..=2026).unwrap();
        let result =
            CurveBootstrap::forward_table(date(2024, 9, 1), date(2024, 9, 1), &strip(), &cal);
        assert!(matches!(result, Err(CurveError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_from_vertices_checks_order() {
        let c1 = Contract::new(Ticker::parse("J24").unwrap(), date(2024, 4, 1), dec!(96_000))
            .unwrap();
        let c2 = Contract::new(Ticker::parse("F25").unwrap(), date(2025, 1, 2), dec!(92_000))
            .unwrap();
        let v1 = CurveVertex::chain(None, &c1, 126).unwrap();
        let v2 = CurveVertex::chain(Some(&v1), &c2, 252).unwrap();

        let ok = ForwardCurveTable::from_vertices(
            date(2023, 9, 1),
            date(2025, 6, 30),
            vec![v1.clone(), v2.clone()],
        );
        assert_eq!(ok.unwrap().len(), 2);

        let swapped =
            ForwardCurveTable::from_vertices(date(2023, 9, 1), date(2025, 6, 30), vec![v2, v1]);
        assert!(matches!(swapped, Err(CurveError::DomainError { .. })));
    }

    #[test]
    fn test_vertex_at_expiry() {
        let table = table();
        let v = table.vertex_at(date(2024, 4, 1)).unwrap();
        assert_eq!(v.ticker.to_string(), "J24");
        assert!(table.vertex_at(date(2024, 4, 2)).is_none());
        assert!(table.vertex(0).is_none());
        assert!(table.vertex(6).is_none());
    }
}
