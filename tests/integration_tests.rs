use approx::assert_relative_eq;
use chrono::NaiveDate;
use futures_curve::core::calendar::Calendar;
use futures_curve::core::error::CurveError;
use futures_curve::curve::interpolation::InterpolationMethod;
use futures_curve::curve::projection::{CurveMode, PointSource};
use futures_curve::engine::{CurveConfig, CurveEngine};
use futures_curve::providers::{BrazilianHolidays, HolidayList, MarketSnapshot, ProviderError};
use futures_curve::simulation::synthetic::{generate_snapshot, StripConfig};

const SNAPSHOT: &str = r#"{
  "quotes": {
    "2023-09-01": {
      "DI1": [
        { "ticker": "F26", "price": "80000" },
        { "ticker": "V23", "price": "99130" },
        { "ticker": "F24", "price": "97130" },
        { "ticker": "J24", "price": "94600" },
        { "ticker": "N24", "price": "92150" },
        { "ticker": "F25", "price": "88900" }
      ]
    }
  },
  "policy_rates": {
    "12": { "2023-09-01": 0.049037 }
  }
}"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn reference() -> NaiveDate {
    date(2023, 9, 1)
}

fn snapshot() -> MarketSnapshot {
    MarketSnapshot::from_json(SNAPSHOT).unwrap()
}

/// Full pipeline: snapshot → calendar → bootstrap → exposures.
#[test]
fn full_pipeline_di1_strip() {
    let snapshot = snapshot();
    let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, CurveConfig::default());

    let table = engine.forward_table(reference(), date(2026, 6, 30)).unwrap();
    assert_eq!(table.len(), 6);

    // Quotes arrive unordered; vertices are ranked by expiry.
    let tickers: Vec<String> = table.vertices().iter().map(|v| v.ticker.to_string()).collect();
    assert_eq!(tickers, ["V23", "F24", "J24", "N24", "F25", "F26"]);

    let bd: Vec<i64> = table.vertices().iter().map(|v| v.business_days).collect();
    assert_eq!(bd, [20, 81, 142, 205, 334, 586]);

    let spans: Vec<i64> = table
        .vertices()
        .iter()
        .map(|v| v.forward_business_days)
        .collect();
    assert_eq!(spans, [20, 61, 61, 63, 129, 252]);
    assert_eq!(spans.iter().sum::<i64>(), 586);

    let first = table.vertex(1).unwrap();
    assert_eq!(first.forward_rate, first.spot_yield);
    assert_relative_eq!(first.spot_yield, 0.11638929177182455, max_relative = 1e-10);

    let expected_forwards = [
        0.11638929177182455,
        0.08784683052147635,
        0.11519870270034982,
        0.11066525848829434,
        0.07265947778533088,
        0.11125,
    ];
    for (v, expected) in table.vertices().iter().zip(expected_forwards) {
        assert_relative_eq!(v.forward_rate, expected, max_relative = 1e-9);
    }

    // Exposures under a zero shock
    let exposures = engine
        .exposure_table(reference(), date(2026, 6, 30), 0.0)
        .unwrap();
    assert_eq!(exposures.rows().len(), 6);
    for row in exposures.rows() {
        assert!(row.spot_exposure.abs() < 1e-6);
    }
    assert_relative_eq!(
        exposures.rows()[1].spot_duration,
        -285.162789252666,
        max_relative = 1e-10
    );

    let matrix = exposures.forward_matrix();
    assert_eq!(matrix.dimension(), 6);
    assert!(matrix.entry(2, 3).is_none());
    assert!(matrix.entry(6, 6).is_some());
    assert_eq!(matrix.row(4).unwrap().len(), 4);
}

#[test]
fn shocked_exposures_lose_value() {
    let snapshot = snapshot();
    let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, CurveConfig::default());

    let exposures = engine
        .exposure_table(reference(), date(2026, 6, 30), engine.config().shock)
        .unwrap();
    assert_eq!(exposures.shock(), 0.01);
    assert!(exposures.rows().iter().all(|r| r.spot_exposure < 0.0));
    assert!(exposures.total_spot_exposure() < 0.0);

    // Longer contracts carry more rate sensitivity.
    for pair in exposures.rows().windows(2) {
        assert!(pair[1].spot_duration < pair[0].spot_duration);
    }
}

#[test]
fn daily_curve_over_holiday_calendar() {
    let snapshot = snapshot();
    let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, CurveConfig::default());
    let end = date(2024, 12, 31);
    let curve = engine.daily_curve(reference(), end).unwrap();

    let calendar = Calendar::from_source(&BrazilianHolidays, 2023..=2024).unwrap();
    assert_eq!(
        curve.len(),
        calendar.business_days_in_range(reference(), end).unwrap()
    );

    let first = &curve.points()[0];
    assert_eq!(first.date, reference());
    assert_eq!(first.source, PointSource::Anchor);
    assert_relative_eq!(first.rate, 1.00049037f64.powi(252) - 1.0, max_relative = 1e-12);

    for (idx, point) in curve.points().iter().enumerate() {
        assert_eq!(point.business_days, idx as i64);
        assert!(calendar.is_business_day(point.date));
    }

    let v23 = curve.point(date(2023, 10, 2)).unwrap();
    assert_eq!(v23.source, PointSource::Anchor);
    assert_eq!(v23.business_days, 20);

    // Independence Day and a Saturday are off the grid.
    assert!(curve.point(date(2023, 9, 7)).is_none());
    assert!(curve.point(date(2023, 9, 9)).is_none());

    // F25 expires after the window; the N24 forward is carried to the end.
    let last = curve.points().last().unwrap();
    assert_eq!(last.source, PointSource::CarriedForward);
    assert_relative_eq!(last.rate, 0.11066525848829434, max_relative = 1e-9);
}

#[test]
fn every_convention_keeps_anchor_rates() {
    let snapshot = snapshot();
    let end = date(2024, 12, 31);

    for mode in [CurveMode::Spot, CurveMode::Forward] {
        let baseline = {
            let config = CurveConfig {
                mode,
                ..Default::default()
            };
            let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, config);
            engine.daily_curve(reference(), end).unwrap()
        };

        for method in InterpolationMethod::ALL {
            let config = CurveConfig {
                mode,
                interpolation: method,
                ..Default::default()
            };
            let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, config);
            let curve = engine.daily_curve(reference(), end).unwrap();

            assert_eq!(curve.method(), method);
            assert_eq!(curve.len(), baseline.len());
            for (p, b) in curve.points().iter().zip(baseline.points()) {
                assert!(p.rate.is_finite() && p.rate > 0.0, "{mode} {method} {}", p.date);
                if p.source != PointSource::Interpolated {
                    assert_eq!(p.rate, b.rate);
                }
            }
        }
    }
}

#[test]
fn spot_mode_anchors_on_spot_yields() {
    let snapshot = snapshot();
    let config = CurveConfig {
        mode: CurveMode::Spot,
        ..Default::default()
    };
    let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, config);
    let curve = engine.daily_curve(reference(), date(2024, 12, 31)).unwrap();

    let j24 = curve.point(date(2024, 4, 1)).unwrap();
    assert_eq!(j24.source, PointSource::Anchor);
    assert_relative_eq!(j24.rate, 0.10353152378462949, max_relative = 1e-9);
}

#[test]
fn single_date_lookup() {
    let snapshot = snapshot();
    let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, CurveConfig::default());

    let rate = engine.yield_on_date(reference(), date(2024, 1, 2)).unwrap();
    assert_relative_eq!(rate, 0.08784683052147635, max_relative = 1e-9);

    // Christmas
    assert!(matches!(
        engine.yield_on_date(reference(), date(2023, 12, 25)),
        Err(CurveError::NotABusinessDay { .. })
    ));
}

#[test]
fn contract_duration_exposure() {
    let snapshot = snapshot();
    let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, CurveConfig::default());

    let exposure = engine.duration_exposure(reference(), "DI1-J24").unwrap();
    assert_relative_eq!(exposure, -58825.23676707812, max_relative = 1e-10);
}

#[test]
fn custom_holiday_list_moves_expiries() {
    let holidays =
        HolidayList::from_json(r#"{ "name": "Custom", "holidays": ["2023-10-02"] }"#).unwrap();
    let snapshot = snapshot();
    let engine = CurveEngine::new(&snapshot, &snapshot, &holidays, CurveConfig::default());

    let table = engine.forward_table(reference(), date(2024, 6, 28)).unwrap();
    let v23 = table.vertex(1).unwrap();
    assert_eq!(v23.expiry, date(2023, 10, 3));
    assert_eq!(v23.business_days, 21);
}

#[test]
fn synthetic_snapshot_bootstraps() {
    let config = StripConfig::default();
    let calendar = Calendar::weekends_only(2023..=2026).unwrap();
    let generated = generate_snapshot(reference(), &config, &calendar).unwrap();

    let json = generated.to_json().unwrap();
    let snapshot = MarketSnapshot::from_json(&json).unwrap();

    let weekends = HolidayList::new("Weekends", Vec::new());
    let engine = CurveEngine::new(&snapshot, &snapshot, &weekends, CurveConfig::default());
    let table = engine.forward_table(reference(), date(2026, 12, 31)).unwrap();
    assert_eq!(table.len(), config.contracts);

    let curve = engine.daily_curve(reference(), date(2026, 12, 31)).unwrap();
    assert_relative_eq!(curve.points()[0].rate, config.base_rate, max_relative = 1e-10);
}

#[test]
fn request_failures() {
    let snapshot = snapshot();
    let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, CurveConfig::default());

    assert!(matches!(
        engine.forward_table(reference(), date(2023, 9, 29)),
        Err(CurveError::EmptyCurve { .. })
    ));
    assert!(matches!(
        engine.forward_table(reference(), date(2023, 8, 1)),
        Err(CurveError::InvalidDateRange { .. })
    ));
    assert!(matches!(
        engine.duration_exposure(reference(), "DI1-B24"),
        Err(CurveError::InvalidTickerFormat { .. })
    ));

    let other_series = CurveConfig {
        policy_rate_series: "4389".to_string(),
        ..Default::default()
    };
    let engine = CurveEngine::new(&snapshot, &snapshot, &BrazilianHolidays, other_series);
    assert!(matches!(
        engine.daily_curve(reference(), date(2024, 12, 31)),
        Err(CurveError::CollaboratorUnavailable(ProviderError::NotFound { .. }))
    ));

    let malformed = MarketSnapshot::from_json(
        r#"{ "quotes": { "2023-09-01": { "DI1": [ { "ticker": "F2X", "price": "97000" } ] } } }"#,
    )
    .unwrap();
    let engine = CurveEngine::new(&malformed, &malformed, &BrazilianHolidays, CurveConfig::default());
    assert!(matches!(
        engine.forward_table(reference(), date(2024, 12, 31)),
        Err(CurveError::InvalidTickerFormat { .. })
    ));
}

#[test]
fn config_rejects_unknown_interpolation() {
    assert!(matches!(
        CurveConfig::from_json(r#"{ "interpolation": "CubicSpline" }"#),
        Err(CurveError::UnsupportedInterpolation { .. })
    ));

    let config = CurveConfig::from_json(r#"{ "interpolation": "linear", "mode": "Spot" }"#).unwrap();
    assert_eq!(config.interpolation, InterpolationMethod::Linear);
    assert_eq!(config.mode, CurveMode::Spot);
}
