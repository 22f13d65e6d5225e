//! futures-curve CLI
//!
//! Bootstrap forward curves and rate-shock exposures from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Forward curve table from a market snapshot
//! futures-curve table --snapshot market.json --reference 2023-09-01 --end 2025-12-31
//!
//! # Exposures under a 50 bp shock, as JSON
//! futures-curve exposure --snapshot market.json --reference 2023-09-01 \
//!     --end 2025-12-31 --shock 0.005 --format json
//!
//! # Daily curve and single-date lookup
//! futures-curve curve --snapshot market.json --reference 2023-09-01 --end 2024-12-31
//! futures-curve yield --snapshot market.json --reference 2023-09-01 --date 2024-04-15
//!
//! # Generate a synthetic snapshot for testing
//! futures-curve generate --reference 2023-09-01 --contracts 16 --output market.json
//! ```

use chrono::{Datelike, NaiveDate};
use futures_curve::core::calendar::Calendar;
use futures_curve::curve::interpolation::InterpolationMethod;
use futures_curve::curve::projection::CurveMode;
use futures_curve::engine::{CurveConfig, CurveEngine};
use futures_curve::providers::{BrazilianHolidays, HolidayList, HolidaySource, MarketSnapshot};
use futures_curve::simulation::synthetic::{generate_snapshot, StripConfig};
use std::fmt::Display;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"futures-curve — forward curve bootstrap and rate-shock exposures

USAGE:
    futures-curve <COMMAND> [OPTIONS]

COMMANDS:
    table       Bootstrap the forward curve table
    exposure    Spot and forward-decomposed exposures under a rate shock
    curve       Project the daily curve over the business-day grid
    yield       Projected rate on a single date
    duration    Duration exposure of one contract
    generate    Generate a synthetic market snapshot (for testing)
    help        Show this message

OPTIONS (table, exposure, curve, yield, duration):
    --snapshot <FILE>      Market snapshot JSON (required)
    --reference <DATE>     Reference date, YYYY-MM-DD (required)
    --end <DATE>           End of the curve window (table, exposure, curve)
    --date <DATE>          Target date (yield)
    --instrument <ID>      Instrument such as DI1-F24 (duration)
    --holidays <FILE>      Holiday list JSON (default: Brazilian exchange holidays)
    --config <FILE>        Engine configuration JSON
    --mode <MODE>          Spot or Forward (curve, yield)
    --method <NAME>        Interpolation convention (curve, yield)
    --shock <RATE>         Parallel shock as a decimal (exposure)
    --format <FORMAT>      Output format: text (default) or json

OPTIONS (generate):
    --reference <DATE>     Reference date (required)
    --contracts <N>        Number of contracts (default: 12)
    --step <N>             Months between contracts (default: 3)
    --base-rate <RATE>     Short-end annual rate (default: 0.1065)
    --output <FILE>        Write to file instead of stdout

EXAMPLES:
    futures-curve table --snapshot market.json --reference 2023-09-01 --end 2025-12-31
    futures-curve exposure --snapshot market.json --reference 2023-09-01 --end 2025-12-31 --shock 0.01
    futures-curve curve --snapshot market.json --reference 2023-09-01 --end 2024-12-31 --method FlatForward
    futures-curve duration --snapshot market.json --reference 2023-09-01 --instrument DI1-F25
    futures-curve generate --reference 2023-09-01 --output market.json"#
    );
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Options shared by the curve commands.
#[derive(Default)]
struct CurveArgs {
    snapshot: Option<String>,
    reference: Option<NaiveDate>,
    end: Option<NaiveDate>,
    date: Option<NaiveDate>,
    instrument: Option<String>,
    holidays: Option<String>,
    config: Option<String>,
    mode: Option<CurveMode>,
    method: Option<InterpolationMethod>,
    shock: Option<f64>,
    json: bool,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    args.get(i).map(String::as_str).unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, what);
        process::exit(1);
    })
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap_or_else(|e| fail(format!("invalid date '{}': {}", s, e)))
}

impl CurveArgs {
    fn parse(args: &[String]) -> Self {
        let mut parsed = Self::default();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--snapshot" => {
                    i += 1;
                    parsed.snapshot = Some(value(args, i, flag, "a file path").to_string());
                }
                "--reference" => {
                    i += 1;
                    parsed.reference = Some(parse_date(value(args, i, flag, "a date")));
                }
                "--end" => {
                    i += 1;
                    parsed.end = Some(parse_date(value(args, i, flag, "a date")));
                }
                "--date" => {
                    i += 1;
                    parsed.date = Some(parse_date(value(args, i, flag, "a date")));
                }
                "--instrument" => {
                    i += 1;
                    parsed.instrument = Some(value(args, i, flag, "an instrument id").to_string());
                }
                "--holidays" => {
                    i += 1;
                    parsed.holidays = Some(value(args, i, flag, "a file path").to_string());
                }
                "--config" => {
                    i += 1;
                    parsed.config = Some(value(args, i, flag, "a file path").to_string());
                }
                "--mode" => {
                    i += 1;
                    let mode = value(args, i, flag, "Spot or Forward");
                    parsed.mode = Some(mode.parse().unwrap_or_else(|e| fail(e)));
                }
                "--method" => {
                    i += 1;
                    let method = value(args, i, flag, "an interpolation name");
                    parsed.method = Some(method.parse().unwrap_or_else(|e| fail(e)));
                }
                "--shock" => {
                    i += 1;
                    let shock = value(args, i, flag, "a decimal rate");
                    parsed.shock = Some(
                        shock
                            .parse()
                            .unwrap_or_else(|_| fail(format!("invalid shock '{}'", shock))),
                    );
                }
                "--format" => {
                    i += 1;
                    parsed.json = match value(args, i, flag, "'text' or 'json'") {
                        "json" => true,
                        "text" => false,
                        other => fail(format!("unknown format '{}'", other)),
                    };
                }
                _ => {
                    eprintln!("Unknown option: {}", flag);
                    process::exit(1);
                }
            }
            i += 1;
        }
        parsed
    }

    fn reference(&self) -> NaiveDate {
        self.reference
            .unwrap_or_else(|| fail("--reference <DATE> is required"))
    }

    fn end(&self) -> NaiveDate {
        self.end.unwrap_or_else(|| fail("--end <DATE> is required"))
    }

    fn load_config(&self) -> CurveConfig {
        let mut config = match &self.config {
            Some(path) => CurveConfig::from_path(path)
                .unwrap_or_else(|e| fail(format!("reading config '{}': {}", path, e))),
            None => CurveConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(method) = self.method {
            config.interpolation = method;
        }
        if let Some(shock) = self.shock {
            config.shock = shock;
        }
        config
    }

    fn load_snapshot(&self) -> MarketSnapshot {
        let path = self
            .snapshot
            .as_deref()
            .unwrap_or_else(|| fail("--snapshot <FILE> is required"));
        MarketSnapshot::from_path(path).unwrap_or_else(|e| {
            eprintln!("Error reading snapshot '{}': {}", path, e);
            eprintln!("Expected format:");
            eprintln!(
                r#"{{
  "quotes": {{
    "2023-09-01": {{ "DI1": [ {{ "ticker": "F24", "price": "97130.00" }} ] }}
  }},
  "policy_rates": {{
    "12": {{ "2023-09-01": 0.049037 }}
  }}
}}"#
            );
            process::exit(1);
        })
    }

    fn load_holidays(&self) -> Box<dyn HolidaySource> {
        match &self.holidays {
            Some(path) => Box::new(
                HolidayList::from_path(path)
                    .unwrap_or_else(|e| fail(format!("reading holidays '{}': {}", path, e))),
            ),
            None => Box::new(BrazilianHolidays),
        }
    }
}

fn emit<T: serde::Serialize + Display>(value: &T, json: bool) {
    if json {
        let out = serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e));
        println!("{}", out);
    } else {
        println!("{}", value);
    }
}

/// Runs `f` against an engine built from the parsed options.
fn with_engine<R>(args: &CurveArgs, f: impl FnOnce(&CurveEngine<'_>) -> R) -> R {
    let snapshot = args.load_snapshot();
    let holidays = args.load_holidays();
    let engine = CurveEngine::new(&snapshot, &snapshot, holidays.as_ref(), args.load_config());
    f(&engine)
}

fn cmd_table(args: &[String]) {
    let args = CurveArgs::parse(args);
    let (reference, end) = (args.reference(), args.end());
    let table = with_engine(&args, |engine| engine.forward_table(reference, end))
        .unwrap_or_else(|e| fail(e));
    emit(&table, args.json);
}

fn cmd_exposure(args: &[String]) {
    let args = CurveArgs::parse(args);
    let (reference, end) = (args.reference(), args.end());
    let table = with_engine(&args, |engine| {
        engine.exposure_table(reference, end, engine.config().shock)
    })
    .unwrap_or_else(|e| fail(e));
    emit(&table, args.json);
}

fn cmd_curve(args: &[String]) {
    let args = CurveArgs::parse(args);
    let (reference, end) = (args.reference(), args.end());
    let curve = with_engine(&args, |engine| engine.daily_curve(reference, end))
        .unwrap_or_else(|e| fail(e));
    emit(&curve, args.json);
}

fn cmd_yield(args: &[String]) {
    let args = CurveArgs::parse(args);
    let reference = args.reference();
    let date = args
        .date
        .unwrap_or_else(|| fail("--date <DATE> is required"));
    let rate = with_engine(&args, |engine| engine.yield_on_date(reference, date))
        .unwrap_or_else(|e| fail(e));

    if args.json {
        println!("{}", serde_json::json!({ "date": date, "rate": rate }));
    } else {
        println!("{}  {:.6}%", date, rate * 100.0);
    }
}

fn cmd_duration(args: &[String]) {
    let args = CurveArgs::parse(args);
    let reference = args.reference();
    let instrument = args
        .instrument
        .clone()
        .unwrap_or_else(|| fail("--instrument <ID> is required"));
    let exposure = with_engine(&args, |engine| engine.duration_exposure(reference, &instrument))
        .unwrap_or_else(|e| fail(e));

    if args.json {
        println!(
            "{}",
            serde_json::json!({ "instrument": instrument, "duration_exposure": exposure })
        );
    } else {
        println!("{}  {:.4}", instrument, exposure);
    }
}

fn cmd_generate(args: &[String]) {
    let mut reference = None;
    let mut config = StripConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--reference" => {
                i += 1;
                reference = Some(parse_date(value(args, i, flag, "a date")));
            }
            "--contracts" => {
                i += 1;
                config.contracts = value(args, i, flag, "a number")
                    .parse()
                    .unwrap_or_else(|_| fail("--contracts requires a number"));
            }
            "--step" => {
                i += 1;
                config.month_step = value(args, i, flag, "a number")
                    .parse()
                    .unwrap_or_else(|_| fail("--step requires a number"));
            }
            "--base-rate" => {
                i += 1;
                config.base_rate = value(args, i, flag, "a decimal rate")
                    .parse()
                    .unwrap_or_else(|_| fail("--base-rate requires a decimal rate"));
            }
            "--output" => {
                i += 1;
                output_path = Some(value(args, i, flag, "a file path").to_string());
            }
            _ => {
                eprintln!("Unknown option: {}", flag);
                process::exit(1);
            }
        }
        i += 1;
    }

    let reference = reference.unwrap_or_else(|| fail("--reference <DATE> is required"));
    let last_year = config.last_year(reference).unwrap_or_else(|e| fail(e));
    let calendar = Calendar::from_source(&BrazilianHolidays, reference.year()..=last_year)
        .unwrap_or_else(|e| fail(e));
    let snapshot = generate_snapshot(reference, &config, &calendar).unwrap_or_else(|e| fail(e));
    let json = snapshot.to_json().unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} {} contracts for {} → {}",
            config.contracts, config.family, reference, path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "table" => cmd_table(rest),
        "exposure" => cmd_exposure(rest),
        "curve" => cmd_curve(rest),
        "yield" => cmd_yield(rest),
        "duration" => cmd_duration(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
