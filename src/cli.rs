//! CLI definition and dispatch.

use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use crate::adapters::chip_store::CsvChipStore;
use crate::adapters::csv_store::CsvBarStore;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::BarscanError;
use crate::domain::indicator::compute_indicators;
use crate::domain::scan::{scan_universe, ScanWindows};
use crate::domain::signal::{align_series, evaluate_signals, AuxInputs, REGISTRY};
use crate::domain::universe::{parse_codes, Instrument};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{AuxStore, BarStore};

#[derive(Parser, Debug)]
#[command(name = "barscan", about = "Technical-analysis rule screener for daily bars")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the instrument universe for rule matches
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated code list overriding the warehouse universe
        #[arg(long)]
        codes: Option<String>,
        /// Override [scan] start_date
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Override [scan] end_date
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Re-run the engine for one instrument and show which rules fired
    /// per bar
    Inspect {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        /// Number of most recent scan-window bars to print
        #[arg(long, default_value_t = 30)]
        days: usize,
    },
    /// List the instruments in the warehouse
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            config,
            codes,
            start,
            end,
        } => run_scan(&config, codes.as_deref(), start, end),
        Command::Inspect { config, code, days } => run_inspect(&config, &code, days),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = BarscanError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Rules enabled in the `[rules]` section, in registry order. Keys are
/// the rule names lowercased (`fighting = true`, `20vma = yes`, ...).
pub fn selected_rules(config: &dyn ConfigPort) -> Vec<String> {
    REGISTRY
        .iter()
        .filter(|rule| config.get_bool("rules", &rule.name.to_lowercase(), false))
        .map(|rule| rule.name.to_string())
        .collect()
}

struct ScanSetup {
    store: CsvBarStore,
    chip: Option<CsvChipStore>,
    windows: ScanWindows,
    selected: Vec<String>,
    benchmark: Option<BTreeMap<NaiveDate, f64>>,
}

fn build_setup(
    config: &FileConfigAdapter,
    start_override: Option<NaiveDate>,
    end_override: Option<NaiveDate>,
) -> Result<ScanSetup, BarscanError> {
    let warehouse = config
        .get_string("data", "warehouse")
        .ok_or_else(|| BarscanError::ConfigMissing {
            section: "data".into(),
            key: "warehouse".into(),
        })?;
    let store = CsvBarStore::new(PathBuf::from(warehouse));

    let chip = config
        .get_string("data", "chip_cache")
        .map(|dir| CsvChipStore::new(PathBuf::from(dir)));

    let scan_start = start_override
        .or_else(|| config.get_date("scan", "start_date"))
        .ok_or_else(|| BarscanError::ConfigMissing {
            section: "scan".into(),
            key: "start_date".into(),
        })?;
    let scan_end = end_override
        .or_else(|| config.get_date("scan", "end_date"))
        .ok_or_else(|| BarscanError::ConfigMissing {
            section: "scan".into(),
            key: "end_date".into(),
        })?;
    if scan_end < scan_start {
        return Err(BarscanError::ConfigInvalid {
            section: "scan".into(),
            key: "end_date".into(),
            reason: "end_date is before start_date".into(),
        });
    }

    // the load window reaches back far enough to warm up the 250-bar
    // indicators before the scan window opens
    let warmup_days = config.get_int("scan", "warmup_days", 400).max(0) as u64;
    let windows = ScanWindows {
        load_start: scan_start
            .checked_sub_days(Days::new(warmup_days))
            .unwrap_or(scan_start),
        load_end: scan_end,
        scan_start,
        scan_end,
    };

    let selected = selected_rules(config);
    if selected.is_empty() {
        return Err(BarscanError::NoRulesSelected);
    }

    let benchmark = match config.get_string("scan", "benchmark") {
        Some(code) => {
            let bars = store.load(&code, windows.load_start, windows.load_end)?;
            if bars.is_empty() {
                eprintln!("Warning: benchmark {code} has no data, RS disabled");
                None
            } else {
                Some(bars.into_iter().map(|b| (b.date, b.close)).collect())
            }
        }
        None => None,
    };

    Ok(ScanSetup {
        store,
        chip,
        windows,
        selected,
        benchmark,
    })
}

fn resolve_universe(
    store: &CsvBarStore,
    codes_override: Option<&str>,
) -> Result<Vec<Instrument>, BarscanError> {
    match codes_override {
        Some(input) => parse_codes(input).map_err(|e| BarscanError::InstrumentList {
            reason: e.to_string(),
        }),
        None => store.load_instruments(),
    }
}

fn run_scan(
    config_path: &PathBuf,
    codes_override: Option<&str>,
    start_override: Option<NaiveDate>,
    end_override: Option<NaiveDate>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let setup = match build_setup(&config, start_override, end_override) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let instruments = match resolve_universe(&setup.store, codes_override) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Scanning {} instruments, {} rules, window {} to {}",
        instruments.len(),
        setup.selected.len(),
        setup.windows.scan_start,
        setup.windows.scan_end
    );

    let cancel = AtomicBool::new(false);
    let summary = scan_universe(
        &setup.store,
        setup.chip.as_ref().map(|c| c as &(dyn AuxStore + Sync)),
        setup.benchmark.as_ref(),
        &instruments,
        &setup.windows,
        &setup.selected,
        &cancel,
    );

    let mut matches = summary.matches;
    matches.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.code.cmp(&b.code)));

    println!("{:<10} {:<16} {:<12} {:>10}  RULES", "CODE", "NAME", "DATE", "CLOSE");
    for m in &matches {
        println!(
            "{:<10} {:<16} {:<12} {:>10.2}  {}",
            m.code,
            m.name,
            m.date,
            m.close,
            m.triggered.join(", ")
        );
    }
    eprintln!(
        "{} matched / {} scanned ({} failed)",
        matches.len(),
        summary.scanned,
        summary.failed
    );

    ExitCode::SUCCESS
}

fn run_inspect(config_path: &PathBuf, code: &str, days: usize) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(exit) => return exit,
    };

    let setup = match build_setup(&config, None, None) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bars = match setup
        .store
        .load(code, setup.windows.load_start, setup.windows.load_end)
    {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if bars.is_empty() {
        eprintln!("no data for {code}");
        return ExitCode::SUCCESS;
    }

    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    let series = compute_indicators(&bars);

    let winner_pct = setup.chip.as_ref().and_then(|chip| {
        chip.load_winner_pct(code)
            .ok()
            .filter(|feed| !feed.is_empty())
            .map(|feed| align_series(&dates, &feed))
    });
    let benchmark_close = setup
        .benchmark
        .as_ref()
        .map(|feed| align_series(&dates, feed));
    let matrix = evaluate_signals(
        &series,
        &AuxInputs {
            winner_pct,
            benchmark_close,
        },
    );

    let in_window: Vec<usize> = (0..bars.len())
        .filter(|&i| dates[i] >= setup.windows.scan_start && dates[i] <= setup.windows.scan_end)
        .collect();

    println!("{:<12} {:>10}  FIRED", "DATE", "CLOSE");
    for &i in in_window.iter().rev().take(days).rev() {
        let fired: Vec<&str> = setup
            .selected
            .iter()
            .filter(|name| matrix.column(name).is_some_and(|col| col[i]))
            .map(|name| name.as_str())
            .collect();
        println!(
            "{:<12} {:>10.2}  {}",
            dates[i],
            bars[i].close,
            if fired.is_empty() {
                "-".to_string()
            } else {
                fired.join(", ")
            }
        );
    }

    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let warehouse = match config.get_string("data", "warehouse") {
        Some(dir) => dir,
        None => {
            let err = BarscanError::ConfigMissing {
                section: "data".into(),
                key: "warehouse".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };

    let store = CsvBarStore::new(PathBuf::from(warehouse));
    match store.load_instruments() {
        Ok(instruments) => {
            for i in &instruments {
                println!("{:<10} {}", i.code, i.name);
            }
            eprintln!("{} instruments", instruments.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
