//! SignalScope CLI: evaluate CD/MC signals over a ticker universe.
//!
//! Commands:
//! - `evaluate`: run detection, forward-return statistics, resonance and
//!   breadth, optionally as of a backtest end date
//! - `check-config`: parse and validate a run config file
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only records.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use signalscope_core::domain::Side;
use signalscope_runner::config::{DataSource, RunConfig};
use signalscope_runner::provider::{
    CsvDirectoryProvider, MarketDataProvider, ResamplingProvider, RetryingProvider,
    SyntheticProvider,
};
use signalscope_runner::report::{evaluations_csv, RecordSets};
use signalscope_runner::runner::Runner;
use signalscope_runner::selection::SelectionConfig;
use signalscope_runner::universe::Universe;

#[derive(Parser)]
#[command(
    name = "signalscope",
    about = "SignalScope CLI: CD/MC signal evaluation and backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Every record set as pretty JSON.
    Json,
    /// Evaluation rows as CSV.
    Csv,
    /// Human-readable overview.
    Summary,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a universe.
    Evaluate {
        /// Universe file: plain ticker list or sector TOML.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Comma-separated tickers (alternative to --universe).
        #[arg(long, value_delimiter = ',')]
        tickers: Vec<String>,

        /// Run config TOML ([engine] and [run] sections).
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV data root laid out as <root>/<TICKER>/<interval>.csv.
        #[arg(long, conflicts_with = "synthetic")]
        data_dir: Option<PathBuf>,

        /// Use deterministic synthetic bars.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Backtest end date (YYYY-MM-DD, inclusive). Omit for live evaluation.
        #[arg(long)]
        end_date: Option<String>,

        /// Sides to evaluate, e.g. CD,MC.
        #[arg(long, value_delimiter = ',')]
        sides: Vec<String>,

        /// Disable rayon fan-out.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Thread cap for the rayon pool.
        #[arg(long)]
        threads: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,
    },
    /// Parse and validate a run config file.
    CheckConfig {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            universe,
            tickers,
            config,
            data_dir,
            synthetic,
            end_date,
            sides,
            sequential,
            threads,
            format,
        } => {
            let mut run_config = match config {
                Some(path) => RunConfig::from_file(&path)?,
                None => RunConfig::default(),
            };
            apply_overrides(
                &mut run_config,
                data_dir,
                synthetic,
                end_date.as_deref(),
                &sides,
                sequential,
                threads,
            )?;
            let tickers = resolve_tickers(universe, tickers)?;
            run_evaluate(run_config, &tickers, format)
        }
        Commands::CheckConfig { path } => {
            let config = RunConfig::from_file(&path)?;
            println!("{}: ok (run id {})", path.display(), config.run_id()?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(
    config: &mut RunConfig,
    data_dir: Option<PathBuf>,
    synthetic: bool,
    end_date: Option<&str>,
    sides: &[String],
    sequential: bool,
    threads: Option<usize>,
) -> Result<()> {
    if let Some(root) = data_dir {
        config.run.source = DataSource::Csv { root };
    } else if synthetic && !matches!(config.run.source, DataSource::Synthetic { .. }) {
        config.run.source = DataSource::default();
    }
    if let Some(raw) = end_date {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --end-date '{raw}' (expected YYYY-MM-DD)"))?;
        config.run.end_date = Some(date);
    }
    if !sides.is_empty() {
        config.run.sides = sides
            .iter()
            .map(|s| s.parse::<Side>())
            .collect::<Result<Vec<_>, _>>()?;
    }
    if sequential {
        config.run.parallel = false;
    }
    if threads.is_some() {
        config.run.threads = threads;
    }
    config.validate()?;
    Ok(())
}

fn resolve_tickers(universe: Option<PathBuf>, tickers: Vec<String>) -> Result<Vec<String>> {
    let mut all: Vec<String> = tickers
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if let Some(path) = universe {
        all.extend(Universe::from_file(&path)?.all_tickers());
    }
    if all.is_empty() {
        bail!("no tickers: pass --tickers or --universe");
    }
    all.sort();
    all.dedup();
    Ok(all)
}

fn build_provider(config: &RunConfig) -> Box<dyn MarketDataProvider> {
    match &config.run.source {
        DataSource::Csv { root } => Box::new(ResamplingProvider::new(RetryingProvider::with_policy(
            CsvDirectoryProvider::new(root.clone()),
            config.run.retry_attempts,
            Duration::from_millis(config.run.retry_base_ms),
        ))),
        DataSource::Synthetic { start, sessions } => Box::new(ResamplingProvider::new(
            SyntheticProvider::new(*start, *sessions),
        )),
    }
}

fn run_evaluate(config: RunConfig, tickers: &[String], format: OutputFormat) -> Result<()> {
    let horizon = config.engine.horizon;
    let provider = build_provider(&config);
    info!(provider = provider.name(), tickers = tickers.len(), "starting evaluation");

    let runner = Runner::new(provider, config)?;
    let output = runner.run(tickers, None)?;
    let records = RecordSets::build(&output, horizon, &SelectionConfig::default());

    match format {
        OutputFormat::Json => println!("{}", records.to_json()?),
        OutputFormat::Csv => print!("{}", evaluations_csv(&records.evaluations, horizon)?),
        OutputFormat::Summary => print_summary(&records),
    }
    Ok(())
}

fn print_summary(records: &RecordSets) {
    println!();
    println!("=== Evaluation ===");
    match records.end_date {
        Some(end) => println!("As of:          {end} (backtest)"),
        None => println!("As of:          latest bar"),
    }
    println!("Evaluations:    {}", records.evaluations.len());
    println!("Signals:        {}", records.signal_details.len());
    println!("Breakouts:      {}", records.breakouts.len());
    println!("Skipped:        {}", records.skipped.len());
    println!("Run id:         {}", records.fingerprint.config_hash);
    println!("Data hash:      {}", records.fingerprint.data_hash);

    if !records.breakouts.is_empty() {
        println!();
        println!("--- Resonance ---");
        for b in &records.breakouts {
            println!(
                "{:<8} {:<5} {:<3} {}  [{}]  matched {}  {:.2}",
                b.ticker,
                b.variant,
                b.side.label(),
                b.date,
                b.intervals,
                b.matched,
                b.signal_price
            );
        }
    }

    for table in &records.best_intervals {
        if table.rows.is_empty() {
            continue;
        }
        println!();
        println!("--- Best intervals {} ({}) ---", table.side, table.range.label());
        for row in &table.rows {
            println!(
                "{:<8} {:<4} hold {:<10} avg {:>7.2}%  success {:>5.1}%  n={}  period {}/{}",
                row.ticker,
                row.interval.label(),
                row.hold_time,
                row.avg_return,
                row.success_rate,
                row.test_count,
                row.current_period.unwrap_or(0),
                row.best_period,
            );
        }
    }

    for table in &records.breadth {
        if let Some(last) = table.rows.last() {
            println!();
            println!(
                "Breadth {} {}: {} tickers on {} ({} days)",
                table.variant,
                table.side,
                last.count,
                last.date,
                table.rows.len()
            );
        }
    }

    for skipped in &records.skipped {
        let interval = skipped.interval.map(|i| i.to_string()).unwrap_or_default();
        println!(
            "SKIPPED: {} {} {}: {}",
            skipped.ticker, interval, skipped.reason, skipped.message
        );
    }
    if records.synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
}
