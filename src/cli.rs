//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceSource;
use crate::adapters::csv_artifact_adapter::CsvArtifactStore;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::artifact::ArtifactHandle;
use crate::domain::config_validation::{
    artifact_path, check_risk_free_rate, configured_strategies, data_settings, log_level,
    risk_free_rate, validate_config,
};
use crate::domain::dataset::Dataset;
use crate::domain::error::StratbenchError;
use crate::domain::metrics::Metrics;
use crate::domain::precompute::{default_strategy_set, precompute};
use crate::domain::strategy::factory;
use crate::logging;
use crate::ports::artifact_port::ArtifactSink;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceSource;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stratbench", about = "Strategy signals and equal-weighted return curves")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the configured strategy set and write the wide artifact
    Precompute {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a single strategy and write every derived column
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recompute a portfolio curve from a precomputed artifact
    Portfolio {
        #[arg(short, long)]
        artifact: PathBuf,
        /// Strategy suffix as it appears in the artifact, e.g. mavg_50_200
        #[arg(short, long)]
        strategy: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = 0.0)]
        risk_free_rate: f64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List available strategies
    Strategies,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let level = cli.log_level;
    let result = match cli.command {
        Command::Precompute { config, output } => run_precompute(&config, output, level),
        Command::Run {
            config,
            strategy,
            output,
        } => run_single(&config, &strategy, output, level),
        Command::Portfolio {
            artifact,
            strategy,
            start,
            end,
            risk_free_rate,
            output,
        } => {
            logging::init(level.as_deref().unwrap_or("info"));
            run_portfolio(&artifact, &strategy, start, end, risk_free_rate, output)
        }
        Command::Strategies => {
            run_strategies();
            Ok(())
        }
        Command::Validate { config } => run_validate(&config, level),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StratbenchError> {
    FileConfigAdapter::from_file(path).map_err(|e| StratbenchError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Loads the config and installs the subscriber at the configured level.
fn load_config_and_logging(
    path: &Path,
    level_override: Option<String>,
) -> Result<FileConfigAdapter, StratbenchError> {
    let config = load_config(path)?;
    let level = match level_override {
        Some(level) => level,
        None => log_level(&config)?,
    };
    logging::init(&level);
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Ingests the instruments named in `[data]`, or every file in the data
/// directory when none are listed.
pub fn load_dataset(config: &dyn ConfigPort) -> Result<Dataset, StratbenchError> {
    let settings = data_settings(config)?;
    let source = CsvPriceSource::new(settings.dir.clone());
    let instruments = match settings.instruments {
        Some(list) => list,
        None => source.list_instruments()?,
    };
    if instruments.is_empty() {
        return Err(StratbenchError::Data {
            reason: format!("no instruments found in {}", settings.dir.display()),
        });
    }

    let dataset = source.load(&instruments, settings.start_date, settings.end_date)?;
    tracing::info!(
        instruments = dataset.partition_count(),
        dates = dataset.timeline().len(),
        rows = dataset.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

fn run_precompute(
    config_path: &Path,
    output: Option<PathBuf>,
    level: Option<String>,
) -> Result<(), StratbenchError> {
    let config = load_config_and_logging(config_path, level)?;
    validate_config(&config)?;

    let strategies = configured_strategies(&config)?;
    let dataset = load_dataset(&config)?;
    let output = output.unwrap_or_else(|| artifact_path(&config));
    let rf = risk_free_rate(&config)?;

    let result = precompute(&dataset, &strategies)?;
    CsvArtifactStore::new(output.clone()).write(&result.table)?;

    eprintln!("\n=== Precomputed Strategies ===");
    for (suffix, frame) in &result.frames {
        let metrics = Metrics::compute(&frame.portfolio, rf);
        eprintln!(
            "  {:<24} total {:>8.2}%  sharpe {:>6.2}  max dd -{:.1}%",
            suffix,
            metrics.total_return * 100.0,
            metrics.sharpe_ratio,
            metrics.max_drawdown * 100.0,
        );
    }
    if let Some((first, last)) = result.table.date_range() {
        eprintln!("\nCovers {} to {}", first, last);
    }
    eprintln!("Artifact written to: {}", output.display());
    Ok(())
}

fn run_single(
    config_path: &Path,
    name: &str,
    output: Option<PathBuf>,
    level: Option<String>,
) -> Result<(), StratbenchError> {
    let config = load_config_and_logging(config_path, level)?;
    let strategy = factory::create(name, &config)?;
    let rf = risk_free_rate(&config)?;
    let dataset = load_dataset(&config)?;

    eprintln!("Running {} ({})", strategy.display_name(), strategy.suffix());
    let frame = strategy.run(&dataset);
    let metrics = Metrics::compute(&frame.portfolio, rf);
    print_metrics(&metrics);

    for (instrument, cumulative) in frame.final_cumulative() {
        eprintln!("  {}:  {:+.2}%", instrument, (cumulative - 1.0) * 100.0);
    }

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.csv", strategy.suffix())));
    CsvReportAdapter.write_frame(&frame, &output)?;
    eprintln!("\nResults written to: {}", output.display());
    Ok(())
}

fn run_portfolio(
    artifact: &Path,
    suffix: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    risk_free_rate: f64,
    output: Option<PathBuf>,
) -> Result<(), StratbenchError> {
    let risk_free_rate = check_risk_free_rate(risk_free_rate)?;
    let handle = ArtifactHandle::open(Box::new(CsvArtifactStore::new(artifact.to_path_buf())))?;
    let curve = handle.portfolio_curve(suffix, start, end)?;

    let metrics = Metrics::compute(&curve, risk_free_rate);
    if let (Some(first), Some(last)) = (curve.first(), curve.last()) {
        eprintln!("{}: {} to {}", suffix, first.date, last.date);
    } else {
        eprintln!("{}: no observations in range", suffix);
    }
    print_metrics(&metrics);

    match output {
        Some(path) => {
            CsvReportAdapter.write_curve(&curve, &path)?;
            eprintln!("\nCurve written to: {}", path.display());
        }
        None => {
            println!("date,daily_return,cumulative_return");
            for point in &curve {
                let daily = point.daily_return.map(|r| r.to_string()).unwrap_or_default();
                println!("{},{},{}", point.date, daily, point.cumulative_return);
            }
        }
    }
    Ok(())
}

fn run_strategies() {
    for strategy in default_strategy_set() {
        println!(
            "{:<14} {:<26} {}",
            strategy.kind().key(),
            strategy.display_name(),
            strategy.description()
        );
    }
}

fn run_validate(config_path: &Path, level: Option<String>) -> Result<(), StratbenchError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config_and_logging(config_path, level)?;
    validate_config(&config)?;

    let settings = data_settings(&config)?;
    eprintln!("\nData:");
    eprintln!("  dir: {}", settings.dir.display());
    match &settings.instruments {
        Some(list) => eprintln!("  instruments: {}", list.join(", ")),
        None => eprintln!("  instruments: all files in dir"),
    }

    eprintln!("\nStrategies:");
    for strategy in configured_strategies(&config)? {
        eprintln!("  {} ({})", strategy.display_name(), strategy.suffix());
    }

    eprintln!("\nArtifact: {}", artifact_path(&config).display());
    eprintln!("\nConfiguration is valid");
    Ok(())
}

fn print_metrics(metrics: &Metrics) {
    eprintln!("\n=== Portfolio Summary ===");
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Drawdown Length:  {} days", metrics.max_drawdown_duration);
    eprintln!("Trading Days:     {}", metrics.trading_days);
}
