//! GEFS driver data command line tool.
//!
//! Subsets the dynamical.org GEFS stores to challenge sites, lists the EFI
//! driver stages, and validates and submits forecast files.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use commands::{
    BboxArgs, CompareArgs, ForecastArgs, PullArgs, StageArgs, SubmitArgs, ValidateArgs,
};
use config::DriversConfig;

#[derive(Parser, Debug)]
#[command(name = "gefs")]
#[command(about = "GEFS driver data for the EFI forecast challenges")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "GEFS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overrides the configured level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the clustered bounding box of a site list as JSON
    Bbox(BboxArgs),
    /// Pull GEFS analysis values at sites
    Analysis(PullArgs),
    /// Pull GEFS ensemble forecasts at sites
    Forecast(ForecastArgs),
    /// Compare two sample files site by site
    Compare(CompareArgs),
    /// List files of an EFI driver stage
    Stage(StageArgs),
    /// Check a forecast file against the submission format
    Validate(ValidateArgs),
    /// Validate and upload a forecast file
    Submit(SubmitArgs),
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_tracing(level: Level, format: LogFormat) -> Result<()> {
    // stdout carries command output
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.json().finish())?;
        }
        LogFormat::Pretty => {
            tracing::subscriber::set_global_default(builder.pretty().finish())?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = DriversConfig::load(cli.config.as_deref())?;

    let level = parse_level(cli.log_level.as_deref().unwrap_or(&config.log_level));
    init_tracing(level, cli.log_format)?;
    debug!(config = ?config, "Loaded configuration");

    let ok = match &cli.command {
        Command::Bbox(args) => commands::bbox(args, &config).map(|_| true)?,
        Command::Analysis(args) => commands::analysis(args, &config).await.map(|_| true)?,
        Command::Forecast(args) => commands::forecast(args, &config).await.map(|_| true)?,
        Command::Compare(args) => commands::compare(args)?,
        Command::Stage(args) => commands::stage(args, &config).await.map(|_| true)?,
        Command::Validate(args) => commands::validate(args)?,
        Command::Submit(args) => commands::submit_forecast(args, &config).await?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
