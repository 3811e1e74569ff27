mod commands;
mod render;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use bridgelift_core::Config;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bridgelift")]
#[command(about = "Keep a local record of Tower Bridge lifts in sync with the published schedule")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the schedule and reconcile it into the stored record
    Update {
        /// Show what would change without saving
        #[arg(long)]
        dry_run: bool,

        /// List every change instead of counts
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show the stored record and what an update would change
    Status {
        /// List every change instead of counts
        #[arg(short, long)]
        verbose: bool,
    },
    /// List stored lifts (upcoming by default)
    Lifts {
        /// Only this day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, conflicts_with_all = ["from", "to"])]
        day: Option<NaiveDate>,

        /// From this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Until this date, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
    /// Write stored lifts as an ICS calendar
    Export {
        /// From this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Until this date, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show config and data paths and the effective configuration
    Config,
    /// Show the announcements due for a day
    Announce {
        /// Day to announce (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_date)]
        day: Option<NaiveDate>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let (config_path, config) = match cli.config {
        Some(path) => {
            let config = Config::load_from(&path)?;
            (path, config)
        }
        None => (Config::config_path()?, Config::load()?),
    };

    match cli.command {
        Commands::Update { dry_run, verbose } => commands::update::run(&config, dry_run, verbose).await,
        Commands::Status { verbose } => commands::status::run(&config, verbose).await,
        Commands::Lifts { day, from, to } => commands::lifts::run(&config, day, from, to),
        Commands::Export { from, to, output } => commands::export::run(&config, from, to, output),
        Commands::Config => commands::config::run(&config_path, &config),
        Commands::Announce { day } => commands::announce::run(&config, day),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{s}'. Expected YYYY-MM-DD"))
}
