//! Packhorse CLI - packhorse command

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pipeline::RunOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

mod cmd;
mod config;
mod schedule;
mod util;

/// Packhorse - database and directory backups with GFS pruning
#[derive(Parser)]
#[command(name = "packhorse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "packhorse.toml", global = true)]
    config: PathBuf,

    /// Console log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backup cycle
    Run {
        /// Touch the remote (upload and prune); without this the run
        /// is a local rehearsal that only logs
        #[arg(long)]
        live: bool,
        /// Do not prune old backups
        #[arg(long)]
        no_prune: bool,
        /// Skip configured directories that do not exist
        #[arg(short = 'i', long)]
        ignore_missing: bool,
    },
    /// List backups currently on the remote
    List,
    /// Classify old backups per the retention policy and delete them
    Prune {
        /// Show what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Check external tools and database connectivity
    Check,
    /// Keep running on the configured service-mode schedule
    Serve {
        /// Touch the remote on each scheduled run
        #[arg(long)]
        live: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = Level::from_str(&cli.log_level)
        .map_err(|_| anyhow::anyhow!("invalid log level: '{}'", cli.log_level))?;
    let config = config::load(&cli.config)?;
    let _guard = init_logging(level, config.logs.as_ref().map(|logs| logs.dir.as_path()))?;

    match cli.command {
        Commands::Run {
            live,
            no_prune,
            ignore_missing,
        } => {
            let options = RunOptions {
                live,
                prune_enabled: !no_prune,
                ignore_missing_dirs: ignore_missing,
            };
            cmd::run::run(&config, options).await
        }
        Commands::List => cmd::list::run(&config).await,
        Commands::Prune { dry_run } => cmd::prune::run(&config, dry_run).await,
        Commands::Check => cmd::check::run(&config).await,
        Commands::Serve { live } => {
            let options = RunOptions {
                live,
                ..RunOptions::default()
            };
            cmd::serve::run(&config, options).await
        }
    }
}

/// Console logging at the requested level, plus a daily-rolling debug
/// log file when the config names a log directory.
fn init_logging(
    level: Level,
    log_dir: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

    let console = fmt::layer().with_filter(LevelFilter::from_level(level));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "packhorse.log"));
            let file = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(LevelFilter::DEBUG);
            tracing_subscriber::registry().with(console).with(file).init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(console).init();
            Ok(None)
        }
    }
}
