//! Run one backup cycle

use crate::config::Config;
use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use pipeline::{Orchestrator, PruneOutcome, RunOptions, RunReport, ToolDumper, ZipArchiver};
use remote::RcloneRemote;
use std::sync::Arc;
use tracing::debug;

pub async fn run(config: &Config, options: RunOptions) -> Result<()> {
    let report = execute(config, options).await?;
    print_report(&report);
    println!("{}", "Done!".green().bold());
    Ok(())
}

/// Run the orchestrator without printing; shared with service mode.
pub async fn execute(config: &Config, options: RunOptions) -> Result<RunReport> {
    debug!(config = %config.describe(), "loaded config");
    let orchestrator = build_orchestrator(config, options);
    let report = orchestrator.run(Local::now().naive_local()).await?;
    Ok(report)
}

fn build_orchestrator(config: &Config, options: RunOptions) -> Orchestrator {
    Orchestrator::new(
        Arc::new(ToolDumper),
        Arc::new(ZipArchiver),
        Arc::new(RcloneRemote::new(config.remote.clone())),
        config.naming_scheme(),
        config.pruning,
    )
    .with_dirs(config.dirs.clone())
    .with_databases(config.database_specs())
    .with_options(options)
}

pub fn print_report(report: &RunReport) {
    if report.uploaded {
        println!("{} {}", "Uploaded".green().bold(), report.artifact);
    } else {
        println!(
            "{} created {} locally; re-run with --live to upload",
            "Rehearsal:".yellow(),
            report.artifact
        );
    }

    match &report.prune {
        PruneOutcome::Completed(prune) => {
            println!("Prune: {}", prune.summary());
            for (record, err) in &prune.failed {
                println!("  {} {}: {}", "failed".red(), record.raw_name, err);
            }
        }
        PruneOutcome::ListingFailed(err) => {
            // The backup itself succeeded; only this cycle's pruning
            // was lost.
            println!("{} pruning skipped: {}", "Warning:".yellow(), err);
        }
        PruneOutcome::Skipped => println!("{}", "Pruning skipped (not live).".dimmed()),
        PruneOutcome::Disabled => println!("{}", "Pruning disabled.".dimmed()),
    }
}
