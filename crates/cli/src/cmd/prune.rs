//! Classify and delete old backups

use crate::config::Config;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use remote::RcloneRemote;
use retention::classify;

pub async fn run(config: &Config, dry_run: bool) -> Result<()> {
    let store = RcloneRemote::new(config.remote.clone());
    let set = remote::list_backups(&store, &config.naming_scheme())
        .await
        .context("could not list the remote")?;

    let result = classify(&set, &config.pruning);
    println!("{}", format!("Policy: {}", config.pruning).dimmed());
    println!(
        "{} of {} backup(s) kept, {} to delete",
        result.keep.len().to_string().green(),
        set.len(),
        result.delete.len().to_string().yellow()
    );
    for record in &result.delete {
        println!("  {} {}", "delete".yellow(), record.raw_name);
    }

    if dry_run {
        println!("{}", "Dry run - nothing was deleted.".dimmed());
        return Ok(());
    }
    if result.delete.is_empty() {
        println!("Nothing to prune.");
        return Ok(());
    }

    // Per-record failures are reported, never fatal
    let report = remote::prune(&store, result.delete).await;
    println!("Prune: {}", report.summary());
    for (record, err) in &report.failed {
        println!("  {} {}: {}", "failed".red(), record.raw_name, err);
    }

    Ok(())
}
