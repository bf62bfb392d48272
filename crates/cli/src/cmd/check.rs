//! Preflight checks: external tools and database connectivity

use crate::config::Config;
use anyhow::Result;
use owo_colors::OwoColorize;
use pipeline::{DatabaseSpec, Dumper, ToolDumper};
use tokio::process::Command;

pub async fn run(config: &Config) -> Result<()> {
    let databases = config.database_specs();

    let mut tools = vec!["rclone", "zip"];
    if databases
        .iter()
        .any(|db| matches!(db, DatabaseSpec::Postgres(_)))
    {
        tools.extend(["pg_dump", "psql"]);
    }

    let mut failures = 0usize;

    for tool in tools {
        if tool_exists(tool).await {
            println!("  {} {}", "ok".green(), tool);
        } else {
            failures += 1;
            println!(
                "  {} {} (please install and configure it)",
                "missing".red(),
                tool
            );
        }
    }

    let dumper = ToolDumper;
    for db in &databases {
        match dumper.check(db).await {
            Ok(()) => println!("  {} {}", "ok".green(), db),
            Err(err) => {
                failures += 1;
                println!("  {} {}: {:#}", "FAIL".red(), db, err);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} preflight check(s) failed");
    }
    println!("{}", "All checks passed.".green().bold());
    Ok(())
}

async fn tool_exists(tool: &str) -> bool {
    Command::new("which")
        .arg(tool)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
