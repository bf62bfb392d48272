//! List backups currently on the remote

use crate::config::Config;
use crate::util;
use anyhow::{Context, Result};
use chrono::Local;
use owo_colors::OwoColorize;
use remote::RcloneRemote;

pub async fn run(config: &Config) -> Result<()> {
    let store = RcloneRemote::new(config.remote.clone());
    let set = remote::list_backups(&store, &config.naming_scheme())
        .await
        .context("could not list the remote")?;

    if set.is_empty() {
        println!("No backups found in '{}'.", config.remote);
        return Ok(());
    }

    let now = Local::now().naive_local();
    println!(
        "{}",
        format!("{} backup(s) in '{}'", set.len(), config.remote).bold()
    );
    for record in set.iter() {
        println!(
            "  {}  {}",
            record.raw_name,
            util::format_age(record.timestamp, now).dimmed()
        );
    }

    Ok(())
}
