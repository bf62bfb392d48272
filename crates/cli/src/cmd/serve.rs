//! Service mode: run backups on the configured schedule

use crate::cmd::run as run_cmd;
use crate::config::Config;
use crate::schedule::Schedule;
use crate::util;
use anyhow::Result;
use chrono::{Duration, Local};
use pipeline::RunOptions;
use tracing::{error, info};

/// How often the loop re-checks the schedule.
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

pub async fn run(config: &Config, mut options: RunOptions) -> Result<()> {
    let service = config
        .service
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("the config has no [backup.service] section"))?;

    if !service.enabled {
        info!("service mode disabled; running once");
        return run_cmd::run(config, options).await;
    }

    let schedule = Schedule::from_config(service)?;
    // A daemon cannot prompt about missing directories; skip them.
    options.ignore_missing_dirs = true;
    info!(%schedule, "service mode enabled");

    // Far enough in the past that the first cycle runs immediately.
    let mut last_run = Local::now().naive_local() - Duration::weeks(52 * 20);
    loop {
        let now = Local::now().naive_local();
        if schedule.next_run_after(last_run, now) <= now {
            match run_cmd::execute(config, options).await {
                Ok(report) => run_cmd::print_report(&report),
                // One failed run never kills the service; it waits for
                // the next slot like a successful one.
                Err(err) => error!("backup run failed: {err:#}"),
            }
            last_run = Local::now().naive_local();
            let upcoming = schedule.next_run_after(last_run, last_run);
            info!(
                "next run in {}; going to sleep",
                util::format_duration(upcoming - last_run)
            );
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
