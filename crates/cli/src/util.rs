//! Shared helpers for CLI output

use chrono::{Duration, NaiveDateTime};

/// Format a duration as `2d 4h 30m` / `4h 30m` / `30m`.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    if days != 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours != 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Format a backup timestamp as a relative age ("3 days ago").
pub fn format_age(timestamp: NaiveDateTime, now: NaiveDateTime) -> String {
    let elapsed = now - timestamp;
    if elapsed < Duration::zero() {
        return "in the future".to_string();
    }

    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} minute{} ago", plural(minutes))
    } else if hours < 24 {
        format!("{hours} hour{} ago", plural(hours))
    } else if days < 365 {
        format!("{days} day{} ago", plural(days))
    } else {
        format!("{} year{} ago", days / 365, plural(days / 365))
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
