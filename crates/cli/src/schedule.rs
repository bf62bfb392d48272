//! Service-mode scheduling
//!
//! Computes when the next backup run is due from the last run time.
//! All arithmetic is on naive local datetimes so it can be tested with
//! fixed inputs; the serve loop feeds it the wall clock.

use crate::config::{ConfigError, ServiceConfig};
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use std::fmt;
use std::str::FromStr;

/// When to run backups in service mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Every N hours after the previous run
    Hourly { every: u32 },
    /// Every day at a fixed local time
    Daily { at: NaiveTime },
    /// Every week on a fixed weekday and local time
    Weekly { on: Weekday, at: NaiveTime },
}

impl Schedule {
    /// Validate the raw service config into a schedule.
    pub fn from_config(service: &ServiceConfig) -> Result<Self, ConfigError> {
        match service.frequency.to_lowercase().as_str() {
            "hourly" => {
                let every = service.num_hours.ok_or_else(|| {
                    ConfigError::Invalid("hourly service mode requires 'num_hours'".to_string())
                })?;
                if every == 0 {
                    return Err(ConfigError::Invalid(
                        "'num_hours' must be at least 1".to_string(),
                    ));
                }
                Ok(Schedule::Hourly { every })
            }
            "daily" => Ok(Schedule::Daily {
                at: parse_time_of_day(service)?,
            }),
            "weekly" => {
                let day = service.day_of_week.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("weekly service mode requires 'day_of_week'".to_string())
                })?;
                let on = Weekday::from_str(&day.to_lowercase()).map_err(|_| {
                    ConfigError::Invalid(format!("unknown day of week: '{day}'"))
                })?;
                Ok(Schedule::Weekly {
                    on,
                    at: parse_time_of_day(service)?,
                })
            }
            other => Err(ConfigError::Invalid(format!(
                "unsupported service mode frequency: '{other}'"
            ))),
        }
    }

    /// Next due time strictly derived from the last run.
    ///
    /// A result in the past means the run is overdue and should start
    /// now.
    pub fn next_run_after(&self, last_run: NaiveDateTime, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Schedule::Hourly { every } => last_run + Duration::hours(i64::from(*every)),
            Schedule::Daily { at } => {
                if last_run.date() < now.date() {
                    now.date().and_time(*at)
                } else {
                    // Already ran today
                    (now.date() + Duration::days(1)).and_time(*at)
                }
            }
            Schedule::Weekly { on, at } => {
                // First scheduled weekday strictly after the last run
                let mut date = last_run.date() + Duration::days(1);
                while date.weekday() != *on {
                    date += Duration::days(1);
                }
                date.and_time(*at)
            }
        }
    }
}

fn parse_time_of_day(service: &ServiceConfig) -> Result<NaiveTime, ConfigError> {
    let raw = service.time_of_day.as_deref().ok_or_else(|| {
        ConfigError::Invalid(format!(
            "{} service mode requires 'time_of_day'",
            service.frequency
        ))
    })?;
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| ConfigError::Invalid(format!("invalid time_of_day '{raw}', expected HH:MM")))
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Hourly { every } => write!(f, "backing up every {every} hour(s)"),
            Schedule::Daily { at } => write!(f, "backing up every day at {}", at.format("%H:%M")),
            Schedule::Weekly { on, at } => {
                write!(f, "backing up every week on {on} at {}", at.format("%H:%M"))
            }
        }
    }
}
