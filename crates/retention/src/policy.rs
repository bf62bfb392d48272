//! Retention policy configuration

use crate::classify::Tier;
use serde::Deserialize;

/// How many bucket representatives to keep per retention tier.
///
/// All-zero is legal and means "delete everything except the newest
/// backup", which the classifier keeps unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetentionPolicy {
    pub keep_daily: u32,
    pub keep_weekly: u32,
    pub keep_monthly: u32,
    pub keep_yearly: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            keep_daily: 7,
            keep_weekly: 4,
            keep_monthly: 12,
            keep_yearly: 2,
        }
    }
}

impl RetentionPolicy {
    /// Policy that keeps nothing beyond the unconditional newest.
    pub fn keep_none() -> Self {
        Self {
            keep_daily: 0,
            keep_weekly: 0,
            keep_monthly: 0,
            keep_yearly: 0,
        }
    }

    /// Keep-count for one tier.
    pub fn quota(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Daily => self.keep_daily,
            Tier::Weekly => self.keep_weekly,
            Tier::Monthly => self.keep_monthly,
            Tier::Yearly => self.keep_yearly,
        }
    }
}

impl std::fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "keep {} daily, {} weekly, {} monthly, and {} yearly backups",
            self.keep_daily, self.keep_weekly, self.keep_monthly, self.keep_yearly
        )
    }
}
