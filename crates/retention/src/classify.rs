//! Grandfather-father-son retention classification
//!
//! Partitions a backup set into keep/delete. The newest backup is kept
//! unconditionally so at least one restorable artifact always survives,
//! even under an all-zero policy. Each tier (daily, weekly, monthly,
//! yearly) then claims the first backup it sees per calendar bucket,
//! newest to oldest, until its quota is filled. A backup claimed by an
//! earlier tier is out of consideration for later tiers, so no backup
//! fills two tier slots.

use crate::policy::RetentionPolicy;
use crate::record::{BackupRecord, BackupSet};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use tracing::debug;

/// One retention tier of the rotation, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Tier {
    /// Tiers in the order they claim representatives.
    pub const ALL: [Tier; 4] = [Tier::Daily, Tier::Weekly, Tier::Monthly, Tier::Yearly];

    /// Calendar bucket a timestamp falls into for this tier.
    ///
    /// Pure function of the timestamp, so the grouping is unit-testable
    /// without any I/O.
    pub fn bucket_key(&self, timestamp: NaiveDateTime) -> BucketKey {
        let date = timestamp.date();
        match self {
            Tier::Daily => BucketKey::Day(date),
            Tier::Weekly => {
                let week = date.iso_week();
                BucketKey::Week(week.year(), week.week())
            }
            Tier::Monthly => BucketKey::Month(date.year(), date.month()),
            Tier::Yearly => BucketKey::Year(date.year()),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Daily => write!(f, "daily"),
            Tier::Weekly => write!(f, "weekly"),
            Tier::Monthly => write!(f, "monthly"),
            Tier::Yearly => write!(f, "yearly"),
        }
    }
}

/// Calendar bucket key. Weekly buckets use ISO week numbering, so the
/// year component is the ISO week-year, not the calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKey {
    Day(NaiveDate),
    Week(i32, u32),
    Month(i32, u32),
    Year(i32),
}

/// Exact partition of a backup set, both halves newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub keep: Vec<BackupRecord>,
    pub delete: Vec<BackupRecord>,
}

/// Partition `set` into keep/delete under `policy`.
///
/// Every record of the set lands in exactly one half. An empty set
/// yields an empty result; a policy that protects more backups than
/// exist yields an empty delete half. Never errors.
pub fn classify(set: &BackupSet, policy: &RetentionPolicy) -> ClassificationResult {
    let records = set.records();
    let mut kept = vec![false; records.len()];
    // Claimed as a tier representative; such records are removed from
    // consideration by later tiers.
    let mut claimed = vec![false; records.len()];

    // Safety invariant: the newest backup always survives.
    if let Some(first) = kept.first_mut() {
        *first = true;
    }

    for tier in Tier::ALL {
        let quota = policy.quota(tier);
        if quota == 0 {
            continue;
        }

        let mut seen: HashSet<BucketKey> = HashSet::new();
        let mut representatives = 0u32;

        for (i, record) in records.iter().enumerate() {
            if representatives >= quota {
                break;
            }
            if claimed[i] {
                continue;
            }
            let key = tier.bucket_key(record.timestamp);
            // Only the first backup encountered per bucket counts;
            // later ones in the same bucket never become representatives.
            if seen.insert(key) {
                claimed[i] = true;
                kept[i] = true;
                representatives += 1;
            }
        }
    }

    let mut keep = Vec::new();
    let mut delete = Vec::new();
    for (i, record) in records.iter().enumerate() {
        if kept[i] {
            keep.push(record.clone());
        } else {
            delete.push(record.clone());
        }
    }

    debug!(
        total = records.len(),
        keep = keep.len(),
        delete = delete.len(),
        "classified backup set"
    );

    ClassificationResult { keep, delete }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(name: &str, ts: NaiveDateTime) -> BackupRecord {
        BackupRecord {
            identifier: name.trim_end_matches(".zip").to_string(),
            prefix: "app".to_string(),
            timestamp: ts,
            raw_name: name.to_string(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(3, 0, 0)
            .unwrap()
    }

    /// One backup per day for `count` consecutive days ending at `last`.
    fn daily_set(last: NaiveDate, count: usize) -> BackupSet {
        let records = (0..count)
            .map(|i| {
                let date = last - chrono::Duration::days(i as i64);
                record(
                    &format!("app-{}.zip", date.format("%Y-%m-%d")),
                    date.and_hms_opt(3, 0, 0).unwrap(),
                )
            })
            .collect();
        BackupSet::from_records(records)
    }

    fn policy(d: u32, w: u32, m: u32, y: u32) -> RetentionPolicy {
        RetentionPolicy {
            keep_daily: d,
            keep_weekly: w,
            keep_monthly: m,
            keep_yearly: y,
        }
    }

    fn names(records: &[BackupRecord]) -> Vec<&str> {
        records.iter().map(|r| r.raw_name.as_str()).collect()
    }

    #[test]
    fn test_scenario_seven_dailies_out_of_ten() {
        let set = daily_set(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 10);
        let result = classify(&set, &policy(7, 0, 0, 0));
        // The unconditional newest is also the first daily
        // representative, so it is not double counted.
        assert_eq!(result.keep.len(), 7);
        assert_eq!(result.delete.len(), 3);
        assert_eq!(
            names(&result.keep),
            vec![
                "app-2024-03-10.zip",
                "app-2024-03-09.zip",
                "app-2024-03-08.zip",
                "app-2024-03-07.zip",
                "app-2024-03-06.zip",
                "app-2024-03-05.zip",
                "app-2024-03-04.zip",
            ]
        );
    }

    #[test]
    fn test_scenario_all_zero_policy_keeps_only_newest() {
        let set = daily_set(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 5);
        let result = classify(&set, &RetentionPolicy::keep_none());
        assert_eq!(names(&result.keep), vec!["app-2024-03-10.zip"]);
        assert_eq!(result.delete.len(), 4);
    }

    #[test]
    fn test_scenario_clock_collision_tie_break() {
        let stamp = day(2024, 3, 10);
        let set = BackupSet::from_records(vec![
            record("a.zip", stamp),
            record("b.zip", stamp),
        ]);
        let result = classify(&set, &policy(1, 0, 0, 0));
        // Lexically greater raw name is treated as newer, so b.zip is
        // both the unconditional newest and the day's representative.
        assert_eq!(names(&result.keep), vec!["b.zip"]);
        assert_eq!(names(&result.delete), vec!["a.zip"]);
    }

    #[test]
    fn test_scenario_empty_set() {
        let result = classify(&BackupSet::default(), &policy(7, 4, 12, 2));
        assert!(result.keep.is_empty());
        assert!(result.delete.is_empty());
    }

    #[test]
    fn test_policy_protecting_more_than_exists() {
        let set = daily_set(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 3);
        let result = classify(&set, &policy(7, 4, 12, 2));
        assert_eq!(result.keep.len(), 3);
        assert!(result.delete.is_empty());
    }

    #[test]
    fn test_partition_property() {
        let set = daily_set(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(), 40);
        let result = classify(&set, &policy(3, 2, 1, 1));
        assert_eq!(result.keep.len() + result.delete.len(), set.len());
        let keep: HashSet<_> = result.keep.iter().map(|r| &r.raw_name).collect();
        for deleted in &result.delete {
            assert!(!keep.contains(&deleted.raw_name));
        }
        for record in set.iter() {
            let in_keep = result.keep.contains(record);
            let in_delete = result.delete.contains(record);
            assert!(in_keep ^ in_delete, "{} must be in exactly one half", record.raw_name);
        }
    }

    #[test]
    fn test_newest_always_kept() {
        for count in 1..12 {
            let set = daily_set(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), count);
            let result = classify(&set, &RetentionPolicy::keep_none());
            assert_eq!(result.keep[0], *set.newest().unwrap());
        }
    }

    #[test]
    fn test_idempotent() {
        let set = daily_set(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 25);
        let p = policy(5, 3, 2, 1);
        assert_eq!(classify(&set, &p), classify(&set, &p));
    }

    #[test]
    fn test_tier_quotas_never_exceeded() {
        // 100 consecutive days span many weeks/months; total kept can
        // never exceed the sum of quotas (the unconditional newest
        // doubles as the first daily representative).
        let set = daily_set(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), 100);
        let result = classify(&set, &policy(4, 3, 2, 1));
        assert!(result.keep.len() <= 4 + 3 + 2 + 1);
        assert_eq!(result.keep.len(), 10);
    }

    #[test]
    fn test_weekly_tier_skips_daily_claims() {
        // 2024-01-01 is a Monday: days 1-7 are ISO week 1, 8-14 week 2.
        let set = daily_set(NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(), 14);
        let result = classify(&set, &policy(2, 2, 0, 0));
        // Daily claims the 14th and 13th. Weekly then sees the 12th
        // first for week 2 and the 7th first for week 1.
        assert_eq!(
            names(&result.keep),
            vec![
                "app-2024-01-14.zip",
                "app-2024-01-13.zip",
                "app-2024-01-12.zip",
                "app-2024-01-07.zip",
            ]
        );
    }

    #[test]
    fn test_zero_quota_tier_is_skipped() {
        // daily=0: the daily tier claims nothing, weekly claims the
        // newest per ISO week.
        let set = daily_set(NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(), 14);
        let result = classify(&set, &policy(0, 2, 0, 0));
        assert_eq!(
            names(&result.keep),
            vec!["app-2024-01-14.zip", "app-2024-01-07.zip"]
        );
    }

    #[test]
    fn test_monthly_and_yearly_buckets() {
        let records = vec![
            record("app-2024-02-20.zip", day(2024, 2, 20)),
            record("app-2024-02-01.zip", day(2024, 2, 1)),
            record("app-2024-01-15.zip", day(2024, 1, 15)),
            record("app-2023-11-30.zip", day(2023, 11, 30)),
            record("app-2023-03-01.zip", day(2023, 3, 1)),
        ];
        let set = BackupSet::from_records(records);
        let result = classify(&set, &policy(0, 0, 2, 2));
        // Monthly claims Feb 20 (2024-02) and Jan 15 (2024-01). Yearly
        // then sees Feb 1 first among the unclaimed for 2024, and
        // Nov 30 for 2023.
        assert_eq!(
            names(&result.keep),
            vec![
                "app-2024-02-20.zip",
                "app-2024-02-01.zip",
                "app-2024-01-15.zip",
                "app-2023-11-30.zip",
            ]
        );
        assert_eq!(names(&result.delete), vec!["app-2023-03-01.zip"]);
    }

    #[test]
    fn test_iso_week_bucket_crosses_year_boundary() {
        // 2024-12-30 (Mon) and 2025-01-02 (Thu) are both ISO week 1 of
        // 2025, so weekly=2 keeps only one of them plus an older week.
        let records = vec![
            record("app-2025-01-02.zip", day(2025, 1, 2)),
            record("app-2024-12-30.zip", day(2024, 12, 30)),
            record("app-2024-12-25.zip", day(2024, 12, 25)),
        ];
        let set = BackupSet::from_records(records);
        let result = classify(&set, &policy(0, 2, 0, 0));
        assert_eq!(
            names(&result.keep),
            vec!["app-2025-01-02.zip", "app-2024-12-25.zip"]
        );
    }

    #[test]
    fn test_bucket_keys() {
        let ts = day(2024, 1, 14);
        assert_eq!(
            Tier::Daily.bucket_key(ts),
            BucketKey::Day(NaiveDate::from_ymd_opt(2024, 1, 14).unwrap())
        );
        assert_eq!(Tier::Weekly.bucket_key(ts), BucketKey::Week(2024, 2));
        assert_eq!(Tier::Monthly.bucket_key(ts), BucketKey::Month(2024, 1));
        assert_eq!(Tier::Yearly.bucket_key(ts), BucketKey::Year(2024));
    }
}
