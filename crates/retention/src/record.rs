//! Backup records and timestamp-ordered backup sets

use chrono::NaiveDateTime;

/// A single backup artifact decoded from its remote name.
///
/// Immutable once constructed. The remote listing is the source of
/// truth; records are rebuilt from it on every run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackupRecord {
    /// Name without the extension (`<prefix>-<formatted timestamp>`)
    pub identifier: String,
    /// Naming prefix shared by the backup set
    pub prefix: String,
    /// Timestamp parsed from the name, at the format's precision
    pub timestamp: NaiveDateTime,
    /// Exact name as listed on the remote
    pub raw_name: String,
}

/// All backups sharing one prefix, ordered newest first.
///
/// Ties on timestamp (clock collision) are broken by lexically greater
/// raw name, which is treated as newer.
#[derive(Debug, Clone, Default)]
pub struct BackupSet {
    records: Vec<BackupRecord>,
}

impl BackupSet {
    /// Build a set from decoded records, sorting newest first.
    pub fn from_records(mut records: Vec<BackupRecord>) -> Self {
        records.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.raw_name.cmp(&a.raw_name))
        });
        // Same raw name means the same remote artifact listed twice.
        records.dedup_by(|a, b| a.raw_name == b.raw_name);
        Self { records }
    }

    /// Records, newest first.
    pub fn records(&self) -> &[BackupRecord] {
        &self.records
    }

    /// The newest backup, if any.
    pub fn newest(&self) -> Option<&BackupRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BackupRecord> {
        self.records.iter()
    }
}

impl IntoIterator for BackupSet {
    type Item = BackupRecord;
    type IntoIter = std::vec::IntoIter<BackupRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
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

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_ordering_newest_first() {
        let set = BackupSet::from_records(vec![
            record("app-2024-01-01.zip", ts(2024, 1, 1)),
            record("app-2024-03-01.zip", ts(2024, 3, 1)),
            record("app-2024-02-01.zip", ts(2024, 2, 1)),
        ]);
        let names: Vec<_> = set.iter().map(|r| r.raw_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "app-2024-03-01.zip",
                "app-2024-02-01.zip",
                "app-2024-01-01.zip"
            ]
        );
        assert_eq!(set.newest().unwrap().raw_name, "app-2024-03-01.zip");
    }

    #[test]
    fn test_clock_collision_lexically_greater_is_newer() {
        let set = BackupSet::from_records(vec![
            record("a.zip", ts(2024, 1, 1)),
            record("b.zip", ts(2024, 1, 1)),
        ]);
        assert_eq!(set.newest().unwrap().raw_name, "b.zip");
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let set = BackupSet::from_records(vec![
            record("app-2024-01-01.zip", ts(2024, 1, 1)),
            record("app-2024-01-01.zip", ts(2024, 1, 1)),
        ]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_empty_set() {
        let set = BackupSet::from_records(Vec::new());
        assert!(set.is_empty());
        assert!(set.newest().is_none());
    }
}
