//! Backup artifact naming codec
//!
//! Artifacts are named `<prefix>-<formatted timestamp>.<extension>`.
//! With a fixed-width datetime format the names sort lexically by time,
//! which keeps remote listings readable. Decoding is lenient: anything
//! that does not match the scheme is simply not a backup of this set
//! (foreign files share the same remote path all the time).

use crate::record::BackupRecord;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Naming scheme for one backup set.
#[derive(Debug, Clone)]
pub struct NamingScheme {
    /// Set prefix; may be empty, in which case no separator is used
    pub prefix: String,
    /// chrono format string for the timestamp portion
    pub datetime_format: String,
    /// Artifact extension, without the dot
    pub extension: String,
}

impl NamingScheme {
    pub fn new(prefix: impl Into<String>, datetime_format: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            datetime_format: datetime_format.into(),
            extension: "zip".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Encode a timestamp into an artifact name.
    pub fn encode(&self, timestamp: NaiveDateTime) -> String {
        let formatted = timestamp.format(&self.datetime_format);
        if self.prefix.is_empty() {
            format!("{}.{}", formatted, self.extension)
        } else {
            format!("{}-{}.{}", self.prefix, formatted, self.extension)
        }
    }

    /// Decode an artifact name into a record.
    ///
    /// Returns `None` when the name does not carry this scheme's
    /// prefix, extension, or a parseable timestamp. A mismatch is not
    /// an error: foreign files in the same remote path are ignored.
    pub fn decode(&self, name: &str) -> Option<BackupRecord> {
        let suffix = format!(".{}", self.extension);
        let stem = name.strip_suffix(&suffix)?;

        let encoded = if self.prefix.is_empty() {
            stem
        } else {
            stem.strip_prefix(self.prefix.as_str())?.strip_prefix('-')?
        };

        let timestamp = parse_timestamp(encoded, &self.datetime_format)?;

        Some(BackupRecord {
            identifier: stem.to_string(),
            prefix: self.prefix.clone(),
            timestamp,
            raw_name: name.to_string(),
        })
    }
}

/// Parse a timestamp at the format's precision.
///
/// Date-only formats (no time components) parse as midnight, matching
/// the truncation that `encode` applies when formatting.
fn parse_timestamp(s: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, format).ok().or_else(|| {
        NaiveDate::parse_from_str(s, format)
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    })
}
