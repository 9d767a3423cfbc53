use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use scout_core::JsonMapFile;

use crate::error::Result;

/// Marks a meeting a user has already been offered research for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub meeting_id: String,
    /// Written as RFC 3339. Offset-less ISO timestamps from older logs are
    /// read as UTC.
    #[serde(deserialize_with = "utc_lenient")]
    pub notified_at: DateTime<Utc>,
}

fn utc_lenient<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Dedupe key for one user and one calendar event.
pub fn notification_key(slack_user_id: &str, event_id: &str) -> String {
    format!("{slack_user_id}_{event_id}")
}

/// `notified_meetings.json`, held in memory for the duration of a scan.
pub struct NotificationLog {
    file: JsonMapFile<NotificationRecord>,
    records: BTreeMap<String, NotificationRecord>,
}

impl NotificationLog {
    /// Read the log from disk; unreadable files start empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let file = JsonMapFile::new(path);
        let records = file.load();
        Self { file, records }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record a notification and write the whole log back immediately.
    pub fn record(&mut self, key: String, meeting_id: &str) -> Result<()> {
        self.records.insert(
            key,
            NotificationRecord {
                meeting_id: meeting_id.to_string(),
                notified_at: Utc::now(),
            },
        );
        self.file.save(&self.records)?;
        Ok(())
    }
}
