// Journal entries: a timestamp line followed by an indented payload line.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::payload::Payload;

/// Timestamp layout written to the journal, microsecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub payload: Payload,
}

impl LogEntry {
    pub fn new(timestamp: DateTime<Local>, payload: Payload) -> Self {
        Self { timestamp, payload }
    }

    /// Entry stamped with the current local time.
    pub fn now(payload: Payload) -> Self {
        Self::new(Local::now(), payload)
    }

    /// Text appended to the journal: `"<timestamp>\n <payload>\n"`.
    pub fn render(&self) -> String {
        format!("{}\n {}\n", self.timestamp.format(TIMESTAMP_FORMAT), self.payload)
    }
}
