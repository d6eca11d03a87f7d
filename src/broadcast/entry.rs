//! Transcript entry formatting
//!
//! One entry renders as `[<timestamp>] [<sender>]: <message>`, with the
//! timestamp in server local time as `YYYY-MM-DDTHH:MM:SS.mmm`. The same line
//! is written to the transcript and sent to every client.

use chrono::{DateTime, Local};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub timestamp: DateTime<Local>,
    pub sender: String,
    pub message: String,
}

impl TranscriptEntry {
    /// Stamps a new entry with the current wall-clock time.
    pub fn now(sender: &str, message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            sender: sender.to_string(),
            message: message.to_string(),
        }
    }

    pub fn format_line(&self) -> String {
        format!(
            "[{}] [{}]: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.sender,
            self.message
        )
    }
}
