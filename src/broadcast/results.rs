//! Broadcast result types
//!
//! Defines the report returned by a broadcast call.

/// Outcome of one broadcast
#[derive(Debug, Clone)]
pub struct BroadcastReport {
    /// The formatted line as written and sent
    pub line: String,
    /// Whether the transcript append succeeded
    pub logged: bool,
    /// Recipients that received the line
    pub delivered: Vec<String>,
    /// Recipients whose sink failed or timed out and was dropped
    pub dropped: Vec<String>,
}
