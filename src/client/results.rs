//! Client result types
//!
//! Defines how a client session ended.

/// Reason a session worker exited
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    /// Blank username, taken username or no username at all
    Rejected,
    /// Client sent the exit sentinel
    Exited,
    /// Peer closed the stream
    Disconnected,
    /// Read error on the connection
    Failed,
    /// A broadcast closed this client's sink
    Dropped,
}

impl SessionEnd {
    pub fn describe(&self) -> &'static str {
        match self {
            SessionEnd::Rejected => "rejected",
            SessionEnd::Exited => "left the chat",
            SessionEnd::Disconnected => "disconnected",
            SessionEnd::Failed => "failed",
            SessionEnd::Dropped => "dropped",
        }
    }
}
