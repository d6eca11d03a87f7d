//! Broadcast engine
//!
//! Formats transcript entries and fans them out to registered clients.

pub mod engine;
pub mod entry;
pub mod results;

pub use engine::{Broadcaster, SERVER_SENDER};
pub use entry::TranscriptEntry;
pub use results::BroadcastReport;
