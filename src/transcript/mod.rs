//! Durable chat transcript
//!
//! Handles the append-only file that records every broadcast.

pub mod appender;

pub use appender::LogAppender;
