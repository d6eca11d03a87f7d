//! Server middleware
//!
//! Provides logging helpers used around the session lifecycle.

pub mod logging;
