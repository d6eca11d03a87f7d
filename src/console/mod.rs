//! Terminal chat client
//!
//! Line-based client used by the `chat-client` binary.

pub mod runner;

pub use runner::{ClientExit, prompt_username, run_client};
