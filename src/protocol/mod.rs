//! Chat wire protocol
//!
//! Newline-delimited UTF-8 text: the first line is the username, every later
//! line is a chat message or the exit sentinel.

pub mod commands;
pub mod reader;

pub use commands::{ChatLine, EXIT_SENTINEL, parse_line, parse_username, strip_terminator};
pub use reader::{LineRead, read_capped_line};
