//! Server core functionality
//!
//! This module contains the connection acceptor, the running-server handle
//! and configuration loading.

pub mod config;
pub mod core;

pub use self::config::{ChatConfig, ClientConfig, read_port_from_settings};
pub use self::core::{Server, ServerHandle};
