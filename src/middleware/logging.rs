//! Logging middleware
//!
//! Lifecycle log lines shared by the acceptor and the session workers.

use log::{info, warn};
use std::net::SocketAddr;

/// Log a client connection
pub fn log_connection(client_addr: &SocketAddr) {
    info!("Client connected: {}", client_addr);
}

/// Log a successful registration
pub fn log_join(username: &str, client_addr: &SocketAddr) {
    info!("User '{}' joined from {}", username, client_addr);
}

/// Log a refused registration
pub fn log_rejection(client_addr: &SocketAddr, reason: &str) {
    warn!("Registration refused for {}: {}", client_addr, reason);
}

/// Log the end of a session
pub fn log_leave(label: &str, how: &str) {
    info!("Client {} {}", label, how);
}
