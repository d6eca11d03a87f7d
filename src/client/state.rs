//! Module `state`
//!
//! Defines the `Client` struct holding the per-connection state of one chat
//! session: peer address, assigned username and the outbound sink.

use std::net::SocketAddr;

use crate::client::ClientSink;

/// Represents the state of a connected chat client.
///
/// Owned by the session worker serving the connection. The username is set
/// once, when registration succeeds, and never changes afterwards.
pub struct Client {
    username: Option<String>,
    client_addr: SocketAddr,
    sink: ClientSink,
    is_registered: bool,
}

impl Client {
    pub fn new(client_addr: SocketAddr, sink: ClientSink) -> Self {
        Self {
            username: None,
            client_addr,
            sink,
            is_registered: false,
        }
    }

    /// Records a successful registration under `username`.
    pub fn mark_registered(&mut self, username: String) {
        if self.username.is_none() {
            self.username = Some(username);
        }
        self.is_registered = true;
    }

    /// Records that the registry entry has been removed.
    pub fn mark_unregistered(&mut self) {
        self.is_registered = false;
    }

    /// Returns the username of the client if registered.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn client_addr(&self) -> SocketAddr {
        self.client_addr
    }

    pub fn sink(&self) -> &ClientSink {
        &self.sink
    }

    pub fn is_registered(&self) -> bool {
        self.is_registered
    }

    /// Label used in log lines: the username when known, the address otherwise.
    pub fn label(&self) -> String {
        match &self.username {
            Some(name) => format!("'{}' ({})", name, self.client_addr),
            None => self.client_addr.to_string(),
        }
    }
}
