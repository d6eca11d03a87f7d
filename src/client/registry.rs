//! Client registry
//!
//! Maps usernames to the sinks of their live connections. Every read and
//! write of the map happens under one async mutex; the lock is never held
//! across a network write.

use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::client::ClientSink;
use crate::error::RegistryError;

/// Shared registry of registered clients. Cheap to clone.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<Mutex<HashMap<String, ClientSink>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`. Blank names and names already present are rejected;
    /// the existing entry is never replaced.
    pub async fn register(&self, name: &str, sink: ClientSink) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyUsername);
        }

        let mut clients = self.clients.lock().await;
        if clients.contains_key(name) {
            return Err(RegistryError::UsernameTaken(name.to_string()));
        }
        clients.insert(name.to_string(), sink);

        info!("Registered '{}' ({} clients)", name, clients.len());
        Ok(())
    }

    /// Removes `name` if present. Removing an absent name is a no-op.
    pub async fn unregister(&self, name: &str) -> Option<ClientSink> {
        self.clients.lock().await.remove(name)
    }

    /// Removes `name` only while it still maps to the sink with `sink_id`.
    ///
    /// Used by cleanup paths that must not evict a newer registration that
    /// reused the name.
    pub async fn unregister_sink(&self, name: &str, sink_id: u64) -> bool {
        let mut clients = self.clients.lock().await;
        match clients.get(name) {
            Some(sink) if sink.id() == sink_id => {
                clients.remove(name);
                true
            }
            _ => false,
        }
    }

    /// Consistent point-in-time copy of every registered sink.
    pub async fn snapshot(&self) -> Vec<(String, ClientSink)> {
        self.clients
            .lock()
            .await
            .iter()
            .map(|(name, sink)| (name.clone(), sink.clone()))
            .collect()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.clients.lock().await.contains_key(name)
    }

    pub async fn usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.lock().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }
}
