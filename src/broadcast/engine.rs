//! Broadcast engine
//!
//! Records one chat message in the transcript and fans it out to every
//! registered sink. Broadcast calls are serialized: the append and the full
//! fan-out of entry N finish before entry N+1 is stamped.

use log::{debug, error};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::broadcast::{BroadcastReport, TranscriptEntry};
use crate::client::ClientRegistry;
use crate::error::{ChatServerError, TranscriptError, handle_error, report_contained};
use crate::transcript::LogAppender;

/// Sender name used for server-originated announcements.
pub const SERVER_SENDER: &str = "server";

pub struct Broadcaster {
    registry: ClientRegistry,
    appender: LogAppender,
    sink_timeout: Duration,
    order: Mutex<()>,
}

impl Broadcaster {
    pub fn new(registry: ClientRegistry, appender: LogAppender, sink_timeout: Duration) -> Self {
        Self {
            registry,
            appender,
            sink_timeout,
            order: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    pub fn sink_timeout(&self) -> Duration {
        self.sink_timeout
    }

    /// Appends `(sender, message)` to the transcript and delivers it to every
    /// sink registered when the call starts.
    ///
    /// A transcript failure is logged and delivery still proceeds. A sink that
    /// errors or exceeds the delivery timeout is closed and unregistered; the
    /// other sinks are unaffected. Returns once every delivery has finished or
    /// been abandoned.
    pub async fn broadcast(&self, sender: &str, message: &str) -> BroadcastReport {
        let _order = self.order.lock().await;

        let line = TranscriptEntry::now(sender, message).format_line();

        let logged = match self.appender.append(&line).await {
            Ok(()) => true,
            Err(e) => {
                handle_error(&ChatServerError::from(e));
                false
            }
        };

        let recipients = self.registry.snapshot().await;
        let shared_line: Arc<str> = Arc::from(line.as_str());
        let mut deliveries = JoinSet::new();

        for (name, sink) in recipients {
            let line = Arc::clone(&shared_line);
            let limit = self.sink_timeout;
            deliveries.spawn(async move {
                let result = sink.deliver(&line, limit).await;
                (name, sink, result)
            });
        }

        let mut delivered = Vec::new();
        let mut dropped = Vec::new();

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok((name, _, Ok(()))) => delivered.push(name),
                Ok((name, sink, Err(e))) => {
                    report_contained(
                        &format!("Dropping client '{}'", name),
                        &ChatServerError::from(e),
                    );
                    sink.close(self.sink_timeout).await;
                    self.registry.unregister_sink(&name, sink.id()).await;
                    dropped.push(name);
                }
                Err(e) => error!("Delivery task failed: {}", e),
            }
        }

        delivered.sort();
        dropped.sort();
        debug!(
            "Broadcast from '{}' delivered to {} client(s), dropped {}",
            sender,
            delivered.len(),
            dropped.len()
        );

        BroadcastReport {
            line,
            logged,
            delivered,
            dropped,
        }
    }

    /// Broadcasts a notice under the reserved server sender name.
    pub async fn announce(&self, message: &str) -> BroadcastReport {
        self.broadcast(SERVER_SENDER, message).await
    }

    /// Appends a raw line to the transcript without broadcasting it.
    pub async fn append_log_entry(&self, line: &str) -> Result<(), TranscriptError> {
        self.appender.append(line).await
    }
}
