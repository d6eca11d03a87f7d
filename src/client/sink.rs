//! Module `sink`
//!
//! A `ClientSink` is the outbound half of one client connection. Clones share
//! the same writer, so the registry and in-flight broadcasts can hold handles
//! while the owning session keeps its own. Closing is signalled to every
//! clone, so a session blocked on its reader learns when a broadcast gave up
//! on its connection.

use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, watch};
use tokio::time::timeout;

use crate::error::SinkError;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

static NEXT_SINK_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub struct ClientSink {
    id: u64,
    writer: Arc<Mutex<BoxedWriter>>,
    closed: Arc<watch::Sender<bool>>,
}

impl ClientSink {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            id: NEXT_SINK_ID.fetch_add(1, Ordering::Relaxed),
            writer: Arc::new(Mutex::new(Box::new(writer))),
            closed: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Process-unique identifier, used to tell two sinks for the same name apart.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once any clone of this sink has been closed.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        // The sender lives as long as `self`, so this only returns once closed.
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Writes `line` plus a newline and flushes, all within `limit`.
    ///
    /// The limit covers waiting for the writer lock too, so a delivery stuck
    /// behind a blocked write also gives up.
    pub async fn deliver(&self, line: &str, limit: Duration) -> Result<(), SinkError> {
        if self.is_closed() {
            return Err(SinkError::Closed);
        }

        let write = async {
            let mut writer = self.writer.lock().await;
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            Ok::<(), SinkError>(())
        };

        timeout(limit, write)
            .await
            .map_err(|_| SinkError::Timeout(limit))?
    }

    /// Marks the sink closed and shuts down the write side of the connection.
    ///
    /// Idempotent. The shutdown itself is bounded by `limit`; if the writer is
    /// wedged, the connection closes once the last clone is dropped.
    pub async fn close(&self, limit: Duration) {
        if self.closed.send_replace(true) {
            return;
        }

        let shutdown = async {
            let mut writer = self.writer.lock().await;
            writer.shutdown().await
        };

        match timeout(limit, shutdown).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Sink {} shutdown error: {}", self.id, e),
            Err(_) => debug!("Sink {} shutdown timed out", self.id),
        }
    }
}

impl std::fmt::Debug for ClientSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSink")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
