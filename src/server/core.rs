use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;

use crate::broadcast::{BroadcastReport, Broadcaster};
use crate::client::{ClientRegistry, handle_client};
use crate::error::{ChatServerError, TranscriptError};
use crate::middleware::logging::log_connection;
use crate::server::config::ChatConfig;
use crate::transcript::LogAppender;

const LISTEN_BACKLOG: u32 = 1024;
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// A bound, not yet accepting, chat server.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    broadcaster: Arc<Broadcaster>,
    config: Arc<ChatConfig>,
}

impl Server {
    /// Binds the listening socket with address reuse enabled.
    ///
    /// Bind failure is fatal: there is no service without a listener.
    pub async fn new(config: ChatConfig) -> Result<Self, ChatServerError> {
        let socket_str = config.listen_socket();
        let listener = bind_reusable(&socket_str)
            .await
            .map_err(|e| ChatServerError::Bind(socket_str.clone(), e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ChatServerError::Bind(socket_str.clone(), e))?;
        info!("Server bound to {}", local_addr);

        let appender = LogAppender::new(config.transcript_path());
        if let Err(e) = tokio::fs::create_dir_all(&config.log_dir).await {
            warn!("Failed to create log directory {}: {}", config.log_dir, e);
        } else {
            info!("Transcript file: {}", appender.path().display());
        }

        let broadcaster = Arc::new(Broadcaster::new(
            ClientRegistry::new(),
            appender,
            config.sink_timeout(),
        ));

        Ok(Self {
            listener,
            local_addr,
            broadcaster,
            config: Arc::new(config),
        })
    }

    /// Spawns the accept loop and returns a handle to the running server.
    pub fn start(self) -> ServerHandle {
        info!(
            "Starting chat server on {} (max {} clients)",
            self.local_addr, self.config.max_clients
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let broadcaster = Arc::clone(&self.broadcaster);
        let accept_task = tokio::spawn(accept_loop(
            self.listener,
            self.broadcaster,
            self.config,
            shutdown_rx,
        ));

        ServerHandle {
            local_addr: self.local_addr,
            broadcaster,
            shutdown: shutdown_tx,
            accept_task,
        }
    }
}

/// Handle to a listening server.
///
/// Dropping the handle also stops the accept loop; `stop` additionally waits
/// for it to finish. Sessions already running are left alone either way.
pub struct ServerHandle {
    local_addr: SocketAddr,
    broadcaster: Arc<Broadcaster>,
    shutdown: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn registry(&self) -> &ClientRegistry {
        self.broadcaster.registry()
    }

    /// Injects a message from `sender`, e.g. a server announcement.
    pub async fn broadcast(&self, sender: &str, message: &str) -> BroadcastReport {
        self.broadcaster.broadcast(sender, message).await
    }

    pub async fn append_log_entry(&self, line: &str) -> Result<(), TranscriptError> {
        self.broadcaster.append_log_entry(line).await
    }

    /// Closes the listening socket and waits for the accept loop to exit.
    pub async fn stop(self) -> Result<(), ChatServerError> {
        let _ = self.shutdown.send(true);
        self.accept_task
            .await
            .map_err(|e| ChatServerError::IoError(io::Error::other(e)))?;
        info!("Server on {} stopped", self.local_addr);
        Ok(())
    }
}

async fn bind_reusable(socket_str: &str) -> io::Result<TcpListener> {
    let addr = lookup_host(socket_str).await?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no address resolved for {}", socket_str),
        )
    })?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(LISTEN_BACKLOG)
}

async fn accept_loop(
    listener: TcpListener,
    broadcaster: Arc<Broadcaster>,
    config: Arc<ChatConfig>,
    mut shutdown: watch::Receiver<bool>,
) {
    let connections = Arc::new(Semaphore::new(config.max_clients));

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    log_connection(&addr);

                    let permit = match Arc::clone(&connections).try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            warn!(
                                "Too many connections ({}); refusing {}",
                                config.max_clients, addr
                            );
                            continue;
                        }
                    };

                    let broadcaster = Arc::clone(&broadcaster);
                    let config = Arc::clone(&config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        let end = handle_client(stream, addr, broadcaster, config).await;
                        debug!("Session for {} ended: {:?}", addr, end);
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
            }
        }
    }

    drop(listener);
    info!("Listener closed; no longer accepting connections");
}
