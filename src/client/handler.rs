use log::debug;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::TcpStream;

use crate::broadcast::Broadcaster;
use crate::client::SessionEnd;
use crate::client::session::run_session;
use crate::server::ChatConfig;

/// Serves one accepted TCP connection as a chat session.
///
/// - Splits the stream so the session reads lines while broadcasts write
///   through the registered sink.
/// - The read half is dropped when the session returns; the write half is
///   shut down by the session's cleanup.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    broadcaster: Arc<Broadcaster>,
    config: Arc<ChatConfig>,
) -> SessionEnd {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Could not set TCP_NODELAY for {}: {}", client_addr, e);
    }

    let (read_half, write_half) = stream.into_split();
    run_session(
        BufReader::new(read_half),
        write_half,
        client_addr,
        broadcaster,
        config,
    )
    .await
}
