//! Client session lifecycle
//!
//! One worker per connection: read the username, register, relay every
//! message line to the broadcast engine, then unregister and close. The
//! reader and writer are injected so the same loop serves TCP sockets and
//! in-memory pipes.

use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::broadcast::Broadcaster;
use crate::client::{Client, ClientSink, SessionEnd};
use crate::error::{ChatServerError, report_contained};
use crate::middleware::logging::{log_join, log_leave, log_rejection};
use crate::protocol::{ChatLine, LineRead, parse_line, parse_username, read_capped_line};
use crate::server::ChatConfig;

/// Runs one chat session to completion.
///
/// Never returns an error: read failures end the session like a disconnect,
/// and cleanup (unregister, close) runs on every exit path after registration.
pub async fn run_session<R, W>(
    mut reader: R,
    writer: W,
    client_addr: SocketAddr,
    broadcaster: Arc<Broadcaster>,
    config: Arc<ChatConfig>,
) -> SessionEnd
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let sink = ClientSink::new(writer);
    let mut client = Client::new(client_addr, sink.clone());
    let limit = broadcaster.sink_timeout();

    let line = match read_capped_line(&mut reader, config.max_line_length).await {
        Ok(LineRead::Line(line)) => line,
        Ok(LineRead::Eof) => {
            log_rejection(&client.client_addr(), "closed before sending a username");
            sink.close(limit).await;
            return SessionEnd::Rejected;
        }
        Ok(LineRead::TooLong(len)) => {
            log_rejection(
                &client.client_addr(),
                &format!("{}-byte username line", len),
            );
            sink.close(limit).await;
            return SessionEnd::Rejected;
        }
        Err(e) => {
            error!("Failed to read username from {}: {}", client.client_addr(), e);
            sink.close(limit).await;
            return SessionEnd::Rejected;
        }
    };

    let Some(username) = parse_username(&line) else {
        log_rejection(&client.client_addr(), "no username provided");
        sink.close(limit).await;
        return SessionEnd::Rejected;
    };

    if let Err(e) = broadcaster.registry().register(&username, sink.clone()).await {
        report_contained(
            &format!("Registration refused for {}", client.client_addr()),
            &ChatServerError::from(e),
        );
        sink.close(limit).await;
        return SessionEnd::Rejected;
    }

    client.mark_registered(username.clone());
    log_join(&username, &client.client_addr());

    if config.announce_presence {
        broadcaster
            .announce(&format!("{} joined the chat", username))
            .await;
    }

    let end = relay_messages(&mut reader, &client, &username, &broadcaster, &config).await;

    broadcaster
        .registry()
        .unregister_sink(&username, sink.id())
        .await;
    client.mark_unregistered();
    sink.close(limit).await;
    log_leave(&client.label(), end.describe());

    if config.announce_presence {
        broadcaster
            .announce(&format!("{} left the chat", username))
            .await;
    }

    end
}

async fn relay_messages<R>(
    reader: &mut R,
    client: &Client,
    username: &str,
    broadcaster: &Broadcaster,
    config: &ChatConfig,
) -> SessionEnd
where
    R: AsyncBufRead + Unpin,
{
    loop {
        // A broadcast that gave up on this client closes the sink; stop
        // reading right away instead of waiting for the peer.
        let read = tokio::select! {
            read = read_capped_line(reader, config.max_line_length) => read,
            _ = client.sink().closed() => return SessionEnd::Dropped,
        };

        match read {
            Ok(LineRead::Eof) => {
                info!("Connection closed by client {}", client.label());
                return SessionEnd::Disconnected;
            }
            Ok(LineRead::TooLong(len)) => warn_overlong(client, len, config),
            Ok(LineRead::Line(line)) => match parse_line(&line, config.max_line_length) {
                ChatLine::Exit => return SessionEnd::Exited,
                ChatLine::Blank => continue,
                ChatLine::TooLong(len) => warn_overlong(client, len, config),
                ChatLine::Message(message) => {
                    debug!("Received from {}: {}", client.label(), message);
                    broadcaster.broadcast(username, &message).await;
                }
            },
            Err(e) => {
                error!("Failed to read from {}: {}", client.label(), e);
                return SessionEnd::Failed;
            }
        }
    }
}

fn warn_overlong(client: &Client, len: usize, config: &ChatConfig) {
    warn!(
        "Dropping {}-byte line from {} (limit {})",
        len,
        client.label(),
        config.max_line_length
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::LogAppender;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, duplex, split};
    use tokio::task::JoinHandle;

    struct Harness {
        broadcaster: Arc<Broadcaster>,
        transcript: std::path::PathBuf,
        _dir: tempfile::TempDir,
    }

    fn harness(announce_presence: bool) -> (Harness, Arc<ChatConfig>) {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("log").join("file.log");
        let broadcaster = Arc::new(Broadcaster::new(
            crate::client::ClientRegistry::new(),
            LogAppender::new(&transcript),
            Duration::from_millis(500),
        ));
        let config = Arc::new(ChatConfig {
            max_line_length: 32,
            announce_presence,
            ..ChatConfig::default()
        });
        (
            Harness {
                broadcaster,
                transcript,
                _dir: dir,
            },
            config,
        )
    }

    fn spawn_session(
        harness: &Harness,
        config: &Arc<ChatConfig>,
    ) -> (BufReader<DuplexStream>, JoinHandle<SessionEnd>) {
        spawn_session_with_pipe(harness, config, 4096)
    }

    fn spawn_session_with_pipe(
        harness: &Harness,
        config: &Arc<ChatConfig>,
        pipe_size: usize,
    ) -> (BufReader<DuplexStream>, JoinHandle<SessionEnd>) {
        let (client_side, server_side) = duplex(pipe_size);
        let (read_half, write_half) = split(server_side);
        let addr: SocketAddr = "127.0.0.1:5555".parse().unwrap();
        let task = tokio::spawn(run_session(
            BufReader::new(read_half),
            write_half,
            addr,
            Arc::clone(&harness.broadcaster),
            Arc::clone(config),
        ));
        (BufReader::new(client_side), task)
    }

    async fn send(client: &mut BufReader<DuplexStream>, text: &str) {
        client.get_mut().write_all(text.as_bytes()).await.unwrap();
    }

    async fn next_line(client: &mut BufReader<DuplexStream>) -> String {
        let mut line = String::new();
        client.read_line(&mut line).await.unwrap();
        line
    }

    async fn wait_registered(harness: &Harness, name: &str) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !harness.broadcaster.registry().contains(name).await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("session never registered");
    }

    #[tokio::test]
    async fn blank_username_is_rejected_silently() {
        let (harness, config) = harness(false);
        let (mut client, task) = spawn_session(&harness, &config);

        send(&mut client, "   \n").await;

        assert_eq!(task.await.unwrap(), SessionEnd::Rejected);
        assert!(harness.broadcaster.registry().is_empty().await);
        assert_eq!(next_line(&mut client).await, "");
        assert!(!harness.transcript.exists());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (harness, config) = harness(false);
        let existing = ClientSink::new(tokio::io::sink());
        harness
            .broadcaster
            .registry()
            .register("alice", existing.clone())
            .await
            .unwrap();

        let (mut client, task) = spawn_session(&harness, &config);
        send(&mut client, "alice\n").await;

        assert_eq!(task.await.unwrap(), SessionEnd::Rejected);
        let snapshot = harness.broadcaster.registry().snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].1.id(), existing.id());
    }

    #[tokio::test]
    async fn relays_messages_and_unregisters_on_exit() {
        let (harness, config) = harness(false);
        let (mut client, task) = spawn_session(&harness, &config);

        send(&mut client, "alice\n\n   \nhello\r\n").await;
        let echoed = next_line(&mut client).await;
        assert!(echoed.ends_with("[alice]: hello\n"));
        assert!(harness.broadcaster.registry().contains("alice").await);

        send(&mut client, "/exit\n").await;
        assert_eq!(task.await.unwrap(), SessionEnd::Exited);
        assert!(!harness.broadcaster.registry().contains("alice").await);
        assert_eq!(next_line(&mut client).await, "");

        let transcript = std::fs::read_to_string(&harness.transcript).unwrap();
        assert_eq!(transcript.lines().count(), 1);
    }

    #[tokio::test]
    async fn overlong_lines_are_not_broadcast() {
        let (harness, config) = harness(false);
        let (mut client, task) = spawn_session(&harness, &config);

        let long = "y".repeat(64);
        send(&mut client, &format!("bob\n{long}\nshort\n")).await;
        let line = next_line(&mut client).await;
        assert!(line.ends_with("[bob]: short\n"));

        drop(client);
        assert_eq!(task.await.unwrap(), SessionEnd::Disconnected);
        assert!(harness.broadcaster.registry().is_empty().await);
    }

    #[tokio::test]
    async fn presence_announcements_when_enabled() {
        let (harness, config) = harness(true);
        let (mut watcher, watcher_task) = spawn_session(&harness, &config);
        send(&mut watcher, "watcher\n").await;
        assert!(next_line(&mut watcher).await.contains("[server]: watcher joined the chat"));

        let (mut client, task) = spawn_session(&harness, &config);
        send(&mut client, "carol\n").await;
        assert!(next_line(&mut watcher).await.contains("[server]: carol joined the chat"));

        send(&mut client, "/exit\n").await;
        assert_eq!(task.await.unwrap(), SessionEnd::Exited);
        assert!(next_line(&mut watcher).await.contains("[server]: carol left the chat"));

        drop(watcher);
        assert_eq!(watcher_task.await.unwrap(), SessionEnd::Disconnected);
    }

    #[tokio::test]
    async fn session_ends_when_a_broadcast_drops_its_sink() {
        let (harness, config) = harness(false);
        let (mut stalled, task) = spawn_session_with_pipe(&harness, &config, 8);
        send(&mut stalled, "slow\n").await;
        wait_registered(&harness, "slow").await;

        // The client never reads, so this line cannot fit in the pipe.
        let report = harness
            .broadcaster
            .announce("a line longer than eight bytes")
            .await;
        assert_eq!(report.dropped, vec!["slow".to_string()]);

        let end = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("session kept running after its sink was dropped")
            .unwrap();
        assert_eq!(end, SessionEnd::Dropped);
        assert!(harness.broadcaster.registry().is_empty().await);
        drop(stalled);
    }

    #[tokio::test]
    async fn invalid_utf8_ends_session_and_unregisters() {
        let (harness, config) = harness(false);
        let (mut client, task) = spawn_session(&harness, &config);

        send(&mut client, "alice\n").await;
        wait_registered(&harness, "alice").await;
        client
            .get_mut()
            .write_all(&[0xff, 0xfe, b'\n'])
            .await
            .unwrap();

        assert_eq!(task.await.unwrap(), SessionEnd::Failed);
        assert!(!harness.broadcaster.registry().contains("alice").await);
        assert_eq!(next_line(&mut client).await, "");
    }

    #[tokio::test]
    async fn unterminated_flood_is_discarded_not_buffered() {
        let (harness, config) = harness(false);
        let (mut client, task) = spawn_session(&harness, &config);

        send(&mut client, "bob\n").await;
        let flood = vec![b'y'; 1024 * 1024];
        for _ in 0..8 {
            client.get_mut().write_all(&flood).await.unwrap();
        }
        send(&mut client, "\nshort\n").await;

        let line = next_line(&mut client).await;
        assert!(line.ends_with("[bob]: short\n"), "got {line}");
        let transcript = std::fs::read_to_string(&harness.transcript).unwrap();
        assert_eq!(transcript.lines().count(), 1);

        drop(client);
        assert_eq!(task.await.unwrap(), SessionEnd::Disconnected);
    }

    #[tokio::test]
    async fn overlong_username_is_rejected() {
        let (harness, config) = harness(false);
        let (mut client, task) = spawn_session(&harness, &config);

        send(&mut client, &format!("{}\n", "m".repeat(4096))).await;

        assert_eq!(task.await.unwrap(), SessionEnd::Rejected);
        assert!(harness.broadcaster.registry().is_empty().await);
    }
}
