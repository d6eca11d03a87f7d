//! Terminal client loop
//!
//! Speaks the chat wire protocol on behalf of a user: sends the username,
//! prints every line the server relays and forwards what the user types.

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ChatServerError;
use crate::protocol::EXIT_SENTINEL;
use crate::transcript::LogAppender;

/// How the client loop ended
#[derive(Debug, PartialEq)]
pub enum ClientExit {
    /// The user typed the exit sentinel or closed their input
    Left,
    /// The server closed the connection
    ServerClosed,
}

/// Runs the client until the user leaves or the server hangs up.
///
/// Lines from the server are copied to `output` and, when `transcript` is
/// set, appended to the local transcript. A transcript failure is logged and
/// otherwise ignored.
pub async fn run_client<SR, SW, UI, O>(
    server_reader: SR,
    mut server_writer: SW,
    user_input: UI,
    mut output: O,
    username: &str,
    transcript: Option<LogAppender>,
) -> Result<ClientExit, ChatServerError>
where
    SR: AsyncBufRead + Unpin,
    SW: AsyncWrite + Unpin,
    UI: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    send_line(&mut server_writer, username).await?;
    info!("Joined as '{}'", username);

    let mut server_lines = server_reader.lines();
    let mut input_lines = user_input.lines();

    loop {
        tokio::select! {
            incoming = server_lines.next_line() => match incoming {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    send_line(&mut output, &line).await?;
                    if let Some(transcript) = &transcript {
                        if let Err(e) = transcript.append(&line).await {
                            warn!("Could not record message locally: {}", e);
                        }
                    }
                }
                Ok(None) => {
                    send_line(&mut output, "Connection closed.").await?;
                    return Ok(ClientExit::ServerClosed);
                }
                Err(e) => {
                    warn!("Error reading messages: {}", e);
                    send_line(&mut output, "Connection closed.").await?;
                    return Ok(ClientExit::ServerClosed);
                }
            },
            typed = input_lines.next_line() => match typed? {
                Some(line) if line.trim().eq_ignore_ascii_case(EXIT_SENTINEL) => {
                    return leave(&mut server_writer, &mut output).await;
                }
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => send_line(&mut server_writer, &line).await?,
                None => return leave(&mut server_writer, &mut output).await,
            },
        }
    }
}

/// Prints `prompt` and reads one line of input.
///
/// Returns `None` if the input ended before a line was read.
pub async fn prompt_username<I, O>(
    input: &mut I,
    output: &mut O,
    prompt: &str,
) -> Result<Option<String>, ChatServerError>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    output.write_all(prompt.as_bytes()).await?;
    output.flush().await?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

async fn leave<SW, O>(server_writer: &mut SW, output: &mut O) -> Result<ClientExit, ChatServerError>
where
    SW: AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
{
    // The server may already be gone; leaving still succeeds locally.
    if let Err(e) = send_line(server_writer, EXIT_SENTINEL).await {
        warn!("Could not notify server: {}", e);
    }
    send_line(output, "You left the chat.").await?;
    Ok(ClientExit::Left)
}

async fn send_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
