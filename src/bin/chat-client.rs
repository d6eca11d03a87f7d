//! RAX Chat Client - Entry Point
//!
//! Connects to the chat server, registers a username and relays terminal
//! input and output.

use log::info;
use std::process::ExitCode;
use tokio::io::BufReader;
use tokio::net::TcpStream;

use rax_chat::ChatServerError;
use rax_chat::console::{prompt_username, run_client};
use rax_chat::error::handle_error;
use rax_chat::server::ClientConfig;
use rax_chat::transcript::LogAppender;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ChatServerError> {
    let config = ClientConfig::load()?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    let username = match prompt_username(&mut stdin, &mut stdout, "Username: ").await? {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ChatServerError::Config("A username is required".into())),
    };

    let socket_str = config.server_socket();
    let stream = TcpStream::connect(&socket_str)
        .await
        .map_err(|e| ChatServerError::Connect(socket_str.clone(), e))?;
    info!("Connected to {}", socket_str);

    let (read_half, write_half) = stream.into_split();
    let exit = run_client(
        BufReader::new(read_half),
        write_half,
        &mut stdin,
        stdout,
        &username,
        Some(LogAppender::new(&config.log_file)),
    )
    .await?;

    info!("Client finished: {:?}", exit);
    Ok(())
}
