//! RAX Chat Server - Entry Point
//!
//! Relays every line a registered user sends to all connected users and keeps
//! a timestamped transcript.

use log::info;
use std::process::ExitCode;

use rax_chat::error::handle_error;
use rax_chat::server::{ChatConfig, Server};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching chat server...");

    let config = match ChatConfig::load() {
        Ok(config) => config,
        Err(e) => {
            handle_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            handle_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let handle = server.start();

    if let Err(e) = tokio::signal::ctrl_c().await {
        handle_error(&e.into());
    }

    info!("Shutdown requested");
    match handle.stop().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e);
            ExitCode::FAILURE
        }
    }
}
