pub mod broadcast;
pub mod client;
pub mod console;
pub mod error;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod transcript;

pub use error::ChatServerError;
pub use server::{ChatConfig, Server, ServerHandle};

/// Binds and starts a server in one call.
pub async fn start(config: ChatConfig) -> Result<ServerHandle, ChatServerError> {
    Ok(Server::new(config).await?.start())
}
