//! Client management system
//!
//! Handles client connections, the shared registry, outbound sinks and the
//! session lifecycle.

pub mod handler;
pub mod registry;
pub mod results;
pub mod session;
pub mod sink;
pub mod state;

pub use handler::handle_client;
pub use registry::ClientRegistry;
pub use results::SessionEnd;
pub use session::run_session;
pub use sink::ClientSink;
pub use state::Client;
