//! Configuration management for the chat server and client
//!
//! Values come from built-in defaults, an optional `chat.toml` file and
//! `CHAT_*` environment variables, in that order. The port can additionally
//! be pinned by a one-line settings file shared by server and client.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ChatServerError;

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    /// IP address the listener binds to
    pub bind_address: String,

    /// Listening port, overridden by `settings_file` when that file exists
    /// Environment: CHAT_PORT
    pub port: u16,

    /// One-line file holding the port number
    pub settings_file: String,

    /// Directory holding the transcript (created on demand)
    pub log_dir: String,

    /// Transcript file name inside `log_dir`
    pub log_file: String,

    /// Maximum concurrently served connections
    pub max_clients: usize,

    /// Upper bound for delivering one line to one client
    pub sink_timeout_ms: u64,

    /// Inbound lines longer than this are dropped
    pub max_line_length: usize,

    /// Broadcast join/leave notices from the server
    pub announce_presence: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            settings_file: "settings.txt".to_string(),
            log_dir: "log".to_string(),
            log_file: "file.log".to_string(),
            max_clients: 100,
            sink_timeout_ms: 5000,
            max_line_length: 4096,
            announce_presence: false,
        }
    }
}

impl ChatConfig {
    /// Load configuration from chat.toml with environment overrides
    pub fn load() -> Result<Self, ChatServerError> {
        let settings = Config::builder()
            .add_source(File::with_name("chat").required(false))
            .add_source(Environment::with_prefix("CHAT").try_parsing(true))
            .build()?;

        let mut config: ChatConfig = settings.try_deserialize()?;

        let settings_file = Path::new(&config.settings_file);
        if settings_file.exists() {
            config.port = read_port_from_settings(settings_file)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ChatServerError> {
        if self.port == 0 {
            return Err(ChatServerError::Config("Port cannot be 0".into()));
        }

        if self.log_dir.is_empty() || self.log_file.is_empty() {
            return Err(ChatServerError::Config(
                "log_dir and log_file cannot be empty".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(ChatServerError::Config(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.sink_timeout_ms == 0 {
            return Err(ChatServerError::Config(
                "sink_timeout_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Full path of the transcript file
    pub fn transcript_path(&self) -> PathBuf {
        PathBuf::from(&self.log_dir).join(&self.log_file)
    }

    /// Get sink timeout as Duration
    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_ms)
    }
}

/// Terminal client configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub settings_file: String,
    /// Local copy of every line received from the server
    pub log_file: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            settings_file: "settings.txt".to_string(),
            log_file: "client.log".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from chat-client.toml with environment overrides
    pub fn load() -> Result<Self, ChatServerError> {
        let settings = Config::builder()
            .add_source(File::with_name("chat-client").required(false))
            .add_source(Environment::with_prefix("CHAT_CLIENT").try_parsing(true))
            .build()?;

        let mut config: ClientConfig = settings.try_deserialize()?;

        let settings_file = Path::new(&config.settings_file);
        if settings_file.exists() {
            config.port = read_port_from_settings(settings_file)?;
        }

        Ok(config)
    }

    pub fn server_socket(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads a port number from a one-line settings file.
///
/// Surrounding whitespace and the trailing newline are ignored.
pub fn read_port_from_settings(path: impl AsRef<Path>) -> Result<u16, ChatServerError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    content.trim().parse::<u16>().map_err(|e| {
        ChatServerError::Config(format!(
            "Invalid port in {}: {:?} ({})",
            path.display(),
            content.trim(),
            e
        ))
    })
}
