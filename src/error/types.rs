//! Error types
//!
//! Defines domain-specific error types for each module of the chat server.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Client registry errors
#[derive(Debug)]
pub enum RegistryError {
    EmptyUsername,
    UsernameTaken(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::EmptyUsername => write!(f, "Username must not be empty"),
            RegistryError::UsernameTaken(u) => write!(f, "Username already taken: {}", u),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Transcript module errors
#[derive(Debug)]
pub enum TranscriptError {
    CreateDir(PathBuf, io::Error),
    Write(PathBuf, io::Error),
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::CreateDir(p, e) => {
                write!(f, "Failed to create log directory {}: {}", p.display(), e)
            }
            TranscriptError::Write(p, e) => {
                write!(f, "Failed to append to {}: {}", p.display(), e)
            }
        }
    }
}

impl std::error::Error for TranscriptError {}

/// Errors raised while delivering a line to one connected client
#[derive(Debug)]
pub enum SinkError {
    Closed,
    Timeout(Duration),
    Io(io::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Closed => write!(f, "Sink already closed"),
            SinkError::Timeout(d) => write!(f, "Delivery timed out after {:?}", d),
            SinkError::Io(e) => write!(f, "Delivery failed: {}", e),
        }
    }
}

impl std::error::Error for SinkError {}

impl From<io::Error> for SinkError {
    fn from(error: io::Error) -> Self {
        SinkError::Io(error)
    }
}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Config(String),
    Bind(String, io::Error),
    Connect(String, io::Error),
    Registry(RegistryError),
    Transcript(TranscriptError),
    Sink(SinkError),
    IoError(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::Bind(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
            ChatServerError::Connect(addr, e) => write!(f, "Failed to connect to {}: {}", addr, e),
            ChatServerError::Registry(e) => write!(f, "Registry error: {}", e),
            ChatServerError::Transcript(e) => write!(f, "Transcript error: {}", e),
            ChatServerError::Sink(e) => write!(f, "Sink error: {}", e),
            ChatServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

impl From<RegistryError> for ChatServerError {
    fn from(error: RegistryError) -> Self {
        ChatServerError::Registry(error)
    }
}

impl From<TranscriptError> for ChatServerError {
    fn from(error: TranscriptError) -> Self {
        ChatServerError::Transcript(error)
    }
}

impl From<SinkError> for ChatServerError {
    fn from(error: SinkError) -> Self {
        ChatServerError::Sink(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::IoError(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error.to_string())
    }
}
