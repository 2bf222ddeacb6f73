//! Application layer errors

use thiserror::Error;

/// Errors raised by the console core
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Argument index {index} out of range for {len} argument(s)")]
    OutOfRange { index: usize, len: usize },

    #[error("I/O module error: {0}")]
    Io(#[from] IoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by I/O modules and connections
#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O module not started")]
    NotStarted,

    #[error("I/O module closed")]
    Closed,

    #[error("Console is gone")]
    ConsoleDropped,

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by a message listener
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("Listener failed: {0}")]
    Failed(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Reply failed: {0}")]
    Io(#[from] IoError),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<ConsoleError> for CommandError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::OutOfRange { .. } | ConsoleError::InvalidArgument(_) => CommandError::InvalidArgs(err.to_string()),
            other => CommandError::ExecutionFailed(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
