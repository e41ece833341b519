//! Core error types for ticktock-core.
//!
//! Errors are grouped by how the command loop treats them: duration
//! parsing failures are recovered in place, input and terminal failures
//! end the session, notifier failures are only logged.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ticktock-core.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed duration text
    #[error("Invalid duration: {0}")]
    Duration(#[from] DurationError),

    /// Raw input or terminal-mode errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Notifier errors
    #[error("Notifier error: {0}")]
    Notify(#[from] NotifyError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The renderer could not write the display
    #[error("failed to write display: {0}")]
    Render(#[source] std::io::Error),

    /// IO errors on the output stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from parsing `HH:MM:SS` duration text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Not exactly three colon-separated fields
    #[error("expected HH:MM:SS, got {fields} field(s) in '{input}'")]
    Shape { input: String, fields: usize },

    /// A field is empty or not an unsigned integer
    #[error("{name} field '{value}' is not a number")]
    Field { name: &'static str, value: String },

    /// The total does not fit in a duration
    #[error("duration '{0}' is too large")]
    Overflow(String),
}

/// Errors from the raw input reader.
#[derive(Error, Debug)]
pub enum InputError {
    /// The accepted-key set contains a key that cannot be typed as one byte
    #[error("accepted key {0:?} is not ASCII")]
    NonAsciiKey(char),

    /// Reading a byte from the terminal failed
    #[error("failed to read from terminal: {0}")]
    Read(#[source] std::io::Error),

    /// Reading or changing the terminal mode failed
    #[error("failed to {action} terminal mode: {message}")]
    TerminalMode {
        action: &'static str,
        message: String,
    },

    /// Input reached end of file or the input task has gone away
    #[error("input closed")]
    Closed,
}

/// Errors from the expiry notifier.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Writing the terminal bell failed
    #[error("failed to ring terminal bell: {0}")]
    Bell(#[source] std::io::Error),

    /// Launching the alert command failed
    #[error("failed to run alert command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to load configuration from {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration
    #[error("Failed to parse configuration {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to render configuration as TOML
    #[error("Failed to serialize configuration: {0}")]
    SerializeFailed(String),
}

/// Result type alias for Error
pub type Result<T, E = Error> = std::result::Result<T, E>;
