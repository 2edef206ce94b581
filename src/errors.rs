// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FanrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// `start` was called while a previous run is still in flight.
    #[error("Invalid operation: a run is already in progress")]
    AlreadyRunning,

    #[error("Cannot use disposed {0}")]
    Disposed(&'static str),

    #[error("Failed to launch process #{index}: {source}")]
    LaunchError {
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The drain worker died while applying a line to the formatter.
    #[error("Output drain failed: {0}")]
    DrainFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FanrunError>;
