// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The base path itself is unusable, so nothing at all could be watched.
    #[error("Watch root does not exist or is not a directory: {0:?}")]
    RootNotFound(PathBuf),

    #[error("Invalid watch pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The OS refused to hand out more watch handles (inotify limits etc).
    #[error("Out of filesystem watch resources while watching {path:?}: {reason}")]
    ResourceExhausted { path: PathBuf, reason: String },

    #[error("Failed to watch {path:?}: {source}")]
    WatchFailed {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchError>;
