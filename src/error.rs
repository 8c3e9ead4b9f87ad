//! Error types
//!
//! Generation failures and configuration I/O failures.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a level from being generated
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("invalid generation config: {0}")]
    InvalidConfig(String),

    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("growth did not reach the fill target within {steps} steps")]
    GenerationTimedOut { steps: u64 },

    #[error("generation was cancelled")]
    Cancelled,
}

/// Failures while reading or writing RON config files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
