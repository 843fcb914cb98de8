//! # Shower Error Types
//!
//! All errors that can occur while resolving or loading configuration.
//! Session scheduling itself has no failure path.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the shower system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShowerError {
    /// The merged content list is empty, so there is nothing to rain.
    #[error("no emojis configured for emoji shower")]
    EmptyContent,

    /// Config text that does not deserialize.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file that could not be read.
    #[error("cannot read configuration {}: {reason}", path.display())]
    ConfigIo {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        reason: String,
    },
}

/// Result type for shower operations.
pub type ShowerResult<T> = Result<T, ShowerError>;
