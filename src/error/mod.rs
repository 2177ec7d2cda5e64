//! # Error Module
//!
//! Error types for the photo organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Distinguishable kinds** - unreadable metadata, failed moves and
//!   filesystem problems are separate variants

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Could not read metadata from {path}: {reason}")]
    MetadataUnreadable { path: PathBuf, reason: String },

    #[error("Failed to move {from} to {to}: {reason}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    #[error("Filesystem error at {path}: {source}")]
    FileSystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not set up logging: {0}")]
    Logging(String),
}

impl OrganizeError {
    /// Wrap an I/O error together with the path it happened on
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OrganizeError::FileSystemError {
            path: path.into(),
            source,
        }
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizeError>;
