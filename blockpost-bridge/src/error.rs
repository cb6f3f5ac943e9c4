//! Error types for the blockpost bridge
//!
//! Errors only cross the collaborator seams (extractor, executor) and the
//! file-loading helpers. The derivation layer itself is total: every
//! calculation degrades to a documented default instead of failing.

use thiserror::Error;

use crate::shape::ShapeError;

/// Result alias used across the bridge crate
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors reported by bridge collaborators
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The editor state extractor could not produce a snapshot
    #[error("editor state extraction failed: {0}")]
    Extractor(String),

    /// A delegated executor operation failed
    #[error("bridge executor failed: {0}")]
    Executor(String),

    /// A transfer was requested without the data it needs
    #[error("transfer precondition not met: {0}")]
    Precondition(String),

    /// Input did not match the expected shape
    #[error("invalid shape: {0}")]
    InvalidShape(#[from] ShapeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
