//! Error types for Somnus

use thiserror::Error;

/// Main error type for Somnus operations
#[derive(Error, Debug)]
pub enum SomnusError {
    /// Snapshot storage errors (paths, directories)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// External collaborator errors that could not be absorbed
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SomnusError {
    fn from(e: serde_json::Error) -> Self {
        SomnusError::Serialization(e.to_string())
    }
}

/// Failures at the boundary with an external service (language model,
/// embeddings, web search).
///
/// These never escape the agent core; they are logged and replaced with a
/// safe default value by the caller.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty response")]
    EmptyResponse,
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for CollaboratorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CollaboratorError::Parse(e.to_string())
        } else {
            CollaboratorError::Request(e.to_string())
        }
    }
}

/// Result type alias for Somnus operations
pub type Result<T> = std::result::Result<T, SomnusError>;
