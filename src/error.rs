//! Garden error types

use thiserror::Error;

/// A store round trip (read or write) failed.
///
/// Carries the operation that was attempted and the store's message. Never
/// retried, never swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to {operation}: {message}")]
pub struct QueryFailure {
    /// Operation name, e.g. `fetch gallery items`
    pub operation: &'static str,
    /// Underlying store message
    pub message: String,
}

impl QueryFailure {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Creation input rejected before any store call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Content is empty after trimming
    #[error("Content is required")]
    EmptyContent,

    /// Content of a URL kind is not an absolute URL
    #[error("Please enter a valid URL")]
    InvalidUrl,
}

impl ValidationFailure {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::InvalidUrl => "INVALID_URL",
        }
    }
}

/// Garden error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store round trip failed
    #[error(transparent)]
    Query(#[from] QueryFailure),

    /// Creation input rejected
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// Password gate refused
    #[error(transparent)]
    Auth(#[from] crate::auth::GateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Garden operations
pub type Result<T> = std::result::Result<T, Error>;
