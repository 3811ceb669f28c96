//! Error types for permflow

use thiserror::Error;

/// Result type alias for permflow operations
pub type PermResult<T> = Result<T, PermError>;

/// Main error type for permflow
#[derive(Error, Debug, Clone)]
pub enum PermError {
    /// Denial store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Host capability errors (grant checker, prompt requester)
    #[error("Capability error: {capability}: {message}")]
    Capability {
        capability: String,
        message: String,
    },

    /// Settings navigation errors
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl PermError {
    /// Create a new store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a new capability error
    pub fn capability(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Capability {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Create a new navigation error
    pub fn navigation(message: impl Into<String>) -> Self {
        Self::Navigation(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<std::io::Error> for PermError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for PermError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<anyhow::Error> for PermError {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error.to_string())
    }
}
