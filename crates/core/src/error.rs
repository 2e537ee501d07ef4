//! Core Error Types
//!
//! Error types shared by the plugin contract, the persistence surface and the
//! registry implementation. Only thiserror + serde_json, so plugin crates can
//! depend on this crate without pulling in the application stack.

use thiserror::Error;

/// Core error type for the assistant-type plugin system.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A plugin hook failed
    #[error("Plugin error: {0}")]
    Plugin(String),

    /// The persistence surface rejected a request
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// An icon could not be associated with a sub-task code
    #[error("Icon error: {0}")]
    Icon(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a plugin error
    pub fn plugin(msg: impl Into<String>) -> Self {
        Self::Plugin(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create an icon error
    pub fn icon(msg: impl Into<String>) -> Self {
        Self::Icon(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
