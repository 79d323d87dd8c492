//! Error types for Azure Resource Manager calls

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    /// Transport-level failure talking to ARM or the token endpoint
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// ARM answered with a non-success status
    #[error("StatusCode={status} Code=\"{code}\" Message=\"{message}\"")]
    ApiError {
        status: u16,
        code: String,
        message: String,
    },

    /// A long-running operation reached a terminal state other than `Succeeded`
    #[error("long-running operation finished with status {status}: {message}")]
    OperationFailed { status: String, message: String },

    #[error("timed out after {0:?} waiting for long-running operation")]
    Timeout(Duration),

    #[error("authentication failed: {0}")]
    AuthError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AzureError {
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Shorthand for the 404 ARM returns when a resource does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::api(404, "ResourceNotFound", message)
    }

    /// Whether the error means the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }
}

/// Free-function form of [`AzureError::is_not_found`].
pub fn resource_not_found(err: &AzureError) -> bool {
    err.is_not_found()
}
