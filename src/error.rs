//! Error taxonomy for admin API calls.
//!
//! DESIGN
//! ======
//! Callers must be able to tell a connectivity failure, a rejected request
//! and an invalidated session apart without string matching, so each is its
//! own variant. Nothing in this crate retries; `retryable()` is always false.

use crate::state::storage::StorageError;

/// Network-level failure message shown to the user.
pub const CONNECTIVITY_MESSAGE: &str =
    "Network error. Please check your internet connection and API configuration.";

/// Message shown when a successful response cannot be understood.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server. Please try again.";

/// Stable error codes for logging and CLI output.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Errors produced by session and API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller-supplied input was rejected before any request was sent.
    #[error("{0}")]
    InvalidInput(String),

    /// The request could not be sent or its response could not be read.
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Connectivity { detail: String },

    /// The server answered with a non-success status or `hasError: true`.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The server no longer accepts the session token. Local logout has
    /// already happened by the time the caller sees this.
    #[error("session is no longer valid: {message}")]
    SessionInvalid { status: u16, message: String },

    /// A success response had no usable body.
    #[error("{}", INVALID_RESPONSE_MESSAGE)]
    InvalidResponse { detail: String },

    /// Reading or writing the session store failed.
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid { .. })
    }

    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    /// HTTP status attached to the error, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::SessionInvalid { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "E_INVALID_INPUT",
            Self::Connectivity { .. } => "E_CONNECTIVITY",
            Self::Rejected { .. } => "E_REJECTED",
            Self::SessionInvalid { .. } => "E_SESSION_INVALID",
            Self::InvalidResponse { .. } => "E_INVALID_RESPONSE",
            Self::Storage(_) => "E_STORAGE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
