//! Error types for the user API client.
//!
//! # Design
//! Three kinds matter to callers. `InvalidArgument` is a programming error
//! caught before any request leaves the process. `ConnectionFailed` means the
//! transport never got an HTTP response. `RequestFailed` means the platform
//! answered with a non-2xx status; the decoded platform error (when the body
//! carries one) and the raw body are both kept for debugging.

use serde::Deserialize;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `UserApi` and `UserClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An argument failed client-side validation. No request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport could not complete the exchange (DNS, connect, TLS,
    /// timeout, proxy).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The platform returned a non-2xx status.
    #[error("request failed with HTTP {status}: {body}")]
    RequestFailed {
        status: u16,
        error: Option<ServerError>,
        body: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of a `RequestFailed`, `None` for every other kind.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Platform error code of a `RequestFailed`, when the body carried one.
    pub fn server_code(&self) -> Option<i64> {
        match self {
            ApiError::RequestFailed {
                error: Some(error), ..
            } => Some(error.code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidArgument(msg.into())
    }
}

/// Error object the platform embeds in failed responses:
/// `{"error": {"code": 899002, "message": "user not exist"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ServerError,
}

impl ServerError {
    /// Decode the platform error envelope. Returns `None` for bodies that are
    /// empty, not JSON, or shaped differently.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }
}
