//! Chat service error types

use serde::Serialize;
use thiserror::Error;

/// Chat service error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::MissingCredential, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::MalformedResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unknown, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::new(
                ApiErrorKind::Auth,
                format!("Authentication failed: {message}"),
            ),
            429 => Self::new(
                ApiErrorKind::RateLimit,
                format!("Rate limit exceeded: {message}"),
            ),
            400 | 404 | 422 => Self::new(
                ApiErrorKind::InvalidRequest,
                format!("Invalid request: {message}"),
            ),
            500..=599 => Self::new(
                ApiErrorKind::ServerError,
                format!("Server error: {message}"),
            ),
            _ => Self::unknown(format!("HTTP {status}: {message}")),
        }
    }
}

/// Error classification, used for notices and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// No bearer token configured
    MissingCredential,
    /// The 30 second budget ran out
    Timeout,
    /// Connection or transport failure
    Network,
    /// 401, 403
    Auth,
    /// 429
    RateLimit,
    /// 5xx
    ServerError,
    /// 400 and friends
    InvalidRequest,
    /// Body was not a chat completion or had no reply text
    MalformedResponse,
    Unknown,
}

impl ApiErrorKind {
    pub fn is_config(self) -> bool {
        matches!(self, Self::MissingCredential)
    }
}
