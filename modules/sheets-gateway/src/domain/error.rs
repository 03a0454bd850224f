//! Domain errors for the sheets gateway.

use thiserror::Error;

/// Classification of a provider-side rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    InvalidRequest,
    Unauthenticated,
    PermissionDenied,
    NotFound,
    RateLimited,
    /// 5xx and anything else unexpected.
    Failed,
}

impl UpstreamKind {
    /// Classify a provider HTTP status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Unauthenticated,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            _ => Self::Failed,
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed path, query or body input. Raised before any provider call.
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Worksheet '{title}' not found")]
    WorksheetNotFound { title: String },

    /// No access token could be obtained.
    #[error("authentication with the provider failed: {0}")]
    Auth(String),

    /// The provider answered with an error status; `message` is its own text.
    #[error("{message}")]
    Upstream { kind: UpstreamKind, message: String },

    #[error("provider request timed out: {0}")]
    Timeout(String),

    /// The provider could not be reached.
    #[error("provider unreachable: {0}")]
    Transport(String),

    /// The provider answered 2xx with a body we could not decode.
    #[error("unexpected provider response: {0}")]
    MalformedResponse(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn upstream(kind: UpstreamKind, message: impl Into<String>) -> Self {
        Self::Upstream {
            kind,
            message: message.into(),
        }
    }
}
