use std::time::Duration;
use thiserror::Error;

/// Why a URL was rejected before any request was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    ParseError,
    MissingAuthority,
    MissingScheme,
}

/// Errors produced by [`HttpClient`](crate::HttpClient).
///
/// `send()` only fails for transport-level problems. Non-2xx statuses become
/// [`HttpError::HttpStatus`] when the body is read.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Network, connection or protocol failure.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Response body too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Upstream answered with a non-2xx status.
    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        /// First [`ERROR_BODY_PREVIEW_LIMIT`](crate::security::ERROR_BODY_PREVIEW_LIMIT)
        /// bytes of the body, lossily decoded.
        body_preview: String,
        content_type: Option<String>,
    },

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Form encoding failed: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// The request queue is full.
    #[error("Service overloaded: request queue is full")]
    Overloaded,

    /// The background worker driving the client stopped.
    #[error("Service unavailable: internal failure")]
    ServiceClosed,

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    #[error("URL scheme '{scheme}' not allowed: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}
