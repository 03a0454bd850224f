use sheets_http::HttpError;
use thiserror::Error;

/// Access token acquisition failures. Messages never contain key material
/// or token values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenError {
    /// The token endpoint rejected the exchange or answered with an
    /// undecodable body. Built by [`format_http_error`]; excludes response bodies.
    #[error("{0}")]
    Http(String),

    /// The token endpoint did not answer within the client timeout.
    #[error("{0}")]
    Timeout(String),

    /// The token endpoint could not be reached.
    #[error("{0}")]
    Transport(String),

    /// The token endpoint answered 2xx with an unusable body.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// The JWT assertion could not be signed.
    #[error("failed to sign token assertion: {0}")]
    Signing(String),

    #[error("token source config error: {0}")]
    ConfigError(String),
}

impl TokenError {
    /// Classify a failed token endpoint call.
    #[must_use]
    pub fn from_http(e: &HttpError, context: &str) -> Self {
        let message = format_http_error(e, context);
        match e {
            HttpError::Timeout(_) => Self::Timeout(message),
            HttpError::Transport(_)
            | HttpError::Tls(_)
            | HttpError::Overloaded
            | HttpError::ServiceClosed => Self::Transport(message),
            _ => Self::Http(message),
        }
    }
}

/// Render an [`HttpError`] for logs and error messages, prefixed with the
/// caller context. Upstream bodies are omitted.
#[must_use]
pub fn format_http_error(e: &HttpError, prefix: &str) -> String {
    match e {
        HttpError::HttpStatus { status, .. } => format!("{prefix} HTTP {status}"),
        HttpError::Json(err) => format!("{prefix} JSON parse failed: {err}"),
        HttpError::Timeout(duration) => format!("{prefix} request timed out after {duration:?}"),
        HttpError::Transport(err) => format!("{prefix} transport error: {err}"),
        HttpError::Tls(err) => format!("{prefix} TLS error: {err}"),
        HttpError::BodyTooLarge { limit, actual } => {
            format!("{prefix} response too large: limit {limit} bytes, got {actual} bytes")
        }
        HttpError::Overloaded => format!("{prefix} request rejected: client overloaded"),
        HttpError::ServiceClosed => format!("{prefix} client unavailable"),
        HttpError::InvalidUri { url, reason, .. } => {
            format!("{prefix} invalid URL '{url}': {reason}")
        }
        HttpError::InvalidScheme { scheme, reason } => {
            format!("{prefix} invalid scheme '{scheme}': {reason}")
        }
        HttpError::FormEncode(err) => format!("{prefix} form encode error: {err}"),
        // Header and request-build errors can echo header values such as the bearer token.
        _ => format!("{prefix} request failed"),
    }
}
