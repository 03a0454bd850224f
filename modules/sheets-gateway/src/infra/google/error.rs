//! Translation of outbound HTTP failures into domain errors.

use sheets_auth::{TokenError, format_http_error};
use sheets_http::HttpError;

use super::dto::ErrorEnvelope;
use crate::domain::error::{DomainError, UpstreamKind};

/// Map a failed provider call. Status errors keep the provider's own message
/// when the body carries one.
#[must_use]
pub fn map_http_error(err: &HttpError, context: &str) -> DomainError {
    match err {
        HttpError::HttpStatus {
            status,
            body_preview,
            ..
        } => {
            let kind = UpstreamKind::from_status(status.as_u16());
            let message = provider_message(body_preview)
                .unwrap_or_else(|| format!("{context} failed with HTTP {status}"));
            tracing::warn!(status = status.as_u16(), %message, "{context} rejected by provider");
            DomainError::upstream(kind, message)
        }
        HttpError::Timeout(_) => {
            tracing::warn!("{context} timed out");
            DomainError::Timeout(format_http_error(err, context))
        }
        HttpError::Transport(_)
        | HttpError::Tls(_)
        | HttpError::Overloaded
        | HttpError::ServiceClosed
        | HttpError::BodyTooLarge { .. } => {
            let message = format_http_error(err, context);
            tracing::warn!(%message, "provider unreachable");
            DomainError::Transport(message)
        }
        HttpError::Json(_) => {
            let message = format_http_error(err, context);
            tracing::error!(%message, "undecodable provider response");
            DomainError::MalformedResponse(message)
        }
        _ => {
            let message = format_http_error(err, context);
            tracing::error!(%message, "provider request could not be built");
            DomainError::Internal(message)
        }
    }
}

/// An access token could not be obtained. An unreachable or slow token
/// endpoint is reported like an unreachable or slow provider.
#[must_use]
pub fn map_token_error(err: &TokenError) -> DomainError {
    tracing::warn!(error = %err, "access token unavailable");
    match err {
        TokenError::Timeout(message) => DomainError::Timeout(message.clone()),
        TokenError::Transport(message) => DomainError::Transport(message.clone()),
        _ => DomainError::Auth(err.to_string()),
    }
}

fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()?
        .error
        .message
        .filter(|m| !m.trim().is_empty())
}
