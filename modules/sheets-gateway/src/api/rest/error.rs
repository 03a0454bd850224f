//! REST error mapping for the sheets gateway.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use sheets_errors::Problem;

use crate::domain::error::{DomainError, UpstreamKind};
use crate::errors::ErrorCode;

/// Per-request id set (or accepted from the caller) by the server.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The request id, reported as the Problem `trace_id`.
#[must_use]
pub fn request_trace_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Request path and id, stamped onto every Problem a handler returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemContext {
    pub instance: String,
    pub trace_id: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for ProblemContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            instance: parts.uri.path().to_owned(),
            trace_id: request_trace_id(&parts.headers),
        })
    }
}

/// Map a domain error to an RFC 9457 Problem. This is the only place REST
/// statuses are chosen for domain failures.
#[must_use]
pub fn domain_error_to_problem(
    e: &DomainError,
    instance: &str,
    trace_id: Option<String>,
) -> Problem {
    let (code, detail) = match e {
        DomainError::Validation { field, message } => (validation_code(field), message.clone()),
        DomainError::WorksheetNotFound { .. } => (ErrorCode::WorksheetNotFound, e.to_string()),
        DomainError::Auth(msg) => {
            tracing::warn!(error = %msg, "provider authentication failed");
            (
                ErrorCode::AuthFailed,
                format!("Could not authenticate with the spreadsheet provider: {msg}"),
            )
        }
        DomainError::Upstream { kind, message } => (upstream_code(*kind), message.clone()),
        DomainError::Timeout(_) => (
            ErrorCode::ProviderTimeout,
            "The spreadsheet provider did not respond in time".to_owned(),
        ),
        DomainError::Transport(_) => (
            ErrorCode::ProviderUnavailable,
            "The spreadsheet provider could not be reached".to_owned(),
        ),
        DomainError::MalformedResponse(msg) => {
            tracing::error!(error = %msg, "malformed provider response");
            (
                ErrorCode::MalformedProviderResponse,
                "The spreadsheet provider returned an unexpected response".to_owned(),
            )
        }
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error");
            (
                ErrorCode::Internal,
                "An internal error occurred".to_owned(),
            )
        }
    };

    code.with_context(detail, instance, trace_id)
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "", None)
    }
}

fn validation_code(field: &str) -> ErrorCode {
    match field {
        "cell_address" => ErrorCode::InvalidCellAddress,
        "row_number" => ErrorCode::InvalidRowNumber,
        "column_letter" => ErrorCode::InvalidColumnLetter,
        "start_row" | "end_row" => ErrorCode::InvalidPageBounds,
        "values" => ErrorCode::EmptyValues,
        _ => ErrorCode::InvalidRequest,
    }
}

fn upstream_code(kind: UpstreamKind) -> ErrorCode {
    match kind {
        UpstreamKind::InvalidRequest => ErrorCode::ProviderInvalidRequest,
        UpstreamKind::Unauthenticated => ErrorCode::ProviderUnauthenticated,
        UpstreamKind::PermissionDenied => ErrorCode::PermissionDenied,
        UpstreamKind::NotFound => ErrorCode::NotFound,
        UpstreamKind::RateLimited => ErrorCode::RateLimited,
        UpstreamKind::Failed => ErrorCode::ProviderError,
    }
}

/// Malformed or missing JSON body.
#[must_use]
pub fn json_rejection_to_problem(rejection: &JsonRejection, ctx: &ProblemContext) -> Problem {
    ErrorCode::InvalidRequest.with_context(
        rejection.body_text(),
        &ctx.instance,
        ctx.trace_id.clone(),
    )
}

/// Non-integer page bounds.
#[must_use]
pub fn query_rejection_to_problem(rejection: &QueryRejection, ctx: &ProblemContext) -> Problem {
    ErrorCode::InvalidPageBounds.with_context(
        format!(
            "start_row and end_row must be positive integers: {}",
            rejection.body_text()
        ),
        &ctx.instance,
        ctx.trace_id.clone(),
    )
}
