//! Limits that keep upstream responses from leaking into memory or logs.

/// Maximum number of body bytes kept in [`HttpError::HttpStatus`](crate::HttpError::HttpStatus).
///
/// Provider error bodies are small JSON documents; anything larger is
/// truncated to this many bytes before being parsed for a message.
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;
