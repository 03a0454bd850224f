use crate::error::HttpError;
use crate::security::ERROR_BODY_PREVIEW_LIMIT;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// Boxed (possibly decompressed) response body.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Response returned by [`RequestBuilder::send`](crate::RequestBuilder::send).
///
/// Body readers enforce the client's `max_body_size`. The checked readers
/// (`json`, `checked_bytes`) turn non-2xx statuses into
/// [`HttpError::HttpStatus`] carrying a preview of the error body.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Read the body after checking the status.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` for non-2xx, `HttpError::BodyTooLarge`
    /// past the size limit, or `HttpError::Transport`.
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        checked_body(self.inner, self.max_body_size).await
    }

    /// Check the status and deserialize the body as JSON.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` for non-2xx and `HttpError::Json` on parse failure.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = checked_body(self.inner, self.max_body_size).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

async fn checked_body(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<Bytes, HttpError> {
    let status = response.status();
    if status.is_success() {
        return read_limited(response, max_body_size).await;
    }

    let content_type = content_type(response.headers());

    // An oversized error body must not hide the status itself.
    let preview_limit = max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
    let body_preview = match read_limited(response, preview_limit).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
        Err(e) => return Err(e),
    };

    Err(HttpError::HttpStatus {
        status,
        body_preview,
        content_type,
    })
}

/// Collect the body, failing once more than `limit` decompressed bytes arrive.
async fn read_limited(response: Response<ResponseBody>, limit: usize) -> Result<Bytes, HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut collected = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let actual = collected.len() + chunk.len();
            if actual > limit {
                return Err(HttpError::BodyTooLarge { limit, actual });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}
