use crate::client::{BufferedService, map_buffer_error, try_acquire_buffer_slot};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::HttpResponse;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};
use http::Request;
use http_body_util::Full;
use serde::Serialize;
use tower::Service;

#[derive(Clone, Debug)]
enum Payload {
    None,
    Json(Bytes),
    Form(Bytes),
}

impl Payload {
    fn content_type(&self) -> Option<&'static str> {
        match self {
            Payload::None => None,
            Payload::Json(_) => Some("application/json"),
            Payload::Form(_) => Some("application/x-www-form-urlencoded"),
        }
    }

    fn into_bytes(self) -> Bytes {
        match self {
            Payload::None => Bytes::new(),
            Payload::Json(b) | Payload::Form(b) => b,
        }
    }
}

/// Fluent request builder returned by [`HttpClient`](crate::HttpClient) verbs.
///
/// Header errors are deferred and surface from [`send`](Self::send) (or from
/// the next body setter), so chains never need intermediate `?`.
///
/// Query strings are not composed here; build the final URL with `url::Url`.
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    transport_security: TransportSecurity,
    method: http::Method,
    url: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    payload: Payload,
    error: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        transport_security: TransportSecurity,
        method: http::Method,
        url: String,
    ) -> Self {
        Self {
            service,
            max_body_size,
            transport_security,
            method,
            url,
            headers: Vec::new(),
            payload: Payload::None,
            error: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => self.headers.push((name, value)),
            (Err(e), _) => self.error = Some(HttpError::InvalidHeaderName(e)),
            (_, Err(e)) => self.error = Some(HttpError::InvalidHeaderValue(e)),
        }
        self
    }

    /// Set `Authorization: Bearer <token>`, marked sensitive so it stays out of logs.
    pub fn bearer_token(mut self, token: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match HeaderValue::try_from(format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.push((AUTHORIZATION, value));
            }
            Err(e) => self.error = Some(HttpError::InvalidHeaderValue(e)),
        }
        self
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// # Errors
    /// Returns a deferred header error or `HttpError::Json`.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.payload = Payload::Json(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// URL-encode `fields` as the request body.
    ///
    /// # Errors
    /// Returns a deferred header error or `HttpError::FormEncode`.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.payload = Payload::Form(Bytes::from(serde_urlencoded::to_string(fields)?));
        Ok(self)
    }

    fn validate_url(&self) -> Result<http::Uri, HttpError> {
        let invalid = |kind, reason: String| HttpError::InvalidUri {
            url: self.url.clone(),
            kind,
            reason,
        };

        let uri: http::Uri = self
            .url
            .parse()
            .map_err(|e: http::uri::InvalidUri| invalid(InvalidUriKind::ParseError, e.to_string()))?;

        if uri.authority().is_none() {
            return Err(invalid(
                InvalidUriKind::MissingAuthority,
                "missing host".to_owned(),
            ));
        }

        match (uri.scheme_str(), self.transport_security) {
            (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
            (Some("http"), TransportSecurity::TlsOnly) => Err(HttpError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "HTTPS required".to_owned(),
            }),
            (Some(scheme), _) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// are supported".to_owned(),
            }),
            (None, _) => Err(invalid(
                InvalidUriKind::MissingScheme,
                "missing scheme".to_owned(),
            )),
        }
    }

    /// Send the request.
    ///
    /// Resolves to a response for any status code; use the checked body
    /// readers on [`HttpResponse`] to turn non-2xx into errors.
    ///
    /// # Errors
    /// Returns deferred build errors, URL/scheme rejections, transport
    /// failures, `Timeout`, or `Overloaded` when the request queue is full.
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let uri = self.validate_url()?;
        let mut builder = Request::builder().method(self.method).uri(uri);

        let caller_content_type = self.headers.iter().any(|(name, _)| name == CONTENT_TYPE);
        if !caller_content_type && let Some(ct) = self.payload.content_type() {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        let request = builder.body(Full::new(self.payload.into_bytes()))?;

        try_acquire_buffer_slot(&mut self.service).await?;
        let inner = self.service.call(request).await.map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}
