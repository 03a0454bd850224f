use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use crate::layers::UserAgentLayer;
use crate::response::ResponseBody;
use crate::tls;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;

/// Builds an [`HttpClient`] from an [`HttpClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Per-request timeout, covering connect and response headers.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Limit on decompressed response bodies.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Accept `http://` URLs. Shorthand for `.transport(TransportSecurity::AllowInsecureHttp)`.
    #[must_use]
    pub fn allow_insecure_http(self) -> Self {
        self.transport(TransportSecurity::AllowInsecureHttp)
    }

    #[must_use]
    pub fn tls_roots(mut self, roots: TlsRootConfig) -> Self {
        self.config.tls_roots = roots;
        self
    }

    /// Requests that may wait for the worker; clamped to at least 1.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity.max(1);
        self
    }

    /// Assemble the tower stack.
    ///
    /// Request flow, outer to inner:
    /// `Buffer -> error mapping -> Timeout -> UserAgent -> Decompression -> hyper`.
    ///
    /// # Errors
    /// Returns `HttpError::Tls` when the root store cannot be loaded and
    /// `HttpError::InvalidHeaderValue` for an unusable User-Agent.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        if self.config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!("plain HTTP enabled for outbound requests; traffic is not encrypted");
        }

        let timeout = self.config.request_timeout;
        let https = build_https_connector(self.config.tls_roots, self.config.transport)?;

        let mut client_builder = Client::builder(TokioExecutor::new());
        // pool_idle_timeout has no effect without a pool timer.
        client_builder
            .pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host)
            .http2_only(false);
        if let Some(idle) = self.config.pool_idle_timeout {
            client_builder.pool_idle_timeout(idle);
        }
        let hyper_client = client_builder.build::<_, Full<Bytes>>(https);

        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(UserAgentLayer::try_new(&self.config.user_agent)?)
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .map_response(map_decompression_response)
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout))
            .boxed_clone();

        let service: BufferedService = Buffer::new(service, self.config.buffer_capacity.max(1));

        Ok(HttpClient {
            service,
            max_body_size: self.config.max_body_size,
            transport_security: self.config.transport,
        })
    }
}

fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

fn map_decompression_response<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, body.map_err(Into::into).boxed())
}

/// HTTPS connector advertising h2 and http/1.1 via ALPN.
fn build_https_connector(
    tls_roots: TlsRootConfig,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = match tls_roots {
        TlsRootConfig::WebPki => hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(tls::crypto_provider())
            .map_err(|e| HttpError::Tls(Box::new(e)))?,
        TlsRootConfig::Native => {
            let client_config =
                tls::native_roots_client_config().map_err(|e| HttpError::Tls(e.into()))?;
            hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(client_config)
        }
    };

    let connector = match transport {
        TransportSecurity::AllowInsecureHttp => {
            builder.https_or_http().enable_all_versions().build()
        }
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    };
    Ok(connector)
}
