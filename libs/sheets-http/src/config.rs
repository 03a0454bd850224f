use std::time::Duration;

/// Default User-Agent sent with every outbound request.
pub const DEFAULT_USER_AGENT: &str = concat!("sheets-gateway/", env!("CARGO_PKG_VERSION"));

/// Where trusted root certificates come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Mozilla roots bundled with webpki-roots.
    #[default]
    WebPki,
    /// The operating system certificate store.
    Native,
}

/// Whether plain `http://` URLs are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// Accept `http://`. Only for local mock servers.
    AllowInsecureHttp,
}

/// Settings for [`HttpClientBuilder`](crate::HttpClientBuilder).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout for a single request, including reading response headers.
    pub request_timeout: Duration,
    /// Upper bound on decompressed response bodies.
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    pub tls_roots: TlsRootConfig,
    /// Requests queued ahead of the client worker before `Overloaded` is returned.
    pub buffer_capacity: usize,
    /// Idle pooled connections are dropped after this long.
    pub pool_idle_timeout: Option<Duration>,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::default(),
            buffer_capacity: 1024,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpClientConfig {
    /// Settings for the OAuth2 token endpoint: small bodies, few connections.
    #[must_use]
    pub fn token_endpoint() -> Self {
        Self {
            max_body_size: 1024 * 1024,
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(60)),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }

    /// Settings for tests against `httpmock` servers (plain HTTP allowed).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024,
            transport: TransportSecurity::AllowInsecureHttp,
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(10)),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }
}
