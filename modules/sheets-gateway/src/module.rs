//! Sheets gateway module definition.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use sheets_auth::{ServiceAccount, ServiceAccountTokenSource};
use sheets_http::{HttpClientBuilder, HttpClientConfig, TransportSecurity};
use tracing::info;

use crate::api::rest::routes;
use crate::config::SheetsConfig;
use crate::domain::address::ColumnLetter;
use crate::domain::ports::SpreadsheetProvider;
use crate::domain::service::SheetsService;
use crate::infra::google::GoogleSheetsProvider;

/// The wired gateway: credential, token source, provider and service.
///
/// Built once at startup; every piece is immutable afterwards.
pub struct SheetsGateway {
    service: Arc<SheetsService>,
}

impl SheetsGateway {
    /// Load the service account from the configured environment variable and
    /// wire the Google provider.
    ///
    /// # Errors
    /// Missing or malformed credential, invalid configuration, or an HTTP
    /// client that cannot be built.
    pub fn init(cfg: &SheetsConfig) -> anyhow::Result<Self> {
        info!(credentials_env = %cfg.credentials_env, "initializing sheets gateway");

        let mut account = ServiceAccount::from_env(&cfg.credentials_env)
            .context("failed to load service account credential")?;
        if let Some(token_uri) = cfg.token_uri.as_deref().filter(|u| !u.trim().is_empty()) {
            account = account.with_token_uri(token_uri);
        }
        info!(
            client_email = account.client_email(),
            project_id = account.project_id().unwrap_or("-"),
            "service account loaded"
        );

        let transport = if cfg.allow_insecure_http {
            TransportSecurity::AllowInsecureHttp
        } else {
            TransportSecurity::TlsOnly
        };
        let request_timeout = Duration::from_secs(cfg.request_timeout_secs);

        let tokens = ServiceAccountTokenSource::with_http_config(
            account,
            &cfg.scopes,
            HttpClientConfig {
                request_timeout,
                transport,
                ..HttpClientConfig::token_endpoint()
            },
        )
        .context("failed to create token source")?;

        let client = HttpClientBuilder::with_config(HttpClientConfig {
            request_timeout,
            max_body_size: cfg.max_body_bytes,
            transport,
            ..HttpClientConfig::default()
        })
        .build()
        .context("failed to build provider HTTP client")?;

        let provider = GoogleSheetsProvider::new(client, Arc::new(tokens), cfg)
            .context("invalid provider base URL")?;

        Self::with_provider(Arc::new(provider), cfg)
    }

    /// Wire the service around an existing provider.
    ///
    /// # Errors
    /// When `page_last_column` is not a column letter.
    pub fn with_provider(
        provider: Arc<dyn SpreadsheetProvider>,
        cfg: &SheetsConfig,
    ) -> anyhow::Result<Self> {
        let last_column = ColumnLetter::parse(&cfg.page_last_column)
            .map_err(|e| anyhow::anyhow!("invalid page_last_column: {e}"))?;
        Ok(Self {
            service: Arc::new(
                SheetsService::new(provider, last_column)
                    .with_cell_input(cfg.cell_value_input_option),
            ),
        })
    }

    #[must_use]
    pub fn service(&self) -> Arc<SheetsService> {
        Arc::clone(&self.service)
    }

    /// REST routes for this gateway.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        routes::router(self.service())
    }
}
