//! `OAuth2` JWT-bearer access tokens for a service account (RFC 7523).
//!
//! Tokens are fetched on first use and cached behind an `ArcSwapOption`, so
//! the hot path is a lock-free load. Refresh happens [`REFRESH_MARGIN`]
//! before expiry and is single-flight: concurrent callers wait on one
//! exchange instead of starting their own.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Header};
use serde::{Deserialize, Serialize};
use sheets_http::{HttpClient, HttpClientBuilder, HttpClientConfig};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::credentials::ServiceAccount;
use crate::error::{TokenError, format_http_error};
use crate::secret::SecretString;

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion; the provider caps tokens at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are replaced this long before they expire.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 3600;

const HTTP_CONTEXT: &str = "token exchange";

/// Something that can hand out bearer tokens.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// # Errors
    /// Returns `TokenError` when no valid token can be obtained.
    async fn access_token(&self) -> Result<SecretString, TokenError>;

    /// Forget any cached token, e.g. after the provider rejected it.
    fn invalidate(&self) {}
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

struct CachedToken {
    value: SecretString,
    refresh_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

/// Exchanges signed assertions for access tokens and caches the result.
pub struct ServiceAccountTokenSource {
    account: ServiceAccount,
    scope: String,
    client: HttpClient,
    cached: ArcSwapOption<CachedToken>,
    refresh: Mutex<()>,
}

impl fmt::Debug for ServiceAccountTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountTokenSource")
            .field("client_email", &self.account.client_email())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountTokenSource {
    /// Uses [`HttpClientConfig::token_endpoint`] for the exchange client.
    ///
    /// # Errors
    /// `ConfigError` when `scopes` is empty or the HTTP client cannot be built.
    pub fn new(account: ServiceAccount, scopes: &[String]) -> Result<Self, TokenError> {
        Self::with_http_config(account, scopes, HttpClientConfig::token_endpoint())
    }

    /// # Errors
    /// `ConfigError` when `scopes` is empty or the HTTP client cannot be built.
    pub fn with_http_config(
        account: ServiceAccount,
        scopes: &[String],
        http_config: HttpClientConfig,
    ) -> Result<Self, TokenError> {
        if scopes.iter().all(|s| s.trim().is_empty()) {
            return Err(TokenError::ConfigError("at least one scope is required".into()));
        }
        let client = HttpClientBuilder::with_config(http_config)
            .build()
            .map_err(|e| TokenError::ConfigError(format_http_error(&e, "token client")))?;

        Ok(Self {
            account,
            scope: scopes
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            client,
            cached: ArcSwapOption::empty(),
            refresh: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn account(&self) -> &ServiceAccount {
        &self.account
    }

    /// Current token, fetching a new one when the cache is empty or stale.
    ///
    /// # Errors
    /// Returns `TokenError` when the exchange fails.
    pub async fn get(&self) -> Result<SecretString, TokenError> {
        if let Some(token) = self.cached.load_full()
            && token.is_fresh()
        {
            return Ok(token.value.clone());
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(token) = self.cached.load_full()
            && token.is_fresh()
        {
            return Ok(token.value.clone());
        }

        let token = self.fetch().await?;
        let value = token.value.clone();
        self.cached.store(Some(Arc::new(token)));
        Ok(value)
    }

    /// Drop the cached token so the next [`get`](Self::get) fetches a new one.
    pub fn invalidate(&self) {
        self.cached.store(None);
    }

    fn assertion(&self) -> Result<String, TokenError> {
        let iat = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            iss: self.account.client_email(),
            scope: &self.scope,
            aud: self.account.token_uri(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.account.private_key_id().map(str::to_owned);

        jsonwebtoken::encode(&header, &claims, self.account.signing_key())
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    async fn fetch(&self) -> Result<CachedToken, TokenError> {
        let assertion = zeroize::Zeroizing::new(self.assertion()?);
        let started = Instant::now();

        let response: TokenResponse = self
            .client
            .post(self.account.token_uri())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .map_err(|e| TokenError::from_http(&e, HTTP_CONTEXT))?
            .send()
            .await
            .map_err(|e| TokenError::from_http(&e, HTTP_CONTEXT))?
            .json()
            .await
            .map_err(|e| TokenError::from_http(&e, HTTP_CONTEXT))?;

        if response.access_token.is_empty() {
            return Err(TokenError::InvalidResponse("empty access_token".into()));
        }
        if let Some(tt) = response.token_type.as_deref()
            && !tt.eq_ignore_ascii_case("bearer")
        {
            return Err(TokenError::InvalidResponse(format!(
                "unsupported token type '{tt}'"
            )));
        }

        let lifetime = Duration::from_secs(response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN));
        tracing::debug!(
            client_email = self.account.client_email(),
            expires_in_secs = lifetime.as_secs(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "obtained access token"
        );

        Ok(CachedToken {
            value: SecretString::new(response.access_token),
            refresh_at: started + lifetime.saturating_sub(REFRESH_MARGIN),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<SecretString, TokenError> {
        self.get().await
    }

    fn invalidate(&self) {
        ServiceAccountTokenSource::invalidate(self);
    }
}

/// Fixed token, for local runs against mock providers and for tests.
#[derive(Clone, Debug)]
pub struct StaticTokenProvider(SecretString);

impl StaticTokenProvider {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token))
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<SecretString, TokenError> {
        Ok(self.0.clone())
    }
}
