//! Layered application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the optional YAML
//! file, `APP__*` environment variables (`__` separates nested keys), then
//! command-line overrides.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context as _, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use sheets_gateway::SheetsConfig;

pub const ENV_PREFIX: &str = "APP__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub sheets: SheetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub bind_addr: String,
    /// Whole-request deadline; expiry answers 504. Must exceed
    /// `sheets.request_timeout_secs` so provider timeouts are reported first.
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
    pub cors_enabled: bool,
    /// Origins allowed when CORS is enabled; `*` allows any.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_owned(),
            request_timeout_secs: 60,
            body_limit_bytes: 1024 * 1024,
            cors_enabled: false,
            cors_allowed_origins: vec!["*".to_owned()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `sheets_gateway=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Defaults, then `path` when given, then `APP__*` environment variables.
    ///
    /// # Errors
    /// Unreadable or invalid YAML, unknown keys, or values of the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)
            .extract()
            .context("failed to load configuration")
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Apply `--port` and `-v` on top of the loaded configuration.
    ///
    /// # Errors
    /// When `--port` is given but `server.bind_addr` is not a socket address.
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, verbose: u8) -> Result<()> {
        if let Some(port) = port {
            let mut addr = self.bind_addr()?;
            addr.set_port(port);
            self.server.bind_addr = addr.to_string();
        }
        let level = match verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        };
        if let Some(level) = level {
            level.clone_into(&mut self.logging.level);
        }
        Ok(())
    }

    /// Cross-section checks that serde defaults cannot express.
    ///
    /// # Errors
    /// When the server deadline would expire before a provider request does.
    pub fn validate(&self) -> Result<()> {
        if self.server.request_timeout_secs <= self.sheets.request_timeout_secs {
            anyhow::bail!(
                "server.request_timeout_secs ({}) must be greater than sheets.request_timeout_secs ({})",
                self.server.request_timeout_secs,
                self.sheets.request_timeout_secs
            );
        }
        Ok(())
    }

    /// # Errors
    /// When `server.bind_addr` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("invalid server.bind_addr '{}'", self.server.bind_addr))
    }

    /// # Errors
    /// Serialization failure.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}
