use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use crate::config::{LogFormat, LoggingConfig};

/// `RUST_LOG` wins over the configured level when set.
fn build_filter(cfg: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&cfg.level).map_err(|e| anyhow!("invalid logging.level '{}': {e}", cfg.level))
}

/// Install the global subscriber. Events go to stderr so stdout stays clean
/// for `--print-config` and `check`.
///
/// # Errors
/// Invalid filter directive, or a subscriber was already installed.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = build_filter(cfg)?;
    let registry = tracing_subscriber::registry().with(filter);
    let result = match cfg.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
