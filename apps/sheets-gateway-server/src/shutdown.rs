//! OS signal handling for graceful shutdown.

/// Resolves on Ctrl-C, or SIGTERM on Unix.
///
/// # Errors
/// When a signal handler cannot be installed.
pub async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = term.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Signal waiter that never fails: falls back to Ctrl-C alone when the
/// primary waiter cannot be installed.
pub async fn shutdown_signal() {
    match wait_for_shutdown().await {
        Ok(()) => tracing::info!("shutdown: signal received"),
        Err(e) => {
            tracing::warn!(error = %e, "shutdown: primary waiter failed; falling back to ctrl_c()");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "shutdown: ctrl_c waiter failed; running until killed");
                std::future::pending::<()>().await;
            }
        }
    }
}
