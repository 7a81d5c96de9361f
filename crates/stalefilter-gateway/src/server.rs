//! Listener lifecycle.
//!
//! Every port pair is bound up front, so a bad port fails startup before any
//! listener serves. All servers share one shutdown signal and stop together.

use futures_util::future::try_join_all;
use tokio::net::TcpListener;
use tokio::sync::watch;

use stalefilter_core::error::{Result, StaleFilterError};

use crate::app_state::AppState;
use crate::cli::PortPair;
use crate::config::StaleFilterConfig;
use crate::router;

/// A pair whose listener is bound and ready to serve.
pub struct BoundPair {
    pub state: AppState,
    pub listener: TcpListener,
}

impl BoundPair {
    pub fn local_port(&self) -> Option<u16> {
        self.listener.local_addr().ok().map(|a| a.port())
    }
}

/// Bind one listener per pair.
pub async fn bind_all(cfg: &StaleFilterConfig, pairs: &[PortPair]) -> Result<Vec<BoundPair>> {
    let mut bound = Vec::with_capacity(pairs.len());
    for &pair in pairs {
        let addr = format!("{}:{}", cfg.listen.host, pair.listen);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| StaleFilterError::Config(format!("bind {addr} failed: {e}")))?;
        let state = AppState::new(pair, cfg)?;
        tracing::info!(
            upstream = %state.target().upstream(),
            listen = %addr,
            path = %cfg.listen.path,
            "pair ready"
        );
        bound.push(BoundPair { state, listener });
    }
    Ok(bound)
}

/// Serve every bound pair until `shutdown` flips to `true`.
pub async fn serve_all(
    bound: Vec<BoundPair>,
    metrics_path: &str,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let servers = bound.into_iter().map(|BoundPair { state, listener }| {
        let listen = state.pair().listen;
        let app = router::build_router(state, metrics_path);
        let mut stop = shutdown.clone();
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop.wait_for(|flag| *flag).await;
                })
                .await
                .map_err(|e| StaleFilterError::Internal(format!("server on port {listen} failed: {e}")))
        }
    });
    try_join_all(servers).await?;
    Ok(())
}

/// Bind then serve all pairs.
pub async fn run(
    cfg: &StaleFilterConfig,
    pairs: &[PortPair],
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let bound = bind_all(cfg, pairs).await?;
    serve_all(bound, &cfg.listen.path, shutdown).await
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, stopping all listeners");
}
