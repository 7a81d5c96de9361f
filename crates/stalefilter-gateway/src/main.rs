//! stalefilter-gateway
//!
//! Scrapes `http://localhost:<upstream>/metrics` on each request to
//! `:<listen>/metrics` and answers with the same exposition minus the series
//! that have not changed for `threshold` scrapes.
//!
//! Usage: `stalefilter-gateway [OPTIONS] UPSTREAM LISTEN [UPSTREAM LISTEN ...]`

use std::process::ExitCode;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use stalefilter_gateway::{cli, server};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let (cfg, pairs) = match cli::Args::parse().into_config() {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::from(2);
        }
    };

    tracing::info!(
        pairs = pairs.len(),
        threshold = cfg.staleness.threshold,
        start = ?cfg.staleness.start,
        evict_after = ?cfg.staleness.evict_after,
        "stalefilter starting; press Ctrl+C to stop"
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        server::shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    match server::run(&cfg, &pairs, stop_rx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "stalefilter stopped");
            ExitCode::FAILURE
        }
    }
}
