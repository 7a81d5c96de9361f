//! Axum router wiring.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops};

pub fn build_router(state: AppState, metrics_path: &str) -> Router {
    Router::new()
        .route(metrics_path, get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
