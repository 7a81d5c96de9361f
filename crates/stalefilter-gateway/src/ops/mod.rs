//! HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `<listen.path>` (default `/metrics`) : filtered Prometheus text

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::error::HttpError;

pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.target().scrape().await {
        Ok(body) => (StatusCode::OK, [(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body).into_response(),
        Err(e) => HttpError::from(e).into_response(),
    }
}
