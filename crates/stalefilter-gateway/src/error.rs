//! HTTP mapping for scrape failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stalefilter_core::error::StaleFilterError;

/// A `StaleFilterError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct HttpError(pub StaleFilterError);

impl From<StaleFilterError> for HttpError {
    fn from(e: StaleFilterError) -> Self {
        Self(e)
    }
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            StaleFilterError::Upstream(_) | StaleFilterError::UpstreamStatus(_) => {
                StatusCode::BAD_GATEWAY
            }
            StaleFilterError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            StaleFilterError::Config(_)
            | StaleFilterError::UnsupportedVersion
            | StaleFilterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.0.client_code().as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
