//! Shared error type across stalefilter crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid startup configuration.
    Config,
    /// Unsupported config file version.
    UnsupportedVersion,
    /// Upstream unreachable or body unreadable.
    Upstream,
    /// Upstream answered with a non-200 status.
    UpstreamStatus,
    /// Upstream did not answer in time.
    UpstreamTimeout,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Config => "CONFIG",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Upstream => "UPSTREAM",
            ClientCode::UpstreamStatus => "UPSTREAM_STATUS",
            ClientCode::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StaleFilterError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum StaleFilterError {
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("upstream: {0}")]
    Upstream(String),
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),
    #[error("upstream timed out")]
    UpstreamTimeout,
    #[error("internal: {0}")]
    Internal(String),
}

impl StaleFilterError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            StaleFilterError::Config(_) => ClientCode::Config,
            StaleFilterError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            StaleFilterError::Upstream(_) => ClientCode::Upstream,
            StaleFilterError::UpstreamStatus(_) => ClientCode::UpstreamStatus,
            StaleFilterError::UpstreamTimeout => ClientCode::UpstreamTimeout,
            StaleFilterError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Whether the failure came from the upstream side of a scrape.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            StaleFilterError::Upstream(_)
                | StaleFilterError::UpstreamStatus(_)
                | StaleFilterError::UpstreamTimeout
        )
    }
}
