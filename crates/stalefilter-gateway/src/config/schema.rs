use serde::Deserialize;
use stalefilter_core::error::{Result, StaleFilterError};
use stalefilter_core::tracker::TrackerSettings;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaleFilterConfig {
    pub version: u32,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub listen: ListenSection,

    #[serde(default)]
    pub staleness: TrackerSettings,
}

impl Default for StaleFilterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            upstream: UpstreamSection::default(),
            listen: ListenSection::default(),
            staleness: TrackerSettings::default(),
        }
    }
}

impl StaleFilterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StaleFilterError::UnsupportedVersion);
        }

        self.upstream.validate()?;
        self.listen.validate()?;

        if self.staleness.threshold == 0 {
            return Err(StaleFilterError::Config(
                "staleness.threshold must be at least 1".into(),
            ));
        }
        if self.staleness.evict_after == Some(0) {
            return Err(StaleFilterError::Config(
                "staleness.evict_after must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_upstream_host")]
    pub host: String,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            host: default_upstream_host(),
            path: default_path(),
            timeout_ms: default_timeout_ms(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(StaleFilterError::Config("upstream.host must not be empty".into()));
        }
        validate_path("upstream.path", &self.path)?;
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(StaleFilterError::Config(
                "upstream.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(StaleFilterError::Config(
                "upstream.max_body_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenSection {
    #[serde(default = "default_listen_host")]
    pub host: String,

    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ListenSection {
    fn default() -> Self {
        Self {
            host: default_listen_host(),
            path: default_path(),
        }
    }
}

impl ListenSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(StaleFilterError::Config("listen.host must not be empty".into()));
        }
        validate_path("listen.path", &self.path)?;
        if self.path == "/healthz" {
            return Err(StaleFilterError::Config(
                "listen.path must not shadow /healthz".into(),
            ));
        }
        Ok(())
    }
}

fn validate_path(field: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(StaleFilterError::Config(format!("{field} must start with '/'")));
    }
    Ok(())
}

fn default_upstream_host() -> String {
    "localhost".into()
}
fn default_listen_host() -> String {
    "0.0.0.0".into()
}
fn default_path() -> String {
    "/metrics".into()
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}
