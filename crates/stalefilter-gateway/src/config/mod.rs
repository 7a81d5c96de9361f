//! Config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use stalefilter_core::error::{Result, StaleFilterError};

pub use schema::{ListenSection, StaleFilterConfig, UpstreamSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<StaleFilterConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        StaleFilterError::Config(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<StaleFilterConfig> {
    let cfg: StaleFilterConfig = serde_yaml::from_str(s)
        .map_err(|e| StaleFilterError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
