//! Command line surface.
//!
//! Ports are a flat list consumed two at a time as `(upstream, listen)`.
//! A trailing unpaired port is dropped. Options override the config file.

use std::path::PathBuf;

use clap::Parser;
use stalefilter_core::error::{Result, StaleFilterError};
use stalefilter_core::tracker::StartPolicy;

use crate::config::{self, StaleFilterConfig};

/// One isolated pipeline: scrape `upstream`, serve on `listen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortPair {
    pub upstream: u16,
    pub listen: u16,
}

#[derive(Debug, Parser)]
#[command(
    name = "stalefilter-gateway",
    about = "Re-expose Prometheus metrics, hiding series that stopped changing"
)]
pub struct Args {
    /// Ports as UPSTREAM LISTEN pairs, e.g. `9100 9101 9200 9201`.
    #[arg(value_name = "PORT")]
    pub ports: Vec<u16>,

    /// YAML config file.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Unchanged scrapes after which a series is hidden.
    #[arg(long, value_name = "SCRAPES")]
    pub threshold: Option<u64>,

    /// Treatment of never-seen series: `stale` or `live`.
    #[arg(long, value_name = "POLICY")]
    pub start: Option<StartPolicy>,

    /// Forget series absent for this many scrapes.
    #[arg(long, value_name = "SCRAPES")]
    pub evict_after: Option<u64>,

    /// Upstream fetch timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub upstream_timeout_ms: Option<u64>,

    /// Listen address for all pairs.
    #[arg(long, value_name = "HOST")]
    pub bind: Option<String>,
}

impl Args {
    /// Resolve the effective config and port pairs.
    pub fn into_config(self) -> Result<(StaleFilterConfig, Vec<PortPair>)> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from_file(path)?,
            None => StaleFilterConfig::default(),
        };

        if let Some(threshold) = self.threshold {
            cfg.staleness.threshold = threshold;
        }
        if let Some(start) = self.start {
            cfg.staleness.start = start;
        }
        if self.evict_after.is_some() {
            cfg.staleness.evict_after = self.evict_after;
        }
        if let Some(ms) = self.upstream_timeout_ms {
            cfg.upstream.timeout_ms = ms;
        }
        if let Some(host) = self.bind {
            cfg.listen.host = host;
        }
        cfg.validate()?;

        let (pairs, leftover) = pair_ports(&self.ports);
        if let Some(port) = leftover {
            tracing::warn!(port, "ignoring unpaired trailing port");
        }
        if pairs.is_empty() {
            return Err(StaleFilterError::Config(
                "expected at least one UPSTREAM LISTEN port pair".into(),
            ));
        }
        Ok((cfg, pairs))
    }
}

/// Split a flat port list into pairs; returns the odd leftover, if any.
pub fn pair_ports(ports: &[u16]) -> (Vec<PortPair>, Option<u16>) {
    let chunks = ports.chunks_exact(2);
    let leftover = chunks.remainder().first().copied();
    let pairs = chunks
        .map(|c| PortPair {
            upstream: c[0],
            listen: c[1],
        })
        .collect();
    (pairs, leftover)
}
