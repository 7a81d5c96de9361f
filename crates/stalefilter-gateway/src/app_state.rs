//! Per-listener application state.
//!
//! Each port pair gets its own `AppState` wrapping exactly one `ScrapeTarget`.
//! States are never shared between listeners.

use std::sync::Arc;

use stalefilter_core::error::Result;

use crate::cli::PortPair;
use crate::config::StaleFilterConfig;
use crate::target::ScrapeTarget;
use crate::upstream::HttpUpstream;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pair: PortPair,
    target: ScrapeTarget,
}

impl AppState {
    /// Build the state for one pair, scraping over HTTP.
    pub fn new(pair: PortPair, cfg: &StaleFilterConfig) -> Result<Self> {
        let upstream = Arc::new(HttpUpstream::new(&cfg.upstream, pair.upstream));
        let target = ScrapeTarget::new(upstream, cfg.staleness.clone())?;
        Ok(Self::with_target(pair, target))
    }

    pub fn with_target(pair: PortPair, target: ScrapeTarget) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pair, target }),
        }
    }

    pub fn pair(&self) -> PortPair {
        self.inner.pair
    }

    pub fn target(&self) -> &ScrapeTarget {
        &self.inner.target
    }
}
