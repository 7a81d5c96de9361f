//! Scrape orchestration for one port pair.
//!
//! fetch -> parse -> tracker update -> render. The tracker is owned by the
//! target and locked for the update/render step, so concurrent downstream
//! scrapes of the same target are applied one after another. A failed fetch
//! returns before the lock is taken and leaves the records untouched.

use std::sync::Arc;

use tokio::sync::Mutex;

use stalefilter_core::error::Result;
use stalefilter_core::exposition::{render, Parser};
use stalefilter_core::identity::SeriesKey;
use stalefilter_core::tracker::{StalenessRecord, StalenessTracker, TrackerSettings};

use crate::upstream::UpstreamSource;

pub struct ScrapeTarget {
    upstream: Arc<dyn UpstreamSource>,
    parser: Parser,
    tracker: Mutex<StalenessTracker>,
}

impl ScrapeTarget {
    pub fn new(upstream: Arc<dyn UpstreamSource>, settings: TrackerSettings) -> Result<Self> {
        Ok(Self {
            upstream,
            parser: Parser::new()?,
            tracker: Mutex::new(StalenessTracker::new(settings)),
        })
    }

    pub fn upstream(&self) -> &str {
        self.upstream.describe()
    }

    /// Run one scrape cycle and return the filtered exposition body.
    pub async fn scrape(&self) -> Result<String> {
        let body = match self.upstream.fetch().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(upstream = %self.upstream.describe(), error = %e, "upstream fetch failed");
                return Err(e);
            }
        };

        let scrape = self.parser.parse(&body);

        let mut tracker = self.tracker.lock().await;
        let verdicts = tracker.update(&scrape);
        let out = render(&scrape, &verdicts);

        tracing::debug!(
            upstream = %self.upstream.describe(),
            cycle = tracker.cycle(),
            families = scrape.len(),
            series = scrape.series_count(),
            live = verdicts.live_count(),
            stale = verdicts.stale_count(),
            tracked = tracker.len(),
            "scrape filtered"
        );
        Ok(out)
    }

    /// Completed scrape cycles.
    pub async fn cycle(&self) -> u64 {
        self.tracker.lock().await.cycle()
    }

    /// Number of series with a staleness record.
    pub async fn tracked_series(&self) -> usize {
        self.tracker.lock().await.len()
    }

    pub async fn record(&self, key: &SeriesKey) -> Option<StalenessRecord> {
        self.tracker.lock().await.record(key).cloned()
    }
}
