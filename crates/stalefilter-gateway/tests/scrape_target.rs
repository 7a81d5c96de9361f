//! Orchestrator tests against an in-memory upstream.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use stalefilter_core::error::{Result, StaleFilterError};
use stalefilter_core::identity::SeriesKey;
use stalefilter_core::tracker::{StartPolicy, TrackerSettings};
use stalefilter_gateway::target::ScrapeTarget;
use stalefilter_gateway::upstream::UpstreamSource;

/// Replays queued responses; repeats `fallback` once the queue is empty.
struct Scripted {
    queue: Mutex<VecDeque<Result<String>>>,
    fallback: String,
}

impl Scripted {
    fn new(fallback: &str) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: fallback.to_string(),
        }
    }

    fn push(&self, res: Result<String>) {
        self.queue.lock().unwrap().push_back(res);
    }
}

#[async_trait]
impl UpstreamSource for Scripted {
    fn describe(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self) -> Result<String> {
        let next = self.queue.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

fn settings(threshold: u64, start: StartPolicy) -> TrackerSettings {
    TrackerSettings {
        threshold,
        start,
        evict_after: None,
    }
}

fn gauge(v: u32) -> String {
    format!("# HELP foo desc\n# TYPE foo gauge\nfoo{{a=\"1\"}} {v}\n")
}

#[tokio::test]
async fn start_stale_scenario_through_target() {
    let upstream = Arc::new(Scripted::new(&gauge(6)));
    upstream.push(Ok(gauge(5)));
    upstream.push(Ok(gauge(5)));
    let target = ScrapeTarget::new(upstream, TrackerSettings::default()).unwrap();

    assert_eq!(target.scrape().await.unwrap(), "");
    assert_eq!(target.scrape().await.unwrap(), "");
    assert_eq!(
        target.scrape().await.unwrap(),
        "# HELP foo desc\n# TYPE foo gauge\nfoo{a=\"1\"} 6\n"
    );
}

#[tokio::test]
async fn failed_fetch_leaves_tracker_untouched() {
    let upstream = Arc::new(Scripted::new("up 1\n"));
    upstream.push(Ok("up 1\n".into()));
    upstream.push(Err(StaleFilterError::UpstreamStatus(503)));
    upstream.push(Err(StaleFilterError::UpstreamTimeout));
    let target = ScrapeTarget::new(upstream.clone(), settings(10, StartPolicy::Live)).unwrap();
    let key = SeriesKey::new("up", "");

    target.scrape().await.unwrap();
    let before = target.record(&key).await.unwrap();

    let err = target.scrape().await.unwrap_err();
    assert!(matches!(err, StaleFilterError::UpstreamStatus(503)));
    let err = target.scrape().await.unwrap_err();
    assert!(err.is_upstream());

    assert_eq!(target.cycle().await, 1);
    assert_eq!(target.record(&key).await.unwrap(), before);

    // the next good scrape continues the count where it left off
    target.scrape().await.unwrap();
    assert_eq!(target.record(&key).await.unwrap().unchanged(), 1);
}

#[tokio::test]
async fn malformed_body_is_not_an_error() {
    let upstream = Arc::new(Scripted::new("this is { not exposition\n\u{0}\n"));
    let target = ScrapeTarget::new(upstream, settings(10, StartPolicy::Live)).unwrap();
    assert_eq!(target.scrape().await.unwrap(), "");
    assert_eq!(target.tracked_series().await, 0);
    assert_eq!(target.cycle().await, 1);
}

#[tokio::test]
async fn series_go_quiet_after_threshold() {
    let upstream = Arc::new(Scripted::new("# TYPE up gauge\nup 1\nload 0.5\n"));
    let target = ScrapeTarget::new(upstream.clone(), settings(2, StartPolicy::Live)).unwrap();

    for _ in 0..3 {
        assert!(target.scrape().await.unwrap().contains("up 1\n"));
    }
    assert_eq!(target.scrape().await.unwrap(), "");

    upstream.push(Ok("# TYPE up gauge\nup 0\nload 0.5\n".into()));
    assert_eq!(
        target.scrape().await.unwrap(),
        "# HELP up\n# TYPE up gauge\nup 0\n"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scrapes_are_serialized() {
    let upstream = Arc::new(Scripted::new("up 1\n"));
    let target = Arc::new(ScrapeTarget::new(upstream, settings(1000, StartPolicy::Live)).unwrap());

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let target = Arc::clone(&target);
            tokio::spawn(async move { target.scrape().await })
        })
        .collect();
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(target.cycle().await, 32);
    let record = target.record(&SeriesKey::new("up", "")).await.unwrap();
    assert_eq!(record.unchanged(), 31);
}

#[tokio::test]
async fn targets_do_not_share_state() {
    let a = ScrapeTarget::new(Arc::new(Scripted::new("up 1\n")), settings(1, StartPolicy::Live)).unwrap();
    let b = ScrapeTarget::new(Arc::new(Scripted::new("up 1\n")), settings(1, StartPolicy::Live)).unwrap();

    for _ in 0..3 {
        a.scrape().await.unwrap();
    }
    assert_eq!(a.scrape().await.unwrap(), "");
    assert_eq!(b.scrape().await.unwrap(), "# HELP up\n# TYPE up untyped\nup 1\n");
    assert_eq!(b.cycle().await, 1);
}
