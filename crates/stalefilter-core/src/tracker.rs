//! Per-series staleness tracking.
//!
//! Every series has a record holding its last value and how many consecutive
//! scrapes it has come back unchanged. A series is LIVE while that counter is
//! at or below the threshold and STALE once it goes past it. Any change in
//! value resets the counter and makes the series LIVE again.
//!
//! Records are created on first sight and, unless eviction is configured,
//! never removed: a series that disappears upstream simply stops being
//! emitted.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::exposition::Exposition;
use crate::identity::SeriesKey;

/// Consecutive unchanged scrapes after which a series is suppressed.
pub const DEFAULT_STALE_THRESHOLD: u64 = 240;

/// How a series is treated the first time it is seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPolicy {
    /// Suppressed until its value changes at least once.
    #[default]
    Stale,
    /// Emitted right away, then counted like any other series.
    Live,
}

impl std::str::FromStr for StartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stale" => Ok(StartPolicy::Stale),
            "live" => Ok(StartPolicy::Live),
            other => Err(format!("unknown start policy: {other} (expected stale|live)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerSettings {
    #[serde(default = "default_threshold")]
    pub threshold: u64,

    #[serde(default)]
    pub start: StartPolicy,

    /// Drop records absent for more than this many scrapes. `None` keeps them
    /// for the process lifetime.
    #[serde(default)]
    pub evict_after: Option<u64>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            start: StartPolicy::default(),
            evict_after: None,
        }
    }
}

fn default_threshold() -> u64 {
    DEFAULT_STALE_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Live,
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StalenessRecord {
    value: f64,
    unchanged: u64,
    last_seen: u64,
    /// False for a start-stale series whose value has not moved yet.
    changed: bool,
}

impl StalenessRecord {
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Consecutive scrapes without a change.
    pub fn unchanged(&self) -> u64 {
        self.unchanged
    }

    /// Scrape cycle in which the series was last observed.
    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }

    /// Whether the value has changed at least once (always true under
    /// start-live).
    pub fn has_changed(&self) -> bool {
        self.changed
    }
}

/// LIVE/STALE verdicts for one scrape.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    live: HashSet<SeriesKey>,
    stale: usize,
}

impl Classification {
    pub fn insert(&mut self, key: SeriesKey, liveness: Liveness) {
        match liveness {
            Liveness::Live => {
                self.live.insert(key);
            }
            Liveness::Stale => self.stale += 1,
        }
    }

    pub fn contains(&self, key: &SeriesKey) -> bool {
        self.live.contains(key)
    }

    pub fn is_live(&self, family: &str, labels: &str) -> bool {
        self.contains(&SeriesKey::new(family, labels))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn stale_count(&self) -> usize {
        self.stale
    }
}

/// Record store for one scrape target.
#[derive(Debug)]
pub struct StalenessTracker {
    settings: TrackerSettings,
    records: HashMap<SeriesKey, StalenessRecord>,
    cycle: u64,
}

impl StalenessTracker {
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            settings,
            records: HashMap::new(),
            cycle: 0,
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    /// Number of completed `update` calls.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, key: &SeriesKey) -> Option<&StalenessRecord> {
        self.records.get(key)
    }

    pub fn liveness(&self, key: &SeriesKey) -> Option<Liveness> {
        self.records.get(key).map(|r| self.verdict(r))
    }

    /// Advance one scrape cycle: fold every supported series of `scrape`
    /// into the store and return this cycle's verdicts.
    pub fn update(&mut self, scrape: &Exposition) -> Classification {
        self.cycle += 1;
        let mut out = Classification::default();

        for family in scrape.supported_families() {
            for series in family.series() {
                let key = family.key(series);
                let liveness = self.observe(key.clone(), series.value);
                out.insert(key, liveness);
            }
        }

        self.evict_absent();
        out
    }

    /// Verdicts for `scrape` against the current records, without advancing.
    /// Series with no record are judged by the start policy.
    pub fn classify(&self, scrape: &Exposition) -> Classification {
        let mut out = Classification::default();
        for family in scrape.supported_families() {
            for series in family.series() {
                let key = family.key(series);
                let liveness = self.liveness(&key).unwrap_or(match self.settings.start {
                    StartPolicy::Live => Liveness::Live,
                    StartPolicy::Stale => Liveness::Stale,
                });
                out.insert(key, liveness);
            }
        }
        out
    }

    fn observe(&mut self, key: SeriesKey, value: f64) -> Liveness {
        let cycle = self.cycle;
        let threshold = self.settings.threshold;
        let start = self.settings.start;
        let r = match self.records.entry(key) {
            Entry::Occupied(e) => {
                let r = e.into_mut();
                r.last_seen = cycle;
                // exact comparison: NaN never equals itself
                if r.value != value {
                    r.value = value;
                    r.unchanged = 0;
                    r.changed = true;
                } else {
                    r.unchanged = r.unchanged.saturating_add(1);
                }
                r
            }
            Entry::Vacant(e) => {
                let (unchanged, changed) = match start {
                    StartPolicy::Live => (0, true),
                    StartPolicy::Stale => (threshold.saturating_add(1), false),
                };
                e.insert(StalenessRecord {
                    value,
                    unchanged,
                    last_seen: cycle,
                    changed,
                })
            }
        };
        Self::judge(r, threshold)
    }

    fn verdict(&self, r: &StalenessRecord) -> Liveness {
        Self::judge(r, self.settings.threshold)
    }

    fn judge(r: &StalenessRecord, threshold: u64) -> Liveness {
        if !r.changed || r.unchanged > threshold {
            Liveness::Stale
        } else {
            Liveness::Live
        }
    }

    fn evict_absent(&mut self) {
        let Some(limit) = self.settings.evict_after else {
            return;
        };
        let cycle = self.cycle;
        let before = self.records.len();
        self.records.retain(|key, r| {
            let keep = cycle.saturating_sub(r.last_seen) <= limit;
            if !keep {
                tracing::trace!(series = %key, last_seen = r.last_seen, "evicting absent series");
            }
            keep
        });
        let evicted = before - self.records.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.records.len(), "evicted absent series");
        }
    }
}
