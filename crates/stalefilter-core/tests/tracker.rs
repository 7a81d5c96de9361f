//! Staleness tracker tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use stalefilter_core::tracker::{Liveness, StalenessTracker, StartPolicy, TrackerSettings};
use stalefilter_core::{parse, Exposition, SeriesKey};

fn scrape(body: &str) -> Exposition {
    parse(body).unwrap()
}

fn tracker(threshold: u64, start: StartPolicy) -> StalenessTracker {
    StalenessTracker::new(TrackerSettings {
        threshold,
        start,
        evict_after: None,
    })
}

#[test]
fn identical_series_reuse_one_record() {
    let mut t = tracker(5, StartPolicy::Live);
    let key = SeriesKey::new("cpu", r#"core="0""#);

    t.update(&scrape("cpu{core=\"0\"} 1\ncpu{core=\"1\"} 1\n"));
    t.update(&scrape("cpu{core=\"0\"} 1\ncpu{core=\"1\"} 1\n"));

    assert_eq!(t.len(), 2);
    assert_eq!(t.record(&key).unwrap().unchanged(), 1);
}

#[test]
fn label_order_is_part_of_identity() {
    let mut t = tracker(5, StartPolicy::Live);
    t.update(&scrape("m{a=\"1\",b=\"2\"} 1\n"));
    t.update(&scrape("m{b=\"2\",a=\"1\"} 1\n"));
    assert_eq!(t.len(), 2);
}

#[test]
fn counter_counts_unchanged_observations() {
    let threshold = 3;
    let mut t = tracker(threshold, StartPolicy::Live);
    let key = SeriesKey::new("up", "");

    // observations 1..=threshold+1 keep the counter at or below the threshold
    for n in 1..=threshold + 1 {
        let verdicts = t.update(&scrape("up 1\n"));
        assert_eq!(t.record(&key).unwrap().unchanged(), n - 1);
        assert!(verdicts.contains(&key), "observation {n} should be live");
    }

    let verdicts = t.update(&scrape("up 1\n"));
    assert_eq!(t.record(&key).unwrap().unchanged(), threshold + 1);
    assert!(!verdicts.contains(&key));
    assert_eq!(verdicts.stale_count(), 1);
    assert_eq!(t.liveness(&key), Some(Liveness::Stale));
}

#[test]
fn change_resets_even_when_stale() {
    let mut t = tracker(1, StartPolicy::Live);
    let key = SeriesKey::new("up", "");

    for _ in 0..4 {
        t.update(&scrape("up 1\n"));
    }
    assert_eq!(t.liveness(&key), Some(Liveness::Stale));

    let verdicts = t.update(&scrape("up 2\n"));
    assert!(verdicts.contains(&key));
    assert_eq!(t.record(&key).unwrap().unchanged(), 0);
    assert_eq!(t.record(&key).unwrap().value(), 2.0);
}

#[test]
fn start_stale_holds_at_maximum_threshold() {
    let mut t = tracker(u64::MAX, StartPolicy::Stale);
    let key = SeriesKey::new("up", "");

    assert!(!t.update(&scrape("up 1\n")).contains(&key));
    assert!(!t.record(&key).unwrap().has_changed());
    assert!(!t.update(&scrape("up 1\n")).contains(&key));
    assert_eq!(t.liveness(&key), Some(Liveness::Stale));

    assert!(t.update(&scrape("up 2\n")).contains(&key));
    assert!(t.record(&key).unwrap().has_changed());
    assert!(t.update(&scrape("up 2\n")).contains(&key));
}

#[test]
fn series_key_displays_like_an_exposition_name() {
    assert_eq!(SeriesKey::new("cpu", r#"core="0""#).to_string(), r#"cpu{core="0"}"#);
    assert_eq!(SeriesKey::new("up", "").to_string(), "up");
}

#[test]
fn series_change_independently_within_a_family() {
    let mut t = tracker(1, StartPolicy::Live);
    for v in 0..4 {
        t.update(&scrape(&format!("cpu{{core=\"0\"}} 7\ncpu{{core=\"1\"}} {v}\n")));
    }
    assert_eq!(
        t.liveness(&SeriesKey::new("cpu", r#"core="0""#)),
        Some(Liveness::Stale)
    );
    assert_eq!(
        t.liveness(&SeriesKey::new("cpu", r#"core="1""#)),
        Some(Liveness::Live)
    );
}

#[test]
fn start_stale_suppresses_until_first_change() {
    let mut t = tracker(240, StartPolicy::Stale);
    let key = SeriesKey::new("foo", r#"a="1""#);

    assert!(!t.update(&scrape("foo{a=\"1\"} 5\n")).contains(&key));
    assert!(!t.update(&scrape("foo{a=\"1\"} 5\n")).contains(&key));
    assert!(t.update(&scrape("foo{a=\"1\"} 6\n")).contains(&key));
}

#[test]
fn nan_always_counts_as_changed() {
    let mut t = tracker(1, StartPolicy::Live);
    let key = SeriesKey::new("ratio", "");
    for _ in 0..5 {
        assert!(t.update(&scrape("ratio NaN\n")).contains(&key));
    }
}

#[test]
fn classify_does_not_advance() {
    let mut t = tracker(2, StartPolicy::Stale);
    let first = scrape("a 1\n");
    t.update(&first);

    let before = t.record(&SeriesKey::new("a", "")).cloned();
    let verdicts = t.classify(&scrape("a 1\nb 1\n"));
    assert_eq!(t.record(&SeriesKey::new("a", "")).cloned(), before);
    assert_eq!(t.cycle(), 1);
    assert_eq!(verdicts.live_count(), 0);
    assert_eq!(verdicts.stale_count(), 2);
}

#[test]
fn unsupported_families_are_not_tracked() {
    let mut t = tracker(2, StartPolicy::Live);
    t.update(&scrape(
        "# TYPE lat histogram\nlat_bucket{le=\"1\"} 1\nlat_sum 1\nlat_count 1\n\
         # TYPE rpc summary\nrpc{quantile=\"0.5\"} 1\n",
    ));
    assert!(t.is_empty());
}

#[test]
fn records_persist_without_eviction() {
    let mut t = tracker(2, StartPolicy::Live);
    t.update(&scrape("gone 1\n"));
    for _ in 0..10 {
        t.update(&scrape("other 1\n"));
    }
    assert!(t.record(&SeriesKey::new("gone", "")).is_some());
}

#[test]
fn eviction_drops_long_absent_records() {
    let mut t = StalenessTracker::new(TrackerSettings {
        threshold: 2,
        start: StartPolicy::Live,
        evict_after: Some(2),
    });
    let gone = SeriesKey::new("gone", "");

    t.update(&scrape("gone 1\nkept 1\n"));
    t.update(&scrape("kept 1\n"));
    t.update(&scrape("kept 1\n"));
    assert!(t.record(&gone).is_some());

    t.update(&scrape("kept 1\n"));
    assert!(t.record(&gone).is_none());
    assert!(t.record(&SeriesKey::new("kept", "")).is_some());
}

#[test]
fn settings_deserialize_with_defaults() {
    let s: TrackerSettings = serde_yaml::from_str("{}").unwrap();
    assert_eq!(s, TrackerSettings::default());
    assert_eq!(s.threshold, 240);
    assert_eq!(s.start, StartPolicy::Stale);

    let s: TrackerSettings = serde_yaml::from_str("threshold: 10\nstart: live\nevict_after: 50\n").unwrap();
    assert_eq!(s.threshold, 10);
    assert_eq!(s.start, StartPolicy::Live);
    assert_eq!(s.evict_after, Some(50));

    assert!(serde_yaml::from_str::<TrackerSettings>("treshold: 1\n").is_err());
}
