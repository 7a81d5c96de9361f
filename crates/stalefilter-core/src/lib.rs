//! stalefilter core: exposition parsing, series identity, staleness tracking
//! and re-serialization.
//!
//! This crate holds the logic that decides which time series survive a scrape.
//! It carries no transport or runtime dependencies so the gateway, tests and
//! tooling can drive it directly with in-memory payloads.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed exposition lines are skipped, never fatal, so a misbehaving
//! upstream cannot take the proxy down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod identity;
pub mod tracker;

/// Shared result type.
pub use error::{Result, StaleFilterError};
pub use exposition::{parse, render, Exposition, MetricFamily, MetricType, Parser, Series};
pub use identity::SeriesKey;
pub use tracker::{Classification, Liveness, StalenessTracker, StartPolicy, TrackerSettings};
