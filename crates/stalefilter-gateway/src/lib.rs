//! stalefilter gateway library entry.
//!
//! Wires the CLI, config, upstream client and per-pair scrape targets into
//! one HTTP listener per port pair. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod cli;
pub mod config;
pub mod error;
pub mod ops;
pub mod router;
pub mod server;
pub mod target;
pub mod upstream;
