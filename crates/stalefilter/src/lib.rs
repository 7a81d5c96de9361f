//! Top-level facade crate for stalefilter.
//!
//! Re-exports the core filtering logic and the gateway library so users can
//! depend on a single crate.

pub mod core {
    pub use stalefilter_core::*;
}

pub mod gateway {
    pub use stalefilter_gateway::*;
}
