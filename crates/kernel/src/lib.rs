//! Policy Kernel: the handler object a host engine registers for spawn attempts
//! and entity ticks.
//!
//! # Invariants
//! - Every decision is appended to an event log; the log is append-only until drained.
//! - A host cannot be built without a hazard effects engine.
//! - All whitelist mutations flow through explicit operations.

pub mod host;

pub use host::{PolicyEvent, PolicyHost, PolicyHostBuilder, SpawnOutcome, WiringError};
