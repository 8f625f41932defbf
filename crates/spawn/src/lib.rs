//! Spawn control: which modded creatures may exist in which dimension and biome.
//!
//! # Invariants
//! - Queries are default-deny and never error.
//! - Entity-level entries take total precedence for their dimension.
//! - A biome entry, even empty, overrides the dimension entry.
//! - Only explicit registration, `reset` and `reload` mutate the store.

mod authorizer;
mod policy;
mod whitelist;

pub use authorizer::{SpawnAuthorizer, SpawnCandidate, SpawnDecision, SpawnSite};
pub use policy::{HazardPolicy, PolicyError, SpawnPolicy};
pub use whitelist::{SEED_CONTROLLED_ORIGINS, WhitelistStats, WhitelistStore};
