//! Shared identifiers used by the spawn whitelist and hazard crates.

mod types;

pub use types::{DEFAULT_NAMESPACE, LocationParseError, OriginTag, ResourceLocation, SubjectId};
