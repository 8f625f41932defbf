//! Environmental hazard: decides per living subject per tick whether oxygen
//! deprivation applies.
//!
//! # Invariants
//! - Only the authoritative simulation side applies effects.
//! - Any single exemption skips the effect. Missing attributes never error.
//! - The effects engine is called at most once per evaluated tick.

mod evaluator;
mod subject;

pub use evaluator::{DEFAULT_EXEMPT_ORIGINS, HazardEvaluator, HazardVerdict, SkipReason};
pub use subject::{
    HazardEffects, HazardSubject, SPACE_ADAPTED_MARKER, SimulationSide, SubjectRole,
    SubjectSnapshot, TypeTag,
};
