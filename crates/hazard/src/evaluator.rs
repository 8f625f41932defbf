use serde::{Deserialize, Serialize};

use crate::subject::{
    HazardEffects, HazardSubject, SPACE_ADAPTED_MARKER, SimulationSide, SubjectRole, TypeTag,
};

/// Type-identity substrings whose creatures never suffer oxygen damage.
pub const DEFAULT_EXEMPT_ORIGINS: [&str; 12] = [
    "mowziesmobs",
    "undead_revamp2",
    "doom",
    "ribbits",
    "kobolds",
    "reptilian",
    "lumination",
    "luminousworld",
    "born_in_chaos",
    "mobs_of_mythology",
    "rottencreatures",
    "shineals_prehistoric_expansion",
];

/// Why a subject was left alone this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NotLiving,
    ReplicaSide,
    ExemptTag(TypeTag),
    /// The type identity contains this exempt substring.
    ExemptOrigin(String),
    SpaceAdapted,
    ExemptRole(SubjectRole),
}

/// Per-tick hazard decision for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardVerdict {
    Apply,
    Skip(SkipReason),
}

impl HazardVerdict {
    /// True when oxygen effects are due.
    pub fn applies(&self) -> bool {
        matches!(self, Self::Apply)
    }
}

impl std::fmt::Display for HazardVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apply => write!(f, "apply oxygen effects"),
            Self::Skip(SkipReason::NotLiving) => write!(f, "skip: not living"),
            Self::Skip(SkipReason::ReplicaSide) => write!(f, "skip: replica side"),
            Self::Skip(SkipReason::ExemptTag(tag)) => write!(f, "skip: type tag {tag:?}"),
            Self::Skip(SkipReason::ExemptOrigin(origin)) => {
                write!(f, "skip: exempt origin {origin}")
            }
            Self::Skip(SkipReason::SpaceAdapted) => write!(f, "skip: space adapted"),
            Self::Skip(SkipReason::ExemptRole(role)) => write!(f, "skip: role {role:?}"),
        }
    }
}

/// Oxygen hazard exemption chain.
///
/// Checks run cheapest first; any single exemption skips the effect, so the
/// order does not change the outcome. The verdict is a pure function of the
/// subject's attributes and the simulation side.
#[derive(Debug, Clone)]
pub struct HazardEvaluator {
    exempt_origins: Vec<String>,
}

impl Default for HazardEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl HazardEvaluator {
    /// Evaluator using [`DEFAULT_EXEMPT_ORIGINS`].
    pub fn new() -> Self {
        Self::with_exempt_origins(DEFAULT_EXEMPT_ORIGINS)
    }

    /// Evaluator with a custom substring list.
    ///
    /// Empty entries are dropped: an empty substring would match every identity.
    pub fn with_exempt_origins<I, T>(origins: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut exempt_origins = Vec::new();
        for origin in origins {
            let origin = origin.into();
            if origin.is_empty() {
                tracing::warn!("ignoring empty exempt origin");
                continue;
            }
            exempt_origins.push(origin);
        }
        Self { exempt_origins }
    }

    /// Substrings checked against the type identity, in match order.
    pub fn exempt_origins(&self) -> &[String] {
        &self.exempt_origins
    }

    /// Decide whether the oxygen hazard applies to the subject this tick.
    pub fn evaluate<S>(&self, side: SimulationSide, subject: &S) -> HazardVerdict
    where
        S: HazardSubject + ?Sized,
    {
        if !subject.is_living() {
            return HazardVerdict::Skip(SkipReason::NotLiving);
        }
        if side == SimulationSide::Replica {
            return HazardVerdict::Skip(SkipReason::ReplicaSide);
        }
        if let Some(tag) = TypeTag::EXEMPT.into_iter().find(|t| subject.has_type_tag(*t)) {
            return HazardVerdict::Skip(SkipReason::ExemptTag(tag));
        }
        // substring match, not namespace equality
        if let Some(identity) = subject.type_identity() {
            if let Some(origin) = self
                .exempt_origins
                .iter()
                .find(|origin| identity.contains(origin.as_str()))
            {
                return HazardVerdict::Skip(SkipReason::ExemptOrigin(origin.clone()));
            }
        }
        if subject.marker(SPACE_ADAPTED_MARKER) {
            return HazardVerdict::Skip(SkipReason::SpaceAdapted);
        }
        let role = subject.role();
        if role.is_exempt() {
            return HazardVerdict::Skip(SkipReason::ExemptRole(role));
        }
        HazardVerdict::Apply
    }

    /// Evaluate and, when not exempt, hand the subject to the effects engine once.
    pub fn tick<S, E>(&self, side: SimulationSide, subject: &S, effects: &mut E) -> HazardVerdict
    where
        S: HazardSubject + ?Sized,
        E: HazardEffects<S> + ?Sized,
    {
        let verdict = self.evaluate(side, subject);
        match &verdict {
            HazardVerdict::Apply => {
                tracing::trace!(subject = %subject.id(), "applying oxygen effects");
                effects.apply_oxygen_effects(subject);
            }
            HazardVerdict::Skip(reason) => {
                tracing::trace!(subject = %subject.id(), ?reason, "oxygen hazard skipped");
            }
        }
        verdict
    }
}
