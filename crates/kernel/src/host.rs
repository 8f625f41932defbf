use astra_common::{ResourceLocation, SubjectId};
use astra_hazard::{
    HazardEffects, HazardEvaluator, HazardSubject, HazardVerdict, SimulationSide, SkipReason,
};
use astra_spawn::{SpawnAuthorizer, SpawnCandidate, SpawnDecision, SpawnPolicy, WhitelistStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A record produced by every decision the host makes.
///
/// The log lets the host engine audit spawn control and hazard ticks after
/// the fact without the policy core owning any persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PolicyEvent {
    /// Candidate was allowed to materialize.
    SpawnAllowed {
        entity: ResourceLocation,
        dimension: ResourceLocation,
        decision: SpawnDecision,
        mark_space_adapted: bool,
    },
    /// Candidate was prevented from materializing.
    SpawnBlocked {
        entity: ResourceLocation,
        dimension: ResourceLocation,
    },
    /// Oxygen effects were handed to the effects engine.
    HazardApplied { subject: SubjectId },
    /// Subject was exempt this tick.
    HazardSkipped { subject: SubjectId, reason: SkipReason },
    /// Whitelists were cleared and rebuilt from a policy document.
    PolicyReloaded,
}

/// What the spawn hook must do with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnOutcome {
    Blocked,
    /// When `mark_space_adapted` is set the host must set the `SpaceAdapted`
    /// marker on the materialized creature.
    Allowed {
        decision: SpawnDecision,
        mark_space_adapted: bool,
    },
}

impl SpawnOutcome {
    /// True when the candidate may materialize.
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// The authorizer's decision behind this outcome.
    pub fn decision(self) -> SpawnDecision {
        match self {
            Self::Blocked => SpawnDecision::Denied,
            Self::Allowed { decision, .. } => decision,
        }
    }
}

/// Errors detected while wiring a host at startup.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("no hazard effects engine registered")]
    MissingEffectsEngine,
}

/// Builder for [`PolicyHost`].
///
/// Starts from a seeded empty store and the default evaluator. The policy
/// document is applied in `build`, on top of the configured store, so call
/// order does not matter. Its exempt origin list, when present, takes
/// precedence over `evaluator`.
pub struct PolicyHostBuilder<E> {
    store: WhitelistStore,
    evaluator: HazardEvaluator,
    effects: Option<E>,
    hazardous_dimensions: BTreeSet<ResourceLocation>,
    policy: Option<SpawnPolicy>,
}

impl<E> PolicyHostBuilder<E> {
    /// Start from a pre-populated store instead of a seeded empty one.
    pub fn store(mut self, store: WhitelistStore) -> Self {
        self.store = store;
        self
    }

    /// Evaluator used whenever the policy has no `hazard.exempt_origins`.
    pub fn evaluator(mut self, evaluator: HazardEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn effects(mut self, effects: E) -> Self {
        self.effects = Some(effects);
        self
    }

    /// Mark a dimension hazardous regardless of the policy document.
    pub fn hazardous_dimension(mut self, dimension: ResourceLocation) -> Self {
        self.hazardous_dimensions.insert(dimension);
        self
    }

    /// Policy document applied at build time. A later call replaces an earlier one.
    pub fn policy(mut self, policy: &SpawnPolicy) -> Self {
        self.policy = Some(policy.clone());
        self
    }

    /// Finish wiring. A missing effects engine is a fatal configuration error.
    pub fn build(self) -> Result<PolicyHost<E>, WiringError> {
        let effects = self.effects.ok_or(WiringError::MissingEffectsEngine)?;

        let mut store = self.store;
        let (evaluator, hazardous_dimensions) = match &self.policy {
            Some(policy) => {
                policy.apply(&mut store);
                (
                    policy_evaluator(policy, &self.evaluator),
                    policy_hazardous(policy, &self.hazardous_dimensions),
                )
            }
            None => (self.evaluator.clone(), self.hazardous_dimensions.clone()),
        };

        tracing::info!(
            stats = %store.stats(),
            hazardous = hazardous_dimensions.len(),
            exempt_origins = evaluator.exempt_origins().len(),
            "policy host ready"
        );
        Ok(PolicyHost {
            store,
            evaluator,
            effects,
            hazardous_dimensions,
            base_evaluator: self.evaluator,
            base_hazardous: self.hazardous_dimensions,
            event_log: Vec::new(),
        })
    }
}

fn policy_evaluator(policy: &SpawnPolicy, base: &HazardEvaluator) -> HazardEvaluator {
    match &policy.hazard.exempt_origins {
        Some(origins) => HazardEvaluator::with_exempt_origins(origins.iter().cloned()),
        None => base.clone(),
    }
}

fn policy_hazardous(
    policy: &SpawnPolicy,
    base: &BTreeSet<ResourceLocation>,
) -> BTreeSet<ResourceLocation> {
    base.iter()
        .chain(&policy.hazardous_dimensions)
        .cloned()
        .collect()
}

/// Spawn-control and oxygen-tick handler owned by the host engine.
///
/// The host calls [`on_spawn_attempt`] from its spawn pipeline and
/// [`on_entity_tick`] once per subject per tick. Both run on the caller's
/// thread; reloads must be serialized by the caller, which `&mut self`
/// already enforces for a single owner.
///
/// [`on_spawn_attempt`]: PolicyHost::on_spawn_attempt
/// [`on_entity_tick`]: PolicyHost::on_entity_tick
#[derive(Debug)]
pub struct PolicyHost<E> {
    store: WhitelistStore,
    evaluator: HazardEvaluator,
    effects: E,
    hazardous_dimensions: BTreeSet<ResourceLocation>,
    // wiring-time settings a reload falls back to
    base_evaluator: HazardEvaluator,
    base_hazardous: BTreeSet<ResourceLocation>,
    event_log: Vec<PolicyEvent>,
}

impl<E> PolicyHost<E> {
    pub fn builder() -> PolicyHostBuilder<E> {
        PolicyHostBuilder {
            store: WhitelistStore::new(),
            evaluator: HazardEvaluator::new(),
            effects: None,
            hazardous_dimensions: BTreeSet::new(),
            policy: None,
        }
    }

    /// The live whitelist store.
    pub fn store(&self) -> &WhitelistStore {
        &self.store
    }

    /// Mutable store access for setup-phase registration.
    pub fn store_mut(&mut self) -> &mut WhitelistStore {
        &mut self.store
    }

    /// The evaluator currently in effect.
    pub fn evaluator(&self) -> &HazardEvaluator {
        &self.evaluator
    }

    /// The registered effects engine.
    pub fn effects(&self) -> &E {
        &self.effects
    }

    /// Dimensions whose whitelisted spawns are marked space adapted.
    pub fn hazardous_dimensions(&self) -> &BTreeSet<ResourceLocation> {
        &self.hazardous_dimensions
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[PolicyEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<PolicyEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Decide whether a candidate may materialize.
    ///
    /// Whitelisted candidates entering a hazardous dimension are flagged so
    /// the host marks them space adapted; unrestricted origins never are.
    pub fn on_spawn_attempt(&mut self, candidate: &SpawnCandidate) -> SpawnOutcome {
        let decision = SpawnAuthorizer::new(&self.store).authorize(candidate);
        if !decision.is_allowed() {
            tracing::debug!(
                entity = %candidate.entity,
                dimension = %candidate.dimension,
                "spawn blocked"
            );
            self.event_log.push(PolicyEvent::SpawnBlocked {
                entity: candidate.entity.clone(),
                dimension: candidate.dimension.clone(),
            });
            return SpawnOutcome::Blocked;
        }

        let mark_space_adapted = decision == SpawnDecision::Whitelisted
            && self.hazardous_dimensions.contains(&candidate.dimension);
        self.event_log.push(PolicyEvent::SpawnAllowed {
            entity: candidate.entity.clone(),
            dimension: candidate.dimension.clone(),
            decision,
            mark_space_adapted,
        });
        SpawnOutcome::Allowed {
            decision,
            mark_space_adapted,
        }
    }

    /// Run the oxygen exemption chain for one subject and apply effects if due.
    pub fn on_entity_tick<S>(&mut self, side: SimulationSide, subject: &S) -> HazardVerdict
    where
        S: HazardSubject + ?Sized,
        E: HazardEffects<S>,
    {
        let verdict = self.evaluator.tick(side, subject, &mut self.effects);
        let subject = subject.id();
        self.event_log.push(match &verdict {
            HazardVerdict::Apply => PolicyEvent::HazardApplied { subject },
            HazardVerdict::Skip(reason) => PolicyEvent::HazardSkipped {
                subject,
                reason: reason.clone(),
            },
        });
        verdict
    }

    /// Clear and rebuild the whitelists, hazardous dimensions and exempt
    /// origins from a policy.
    ///
    /// Controlled origins persist. Sections the document lacks fall back to
    /// what the builder was given, so the result matches a host freshly
    /// built with the same document.
    pub fn reload(&mut self, policy: &SpawnPolicy) {
        self.store.reload(policy);
        self.hazardous_dimensions = policy_hazardous(policy, &self.base_hazardous);
        self.evaluator = policy_evaluator(policy, &self.base_evaluator);
        self.event_log.push(PolicyEvent::PolicyReloaded);
    }
}
