use astra_common::{OriginTag, ResourceLocation};
use serde::{Deserialize, Serialize};

use crate::whitelist::WhitelistStore;

/// Where a spawn is being checked, which selects the whitelist query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnSite {
    /// Exact spawn-site dimension with entity-level precision.
    Exact,
    /// Dimension plus biome context; checked by origin.
    Biome(ResourceLocation),
}

/// A creature about to materialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnCandidate {
    pub origin: OriginTag,
    pub entity: ResourceLocation,
    pub dimension: ResourceLocation,
    pub site: SpawnSite,
}

impl SpawnCandidate {
    /// Candidate checked at entity precision, with the origin taken from the
    /// entity's namespace.
    pub fn new(entity: ResourceLocation, dimension: ResourceLocation) -> Self {
        Self {
            origin: entity.origin(),
            entity,
            dimension,
            site: SpawnSite::Exact,
        }
    }

    /// Override the origin derived from the entity namespace.
    pub fn with_origin(mut self, origin: impl Into<OriginTag>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Check by origin against the biome whitelist instead of by exact entity.
    pub fn in_biome(mut self, biome: ResourceLocation) -> Self {
        self.site = SpawnSite::Biome(biome);
        self
    }
}

/// Outcome of a spawn check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnDecision {
    /// The origin is not under spawn control.
    Unrestricted,
    /// Controlled origin, allowed by a whitelist entry.
    Whitelisted,
    /// Controlled origin with no matching rule.
    Denied,
}

impl SpawnDecision {
    /// True unless denied.
    pub fn is_allowed(self) -> bool {
        !matches!(self, Self::Denied)
    }
}

impl std::fmt::Display for SpawnDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrestricted => write!(f, "allowed (unrestricted)"),
            Self::Whitelisted => write!(f, "allowed (whitelisted)"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Stateless spawn check over a borrowed [`WhitelistStore`].
#[derive(Debug, Clone, Copy)]
pub struct SpawnAuthorizer<'a> {
    store: &'a WhitelistStore,
}

impl<'a> SpawnAuthorizer<'a> {
    /// Authorizer reading from `store`.
    pub fn new(store: &'a WhitelistStore) -> Self {
        Self { store }
    }

    /// Decide whether the candidate may materialize.
    ///
    /// Uncontrolled origins are never blocked. Controlled origins defer to
    /// the entity-level query for [`SpawnSite::Exact`] and to the biome-level
    /// query for [`SpawnSite::Biome`].
    pub fn authorize(&self, candidate: &SpawnCandidate) -> SpawnDecision {
        let origin = candidate.origin.as_str();
        if !self.store.is_controlled(origin) {
            tracing::trace!(%origin, entity = %candidate.entity, "unrestricted origin");
            return SpawnDecision::Unrestricted;
        }

        let allowed = match &candidate.site {
            SpawnSite::Exact => {
                self.store
                    .is_entity_allowed(&candidate.dimension, &candidate.entity, origin)
            }
            SpawnSite::Biome(biome) => {
                self.store
                    .is_origin_allowed(&candidate.dimension, biome, origin)
            }
        };

        let decision = if allowed {
            SpawnDecision::Whitelisted
        } else {
            SpawnDecision::Denied
        };
        tracing::trace!(
            %origin,
            entity = %candidate.entity,
            dimension = %candidate.dimension,
            ?decision,
            "spawn checked"
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> ResourceLocation {
        s.parse().unwrap()
    }

    fn mars_store() -> WhitelistStore {
        let mut store = WhitelistStore::new();
        let mars = loc("adastra:mars");
        store.allow_origin_in_dimension(mars.clone(), "kobolds");
        store.allow_origin_in_biome(mars.clone(), loc("adastra:mars_wastes"), "ribbits");
        store.allow_entity_in_dimension(mars, loc("born_in_chaos_v1:decrepit_skeleton"));
        store
    }

    #[test]
    fn candidate_origin_defaults_to_entity_namespace() {
        let c = SpawnCandidate::new(loc("kobolds:kobold"), loc("adastra:mars"));
        assert_eq!(c.origin.as_str(), "kobolds");
        assert_eq!(c.site, SpawnSite::Exact);

        let c = c.with_origin("other").in_biome(loc("adastra:mars_wastes"));
        assert_eq!(c.origin.as_str(), "other");
        assert_eq!(c.site, SpawnSite::Biome(loc("adastra:mars_wastes")));
    }

    #[test]
    fn uncontrolled_origin_is_always_allowed() {
        let store = WhitelistStore::new();
        let authorizer = SpawnAuthorizer::new(&store);
        let c = SpawnCandidate::new(loc("minecraft:zombie"), loc("adastra:mars"));
        assert_eq!(authorizer.authorize(&c), SpawnDecision::Unrestricted);
        assert!(authorizer.authorize(&c).is_allowed());

        let c = c.in_biome(loc("adastra:mars_wastes"));
        assert_eq!(authorizer.authorize(&c), SpawnDecision::Unrestricted);
    }

    #[test]
    fn controlled_origin_without_rules_is_denied() {
        let store = WhitelistStore::new();
        let authorizer = SpawnAuthorizer::new(&store);
        let c = SpawnCandidate::new(loc("kobolds:kobold"), loc("adastra:mars"));
        assert_eq!(authorizer.authorize(&c), SpawnDecision::Denied);
        assert!(!authorizer.authorize(&c).is_allowed());
    }

    #[test]
    fn exact_site_uses_entity_whitelist() {
        let store = mars_store();
        let authorizer = SpawnAuthorizer::new(&store);
        let mars = loc("adastra:mars");

        let skeleton = SpawnCandidate::new(loc("born_in_chaos_v1:decrepit_skeleton"), mars.clone());
        assert_eq!(authorizer.authorize(&skeleton), SpawnDecision::Whitelisted);

        // mars is in entity mode, so the kobolds dimension entry is ignored
        let kobold = SpawnCandidate::new(loc("kobolds:kobold"), mars);
        assert_eq!(authorizer.authorize(&kobold), SpawnDecision::Denied);
    }

    #[test]
    fn biome_site_uses_origin_whitelists() {
        let store = mars_store();
        let authorizer = SpawnAuthorizer::new(&store);
        let mars = loc("adastra:mars");

        let ribbit = SpawnCandidate::new(loc("ribbits:ribbit"), mars.clone())
            .in_biome(loc("adastra:mars_wastes"));
        assert_eq!(authorizer.authorize(&ribbit), SpawnDecision::Whitelisted);

        let kobold_in_wastes = SpawnCandidate::new(loc("kobolds:kobold"), mars.clone())
            .in_biome(loc("adastra:mars_wastes"));
        assert_eq!(authorizer.authorize(&kobold_in_wastes), SpawnDecision::Denied);

        let kobold_in_canyon = SpawnCandidate::new(loc("kobolds:kobold"), mars)
            .in_biome(loc("adastra:mars_canyon"));
        assert_eq!(authorizer.authorize(&kobold_in_canyon), SpawnDecision::Whitelisted);
    }

    #[test]
    fn decision_display() {
        assert_eq!(SpawnDecision::Unrestricted.to_string(), "allowed (unrestricted)");
        assert_eq!(SpawnDecision::Whitelisted.to_string(), "allowed (whitelisted)");
        assert_eq!(SpawnDecision::Denied.to_string(), "denied");
    }
}
