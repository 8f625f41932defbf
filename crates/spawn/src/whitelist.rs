use astra_common::{OriginTag, ResourceLocation};
use std::collections::{BTreeMap, BTreeSet};

use crate::policy::SpawnPolicy;

/// Origins placed under spawn control when a store is created.
pub const SEED_CONTROLLED_ORIGINS: [&str; 3] = ["kobolds", "ribbits", "born_in_chaos_v1"];

/// Authorization rules for modded mob spawns.
///
/// Holds the set of controlled origins plus three independent whitelists:
/// origin-per-dimension, origin-per-biome and exact-entity-per-dimension.
/// All queries are default-deny: a dimension without any entry allows nothing.
///
/// # Precedence
/// - An entity whitelist entry for a dimension, even an empty one, replaces
///   origin-level reasoning for that dimension in [`is_entity_allowed`].
/// - A biome entry, even an empty one, overrides the dimension entry in
///   [`is_origin_allowed`].
///
/// Ordered maps keep [`describe`] output stable between runs.
///
/// [`is_entity_allowed`]: WhitelistStore::is_entity_allowed
/// [`is_origin_allowed`]: WhitelistStore::is_origin_allowed
/// [`describe`]: WhitelistStore::describe
#[derive(Debug, Clone)]
pub struct WhitelistStore {
    controlled: BTreeSet<OriginTag>,
    dimensions: BTreeMap<ResourceLocation, BTreeSet<OriginTag>>,
    biomes: BTreeMap<ResourceLocation, BTreeMap<ResourceLocation, BTreeSet<OriginTag>>>,
    entities: BTreeMap<ResourceLocation, BTreeSet<ResourceLocation>>,
}

impl Default for WhitelistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WhitelistStore {
    /// Create a store with the seed controlled origins and no whitelist rules.
    pub fn new() -> Self {
        Self {
            controlled: SEED_CONTROLLED_ORIGINS
                .iter()
                .map(|origin| OriginTag::from(*origin))
                .collect(),
            dimensions: BTreeMap::new(),
            biomes: BTreeMap::new(),
            entities: BTreeMap::new(),
        }
    }

    // --- Controlled origins ---

    /// Place an origin under spawn control. Idempotent.
    pub fn register_controlled_origin(&mut self, origin: impl Into<OriginTag>) {
        let origin = origin.into();
        tracing::debug!(%origin, "registering controlled origin");
        self.controlled.insert(origin);
    }

    /// Whether spawns of this origin are subject to the whitelists.
    pub fn is_controlled(&self, origin: &str) -> bool {
        self.controlled.contains(origin)
    }

    /// Controlled origins in sorted order.
    pub fn controlled_origins(&self) -> impl Iterator<Item = &OriginTag> {
        self.controlled.iter()
    }

    // --- Registration ---

    /// Allow an origin anywhere in a dimension. Idempotent.
    pub fn allow_origin_in_dimension(
        &mut self,
        dimension: ResourceLocation,
        origin: impl Into<OriginTag>,
    ) {
        let origin = origin.into();
        tracing::debug!(%dimension, %origin, "whitelisting origin for dimension");
        self.dimensions.entry(dimension).or_default().insert(origin);
    }

    /// Allow an origin in one biome of a dimension. Idempotent.
    pub fn allow_origin_in_biome(
        &mut self,
        dimension: ResourceLocation,
        biome: ResourceLocation,
        origin: impl Into<OriginTag>,
    ) {
        let origin = origin.into();
        tracing::debug!(%dimension, %biome, %origin, "whitelisting origin for biome");
        self.biomes
            .entry(dimension)
            .or_default()
            .entry(biome)
            .or_default()
            .insert(origin);
    }

    /// Allow one exact entity type in a dimension. Idempotent.
    ///
    /// The first call for a dimension switches it to entity-level mode.
    pub fn allow_entity_in_dimension(
        &mut self,
        dimension: ResourceLocation,
        entity: ResourceLocation,
    ) {
        tracing::debug!(%dimension, %entity, "whitelisting entity for dimension");
        self.entities.entry(dimension).or_default().insert(entity);
    }

    /// Ensure a biome entry exists without allowing any origin.
    ///
    /// An empty biome entry denies every controlled origin in that biome,
    /// regardless of the dimension whitelist.
    pub fn declare_biome(&mut self, dimension: ResourceLocation, biome: ResourceLocation) {
        tracing::debug!(%dimension, %biome, "declaring biome whitelist");
        self.biomes.entry(dimension).or_default().entry(biome).or_default();
    }

    /// Ensure an entity whitelist exists for a dimension without allowing any entity.
    pub fn declare_entity_whitelist(&mut self, dimension: ResourceLocation) {
        tracing::debug!(%dimension, "declaring entity whitelist");
        self.entities.entry(dimension).or_default();
    }

    // --- Queries ---

    /// Whether an exact entity may exist in a dimension.
    ///
    /// Entity-level entries win outright; otherwise the dimension whitelist
    /// is consulted by origin; otherwise deny. Biome entries are not consulted.
    pub fn is_entity_allowed(
        &self,
        dimension: &ResourceLocation,
        entity: &ResourceLocation,
        origin: &str,
    ) -> bool {
        if let Some(allowed) = self.entities.get(dimension) {
            return allowed.contains(entity);
        }
        if let Some(allowed) = self.dimensions.get(dimension) {
            return allowed.contains(origin);
        }
        false
    }

    /// Whether an origin may exist in a biome of a dimension.
    pub fn is_origin_allowed(
        &self,
        dimension: &ResourceLocation,
        biome: &ResourceLocation,
        origin: &str,
    ) -> bool {
        if let Some(allowed) = self.biomes.get(dimension).and_then(|b| b.get(biome)) {
            return allowed.contains(origin);
        }
        if let Some(allowed) = self.dimensions.get(dimension) {
            return allowed.contains(origin);
        }
        false
    }

    /// Dimensions whose dimension-level whitelist names the origin.
    ///
    /// Biome and entity entries are not considered.
    pub fn dimensions_allowing_origin(&self, origin: &str) -> BTreeSet<ResourceLocation> {
        self.dimensions
            .iter()
            .filter(|(_, origins)| origins.contains(origin))
            .map(|(dimension, _)| dimension.clone())
            .collect()
    }

    // --- Lifecycle ---

    /// Clear every whitelist. Controlled origins are kept.
    pub fn reset(&mut self) {
        tracing::info!(stats = %self.stats(), "clearing spawn whitelists");
        self.dimensions.clear();
        self.biomes.clear();
        self.entities.clear();
    }

    /// Clear the whitelists and repopulate them from a policy document.
    pub fn reload(&mut self, policy: &SpawnPolicy) {
        self.reset();
        policy.apply(self);
        tracing::info!(stats = %self.stats(), "spawn whitelists reloaded");
    }

    /// Entry counts for logging.
    pub fn stats(&self) -> WhitelistStats {
        WhitelistStats {
            controlled_origins: self.controlled.len(),
            dimension_entries: self.dimensions.len(),
            biome_entries: self.biomes.values().map(BTreeMap::len).sum(),
            entity_dimensions: self.entities.len(),
            whitelisted_entities: self.entities.values().map(BTreeSet::len).sum(),
        }
    }

    /// Human-readable dump of all state for diagnostics.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for WhitelistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Controlled origins: {}", join(&self.controlled))?;
        writeln!(f, "Dimension whitelists:")?;
        for (dimension, origins) in &self.dimensions {
            writeln!(f, "  {dimension}: {}", join(origins))?;
        }
        writeln!(f, "Biome whitelists:")?;
        for (dimension, biomes) in &self.biomes {
            writeln!(f, "  dimension {dimension}:")?;
            for (biome, origins) in biomes {
                writeln!(f, "    {biome}: {}", join(origins))?;
            }
        }
        writeln!(f, "Entity whitelists:")?;
        for (dimension, entities) in &self.entities {
            writeln!(f, "  {dimension}: {} entities", entities.len())?;
        }
        Ok(())
    }
}

fn join<T: std::fmt::Display>(items: &BTreeSet<T>) -> String {
    let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Entry counts for log lines and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WhitelistStats {
    pub controlled_origins: usize,
    pub dimension_entries: usize,
    pub biome_entries: usize,
    pub entity_dimensions: usize,
    pub whitelisted_entities: usize,
}

impl std::fmt::Display for WhitelistStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "controlled={} dimensions={} biomes={} entity_dimensions={} entities={}",
            self.controlled_origins,
            self.dimension_entries,
            self.biome_entries,
            self.entity_dimensions,
            self.whitelisted_entities
        )
    }
}
