use astra_common::SubjectId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Marker set at natural spawn on a hazardous world; grants permanent immunity.
pub const SPACE_ADAPTED_MARKER: &str = "SpaceAdapted";

/// Capability tags a subject's type may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeTag {
    /// The type does not breathe.
    LivesWithoutOxygen,
    /// The type survives extreme environments such as vacuum.
    CanSurviveInSpace,
}

impl TypeTag {
    pub const EXEMPT: [TypeTag; 2] = [TypeTag::LivesWithoutOxygen, TypeTag::CanSurviveInSpace];
}

/// Role of a subject with respect to environmental damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubjectRole {
    #[default]
    Ordinary,
    /// Spectator-equivalent.
    Observer,
    /// Creative or otherwise invulnerable.
    Invulnerable,
}

impl SubjectRole {
    pub fn is_exempt(self) -> bool {
        matches!(self, Self::Observer | Self::Invulnerable)
    }
}

/// Which copy of the simulation is evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationSide {
    /// Owns the world truth; applies effects.
    Authoritative,
    /// Passive observer or replica; never applies effects.
    Replica,
}

/// Capability queries the host's subject type implements.
pub trait HazardSubject {
    fn id(&self) -> SubjectId;

    /// Only living subjects are evaluated.
    fn is_living(&self) -> bool;

    /// Full type identity string, e.g. `entity.born_in_chaos_v1.decrepit_skeleton`.
    fn type_identity(&self) -> Option<&str>;

    fn has_type_tag(&self, tag: TypeTag) -> bool;

    /// Transient boolean marker; unset markers read as `false`.
    fn marker(&self, key: &str) -> bool;

    fn role(&self) -> SubjectRole;
}

/// External engine that applies the oxygen penalty for one tick.
pub trait HazardEffects<S: HazardSubject + ?Sized> {
    fn apply_oxygen_effects(&mut self, subject: &S);
}

/// Owned copy of a subject's hazard-relevant attributes.
///
/// Hosts that cannot lend their live entity can copy its attributes into a
/// snapshot once per tick; the CLI builds its probes this way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSnapshot {
    pub id: SubjectId,
    pub living: bool,
    pub type_identity: Option<String>,
    pub tags: BTreeSet<TypeTag>,
    pub markers: BTreeMap<String, bool>,
    pub role: SubjectRole,
}

impl SubjectSnapshot {
    /// A living, ordinary subject of the given type with no tags or markers.
    pub fn living(type_identity: impl Into<String>) -> Self {
        Self {
            id: SubjectId::new(),
            living: true,
            type_identity: Some(type_identity.into()),
            tags: BTreeSet::new(),
            markers: BTreeMap::new(),
            role: SubjectRole::Ordinary,
        }
    }

    pub fn with_tag(mut self, tag: TypeTag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn with_marker(mut self, key: impl Into<String>, value: bool) -> Self {
        self.markers.insert(key.into(), value);
        self
    }

    pub fn with_role(mut self, role: SubjectRole) -> Self {
        self.role = role;
        self
    }

    pub fn non_living(mut self) -> Self {
        self.living = false;
        self
    }
}

impl HazardSubject for SubjectSnapshot {
    fn id(&self) -> SubjectId {
        self.id
    }

    fn is_living(&self) -> bool {
        self.living
    }

    fn type_identity(&self) -> Option<&str> {
        self.type_identity.as_deref()
    }

    fn has_type_tag(&self, tag: TypeTag) -> bool {
        self.tags.contains(&tag)
    }

    fn marker(&self, key: &str) -> bool {
        self.markers.get(key).copied().unwrap_or(false)
    }

    fn role(&self) -> SubjectRole {
        self.role
    }
}
