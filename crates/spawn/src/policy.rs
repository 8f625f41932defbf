//! Policy documents: the setup-time source of whitelist rules.
//!
//! A policy is a YAML or JSON document. Every section is optional:
//! ```yaml
//! controlled_origins: [mowziesmobs]
//! hazardous_dimensions: ["adastra:mars"]
//! dimensions:
//!   "minecraft:overworld": [kobolds, ribbits]
//! biomes:
//!   "adastra:mars":
//!     "adastra:mars_wastes": [born_in_chaos_v1]
//! entities:
//!   "adastra:mars": ["born_in_chaos_v1:decrepit_skeleton"]
//! hazard:
//!   exempt_origins: [doom]
//! ```
//! An empty biome or entity list is kept as an explicit deny-all entry.

use astra_common::{OriginTag, ResourceLocation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::whitelist::WhitelistStore;

/// Errors from loading a policy document.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported policy format: {} (expected .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Spawn and hazard rules as written by an operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnPolicy {
    /// Origins added to the controlled set, on top of the seed origins.
    pub controlled_origins: Vec<OriginTag>,
    /// Dimensions where naturally spawned controlled creatures become space adapted.
    pub hazardous_dimensions: Vec<ResourceLocation>,
    pub dimensions: BTreeMap<ResourceLocation, Vec<OriginTag>>,
    pub biomes: BTreeMap<ResourceLocation, BTreeMap<ResourceLocation, Vec<OriginTag>>>,
    pub entities: BTreeMap<ResourceLocation, Vec<ResourceLocation>>,
    pub hazard: HazardPolicy,
}

/// Hazard section of a policy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HazardPolicy {
    /// Replaces the built-in exempt origin substrings when present.
    pub exempt_origins: Option<Vec<String>>,
}

impl SpawnPolicy {
    /// Load a policy file, choosing the parser from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let policy = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&std::fs::read_to_string(path)?)?,
            Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?)?,
            _ => return Err(PolicyError::UnsupportedFormat(path.to_path_buf())),
        };

        tracing::info!(path = %path.display(), "loaded spawn policy");
        Ok(policy)
    }

    /// Parse a YAML policy document.
    pub fn from_yaml_str(text: &str) -> Result<Self, PolicyError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a JSON policy document.
    pub fn from_json_str(text: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Register every rule of this policy into the store.
    pub fn apply(&self, store: &mut WhitelistStore) {
        let _span = tracing::info_span!("apply_policy").entered();

        for origin in &self.controlled_origins {
            store.register_controlled_origin(origin.clone());
        }
        for (dimension, origins) in &self.dimensions {
            for origin in origins {
                store.allow_origin_in_dimension(dimension.clone(), origin.clone());
            }
        }
        for (dimension, biomes) in &self.biomes {
            for (biome, origins) in biomes {
                store.declare_biome(dimension.clone(), biome.clone());
                for origin in origins {
                    store.allow_origin_in_biome(dimension.clone(), biome.clone(), origin.clone());
                }
            }
        }
        for (dimension, entities) in &self.entities {
            store.declare_entity_whitelist(dimension.clone());
            for entity in entities {
                store.allow_entity_in_dimension(dimension.clone(), entity.clone());
            }
        }

        tracing::debug!(stats = %store.stats(), "policy applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MARS_YAML: &str = r#"
controlled_origins: [mowziesmobs]
hazardous_dimensions: ["adastra:mars"]
dimensions:
  "minecraft:overworld": [kobolds, ribbits]
biomes:
  "adastra:mars":
    "adastra:mars_wastes": [born_in_chaos_v1]
    "adastra:mars_canyon": []
entities:
  "adastra:mars": ["born_in_chaos_v1:decrepit_skeleton"]
hazard:
  exempt_origins: [doom]
"#;

    const MARS_JSON: &str = r#"{
  "controlled_origins": ["mowziesmobs"],
  "hazardous_dimensions": ["adastra:mars"],
  "dimensions": { "minecraft:overworld": ["kobolds", "ribbits"] },
  "biomes": {
    "adastra:mars": {
      "adastra:mars_wastes": ["born_in_chaos_v1"],
      "adastra:mars_canyon": []
    }
  },
  "entities": { "adastra:mars": ["born_in_chaos_v1:decrepit_skeleton"] },
  "hazard": { "exempt_origins": ["doom"] }
}"#;

    fn loc(s: &str) -> ResourceLocation {
        s.parse().unwrap()
    }

    #[test]
    fn yaml_and_json_are_equivalent() {
        let yaml = SpawnPolicy::from_yaml_str(MARS_YAML).unwrap();
        let json = SpawnPolicy::from_json_str(MARS_JSON).unwrap();
        assert_eq!(yaml, json);
        assert_eq!(yaml.hazardous_dimensions, vec![loc("adastra:mars")]);
        assert_eq!(yaml.hazard.exempt_origins, Some(vec!["doom".to_string()]));
    }

    #[test]
    fn shipped_planet_policy_loads() {
        let policy =
            SpawnPolicy::from_yaml_str(include_str!("../../../policies/planets.yaml")).unwrap();
        let mut store = WhitelistStore::new();
        policy.apply(&mut store);

        let mars = loc("adastra:mars");
        assert!(store.is_controlled("doom"));
        assert!(store.is_origin_allowed(&mars, &loc("adastra:mars_canyon"), "kobolds"));
        assert!(!store.is_origin_allowed(&mars, &loc("adastra:martian_polar_caps"), "kobolds"));
        assert!(store.is_entity_allowed(&loc("adastra:venus"), &loc("doom:imp"), "doom"));
        assert!(!store.is_entity_allowed(&loc("adastra:venus"), &loc("doom:baron"), "doom"));
        assert_eq!(policy.hazardous_dimensions.len(), 3);
    }

    #[test]
    fn empty_document_is_valid() {
        let policy = SpawnPolicy::from_yaml_str("{}").unwrap();
        assert_eq!(policy, SpawnPolicy::default());
        assert!(policy.hazard.exempt_origins.is_none());
    }

    #[test]
    fn apply_populates_store() {
        let policy = SpawnPolicy::from_yaml_str(MARS_YAML).unwrap();
        let mut store = WhitelistStore::new();
        policy.apply(&mut store);

        let mars = loc("adastra:mars");
        assert!(store.is_controlled("mowziesmobs"));
        assert!(store.is_origin_allowed(
            &loc("minecraft:overworld"),
            &loc("minecraft:plains"),
            "ribbits"
        ));
        assert!(store.is_origin_allowed(&mars, &loc("adastra:mars_wastes"), "born_in_chaos_v1"));
        assert!(store.is_entity_allowed(
            &mars,
            &loc("born_in_chaos_v1:decrepit_skeleton"),
            "born_in_chaos_v1"
        ));
        let stats = store.stats();
        assert_eq!(stats.biome_entries, 2);
        assert_eq!(stats.whitelisted_entities, 1);
    }

    #[test]
    fn empty_biome_list_is_kept_as_deny_all() {
        let policy = SpawnPolicy::from_yaml_str(
            r#"
dimensions:
  "adastra:mars": [kobolds]
biomes:
  "adastra:mars":
    "adastra:mars_canyon": []
"#,
        )
        .unwrap();
        let mut store = WhitelistStore::new();
        policy.apply(&mut store);

        let mars = loc("adastra:mars");
        assert!(!store.is_origin_allowed(&mars, &loc("adastra:mars_canyon"), "kobolds"));
        assert!(store.is_origin_allowed(&mars, &loc("adastra:mars_wastes"), "kobolds"));
    }

    #[test]
    fn empty_entity_list_switches_to_entity_mode() {
        let policy = SpawnPolicy::from_yaml_str(
            r#"
dimensions:
  "adastra:moon": [kobolds]
entities:
  "adastra:moon": []
"#,
        )
        .unwrap();
        let mut store = WhitelistStore::new();
        policy.apply(&mut store);

        assert!(!store.is_entity_allowed(
            &loc("adastra:moon"),
            &loc("kobolds:kobold"),
            "kobolds"
        ));
    }

    #[test]
    fn malformed_identifier_fails_load() {
        let err = SpawnPolicy::from_yaml_str("dimensions:\n  \"Adastra:Mars\": [kobolds]\n");
        assert!(matches!(err, Err(PolicyError::Yaml(_))));

        let err = SpawnPolicy::from_json_str(r#"{"entities": {"adastra:mars": ["kobolds:"]}}"#);
        assert!(matches!(err, Err(PolicyError::Json(_))));
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = SpawnPolicy::from_yaml_str("dimension: {}\n");
        assert!(matches!(err, Err(PolicyError::Yaml(_))));
    }

    #[test]
    fn load_yaml_file() {
        let mut tmp = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        tmp.write_all(MARS_YAML.as_bytes()).unwrap();

        let policy = SpawnPolicy::load(tmp.path()).unwrap();
        assert_eq!(policy.controlled_origins, vec![OriginTag::from("mowziesmobs")]);
    }

    #[test]
    fn load_json_file() {
        let mut tmp = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        tmp.write_all(MARS_JSON.as_bytes()).unwrap();

        let policy = SpawnPolicy::load(tmp.path()).unwrap();
        assert_eq!(policy.entities.len(), 1);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let tmp = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            SpawnPolicy::load(tmp.path()),
            Err(PolicyError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SpawnPolicy::load(dir.path().join("absent.yaml")),
            Err(PolicyError::Io(_))
        ));
    }

    #[test]
    fn reload_replaces_rules_and_keeps_controlled_origins() {
        let mut store = WhitelistStore::new();
        SpawnPolicy::from_yaml_str(MARS_YAML).unwrap().apply(&mut store);

        let next = SpawnPolicy::from_yaml_str(
            r#"
dimensions:
  "adastra:venus": [ribbits]
"#,
        )
        .unwrap();
        store.reload(&next);

        assert!(store.is_controlled("mowziesmobs"));
        assert!(!store.is_origin_allowed(
            &loc("minecraft:overworld"),
            &loc("minecraft:plains"),
            "kobolds"
        ));
        assert!(store.is_origin_allowed(
            &loc("adastra:venus"),
            &loc("adastra:venus_wastes"),
            "ribbits"
        ));
        assert_eq!(store.stats().entity_dimensions, 0);
    }
}
