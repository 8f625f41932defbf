use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::str::FromStr;
use uuid::Uuid;

/// Namespace assumed when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Errors from parsing a `namespace:path` identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationParseError {
    #[error("empty namespace in {0:?}")]
    EmptyNamespace(String),
    #[error("empty path in {0:?}")]
    EmptyPath(String),
    #[error("invalid character {ch:?} in namespace of {input:?}")]
    InvalidNamespaceChar { input: String, ch: char },
    #[error("invalid character {ch:?} in path of {input:?}")]
    InvalidPathChar { input: String, ch: char },
}

/// Namespaced identifier for dimensions, biomes and entity types.
///
/// Equality is structural: two locations are equal when both the namespace
/// and the path are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceLocation {
    namespace: String,
    path: String,
}

impl ResourceLocation {
    /// Build a location from its two parts, validating both.
    pub fn new(
        namespace: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Self, LocationParseError> {
        let namespace = namespace.into();
        let path = path.into();
        let input = format!("{namespace}:{path}");

        if namespace.is_empty() {
            return Err(LocationParseError::EmptyNamespace(input));
        }
        if path.is_empty() {
            return Err(LocationParseError::EmptyPath(input));
        }
        if let Some(ch) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(LocationParseError::InvalidNamespaceChar { input, ch });
        }
        if let Some(ch) = path.chars().find(|c| !is_path_char(*c)) {
            return Err(LocationParseError::InvalidPathChar { input, ch });
        }

        Ok(Self { namespace, path })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The content origin that defines this identifier (its namespace).
    pub fn origin(&self) -> OriginTag {
        OriginTag::new(self.namespace.clone())
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl FromStr for ResourceLocation {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, s),
        }
    }
}

impl TryFrom<String> for ResourceLocation {
    type Error = LocationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceLocation> for String {
    fn from(value: ResourceLocation) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Opaque tag naming the content pack that defines an entity type.
///
/// Compared by exact string equality; no structure is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginTag(String);

impl OriginTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for OriginTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for OriginTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OriginTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OriginTag {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for OriginTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a hazard subject, used to correlate log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(pub Uuid);

impl SubjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
