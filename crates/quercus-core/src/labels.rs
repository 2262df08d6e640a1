//! Attribute labels and root metadata with degrading lookups.
//!
//! Labels arrive as one big `entity kind → id → statics` table. The `meta`
//! field is delivered as a JSON-encoded string upstream; it is parsed
//! leniently and malformed meta degrades to an empty map. A missing label
//! never fails a derivation, it yields a placeholder display name.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::spec::EntityKind;
use crate::tree::NodeId;

/// Display name used while a label is missing or still loading.
pub const PLACEHOLDER_NAME: &str = "Loading...";

/// Root-scoped attribute metadata, e.g. an institution's continent and
/// country ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootMeta(BTreeMap<String, Value>);

impl RootMeta {
    /// Build from explicit key/value pairs.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The root's attribute value for `scope`, as an id string.
    ///
    /// String and numeric values are accepted; anything else is treated as
    /// absent.
    #[must_use]
    pub fn scope_value(&self, scope: EntityKind) -> Option<String> {
        let key = match scope {
            EntityKind::Institution => "institution",
            EntityKind::Concept => "concept",
            EntityKind::SubConcept => "sub_concept",
            EntityKind::Country => "country",
            EntityKind::Continent => "continent",
        };
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Whether no metadata is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for RootMeta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Upstream delivers meta either as an object or as a JSON-encoded
        // string; malformed content degrades to empty.
        let value = Value::deserialize(deserializer)?;
        let object = match value {
            Value::Object(map) => map.into_iter().collect(),
            Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map.into_iter().collect(),
                _ => BTreeMap::new(),
            },
            _ => BTreeMap::new(),
        };
        Ok(Self(object))
    }
}

/// Name and metadata for one attribute id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeStatics {
    pub name: String,
    #[serde(default)]
    pub meta: RootMeta,
}

/// Lookup table of attribute statics per entity kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeLabels(FxHashMap<EntityKind, FxHashMap<NodeId, AttributeStatics>>);

impl AttributeLabels {
    /// Statics for `id` within `kind`, if known.
    #[must_use]
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&AttributeStatics> {
        self.0.get(&kind)?.get(id)
    }

    /// Display name for `id` within `kind`, degrading to
    /// [`PLACEHOLDER_NAME`].
    #[must_use]
    pub fn child_name(&self, kind: EntityKind, id: &str) -> String {
        self.get(kind, id)
            .map_or_else(|| PLACEHOLDER_NAME.to_string(), |s| s.name.clone())
    }

    /// Register statics for an id. Mainly useful for tests and fixtures.
    pub fn insert(&mut self, kind: EntityKind, id: impl Into<NodeId>, statics: AttributeStatics) {
        self.0.entry(kind).or_default().insert(id.into(), statics);
    }
}
