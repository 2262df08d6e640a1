//! Baseline rate tables, key codec, and the static basis configuration.
//!
//! Baseline tables are nested `id → …` maps terminating in expected-share
//! rates. They are addressed by `"<target>-<basis>-<hierarchy>"` keys, a
//! fixed naming scheme shared with the data pipeline. A small set of
//! combinations is never materialized upstream ([`IGNORED_BASES`]); their
//! lookups behave exactly like any other missing table.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use quercus_core::{BaseScope, EntityKind, SpecError};

/// Basis/hierarchy combinations never loaded by the data pipeline.
///
/// Deep Concept-hierarchy slices are skipped upstream for size reasons;
/// specialization scores against them see a zero baseline.
pub const IGNORED_BASES: &[&str] = &[
    "Institution-Country-Concept",
    "SubConcept-Country-Concept",
];

/// Which baseline table and divisor scope apply to one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecBasis {
    /// Peer-grouping dimension selecting a baseline table slice.
    pub basis: BaseScope,
    /// Ancestor scope normalizing the node weight.
    pub hierarchy: BaseScope,
}

/// Static per-entity-kind basis configuration. Not user-editable.
#[must_use]
pub const fn spec_basis_for(kind: EntityKind) -> SpecBasis {
    match kind {
        EntityKind::Institution => SpecBasis {
            basis: BaseScope::Kind(EntityKind::Country),
            hierarchy: BaseScope::Global,
        },
        EntityKind::Concept => SpecBasis {
            basis: BaseScope::Global,
            hierarchy: BaseScope::Global,
        },
        EntityKind::SubConcept => SpecBasis {
            basis: BaseScope::Global,
            hierarchy: BaseScope::Kind(EntityKind::Concept),
        },
        EntityKind::Country => SpecBasis {
            basis: BaseScope::Kind(EntityKind::Continent),
            hierarchy: BaseScope::Global,
        },
        EntityKind::Continent => SpecBasis {
            basis: BaseScope::Global,
            hierarchy: BaseScope::Global,
        },
    }
}

/// Encode a baseline table key.
#[must_use]
pub fn spec_base_kind_to_str(
    target: EntityKind,
    basis: BaseScope,
    hierarchy: BaseScope,
) -> String {
    format!("{target}-{basis}-{hierarchy}")
}

/// Decode a baseline table key produced by [`spec_base_kind_to_str`].
pub fn spec_base_str_to_kind(
    key: &str,
) -> Result<(EntityKind, BaseScope, BaseScope), BaseKeyError> {
    let mut parts = key.splitn(3, '-');
    let (Some(target), Some(basis), Some(hierarchy)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(BaseKeyError::MalformedKey {
            key: key.to_string(),
        });
    };
    let target = target
        .parse::<EntityKind>()
        .map_err(|source| BaseKeyError::UnknownPart {
            key: key.to_string(),
            source,
        })?;
    let basis = basis
        .parse::<BaseScope>()
        .map_err(|source| BaseKeyError::UnknownPart {
            key: key.to_string(),
            source,
        })?;
    let hierarchy =
        hierarchy
            .parse::<BaseScope>()
            .map_err(|source| BaseKeyError::UnknownPart {
                key: key.to_string(),
                source,
            })?;
    Ok((target, basis, hierarchy))
}

/// Decode errors for baseline table keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseKeyError {
    MalformedKey { key: String },
    UnknownPart { key: String, source: SpecError },
}

impl fmt::Display for BaseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedKey { key } => {
                write!(f, "baseline key {key:?} is not <target>-<basis>-<hierarchy>")
            }
            Self::UnknownPart { key, source } => {
                write!(f, "baseline key {key:?}: {source}")
            }
        }
    }
}

impl std::error::Error for BaseKeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedKey { .. } => None,
            Self::UnknownPart { source, .. } => Some(source),
        }
    }
}

/// A nested baseline table terminating in `id → rate` maps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BaselineTable {
    /// Leaf level: expected-share rate per id.
    Rates(FxHashMap<String, f64>),
    /// Intermediate level keyed by a basis or hierarchy id.
    Nested(FxHashMap<String, BaselineTable>),
}

impl BaselineTable {
    /// Descend one level by a basis or hierarchy id.
    #[must_use]
    pub fn dig(&self, key: &str) -> Option<&BaselineTable> {
        match self {
            Self::Nested(inner) => inner.get(key),
            Self::Rates(_) => None,
        }
    }

    /// Rate for `id` at a leaf level.
    #[must_use]
    pub fn rate(&self, id: &str) -> Option<f64> {
        match self {
            Self::Rates(rates) => rates.get(id).copied(),
            Self::Nested(_) => None,
        }
    }
}

/// Specialization baseline tables keyed by their codec string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SpecBaselines(FxHashMap<String, BaselineTable>);

impl SpecBaselines {
    /// Register a table under `key`. Returns `false` (and drops the table)
    /// for keys on [`IGNORED_BASES`], mirroring the load-time filter.
    pub fn insert(&mut self, key: impl Into<String>, table: BaselineTable) -> bool {
        let key = key.into();
        if IGNORED_BASES.contains(&key.as_str()) {
            return false;
        }
        self.0.insert(key, table);
        true
    }

    /// Table for `key`, if loaded.
    #[must_use]
    pub fn table(&self, key: &str) -> Option<&BaselineTable> {
        self.0.get(key)
    }
}
