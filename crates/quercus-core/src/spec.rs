//! Control specs, qc-specs, and entity kinds.
//!
//! A qc-spec describes one way of bifurcating the weighted tree: the root
//! entity type plus one bifurcation per level. Control specs are the
//! user-editable visibility policy, one per level. Both arrive as JSON from
//! collaborators; the core only reads them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::tree::NodeId;

/// Default per-level quota when a control spec does not set one.
pub const DEFAULT_LIMIT_N: usize = 10;

/// What a tree level's ranking weight is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBase {
    /// Raw subtree weight.
    #[default]
    Volume,
    /// Revealed-comparative-advantage specialization score.
    Specialization,
}

/// Visibility policy for one tree level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSpec {
    /// Ids forced into the window, after selection-driven inclusions.
    pub include: Vec<NodeId>,
    /// Ids the balanced fill must never pick.
    pub exclude: Vec<NodeId>,
    /// Maximum node count the level may reveal per derivation.
    pub limit_n: usize,
    /// `true` picks the largest derived weights, `false` the smallest.
    pub show_top: bool,
    /// Ranking weight derivation for the level.
    pub size_base: SizeBase,
}

impl Default for ControlSpec {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            limit_n: DEFAULT_LIMIT_N,
            show_top: true,
            size_base: SizeBase::Volume,
        }
    }
}

/// The category a tree level represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Institution,
    Concept,
    SubConcept,
    Country,
    Continent,
}

impl EntityKind {
    /// The upstream string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Institution => "Institution",
            Self::Concept => "Concept",
            Self::SubConcept => "SubConcept",
            Self::Country => "Country",
            Self::Continent => "Continent",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Institution" => Ok(Self::Institution),
            "Concept" => Ok(Self::Concept),
            "SubConcept" => Ok(Self::SubConcept),
            "Country" => Ok(Self::Country),
            "Continent" => Ok(Self::Continent),
            _ => Err(SpecError::UnknownEntityKind {
                value: s.to_string(),
            }),
        }
    }
}

/// Scope of a specialization basis or hierarchy: a concrete entity kind or
/// the global (unscoped) baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseScope {
    Global,
    Kind(EntityKind),
}

impl BaseScope {
    /// The upstream string for this scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Kind(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for BaseScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseScope {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Global" {
            return Ok(Self::Global);
        }
        EntityKind::from_str(s).map(Self::Kind)
    }
}

impl Serialize for BaseScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BaseScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One level of a qc-spec: which entity kind the level splits into and how
/// its controls are presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bifurcation {
    pub attribute_kind: EntityKind,
    pub resolver_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub control_format_str: String,
}

/// A full bifurcation scheme for one root entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub root_entity_type: EntityKind,
    pub bifurcations: Vec<Bifurcation>,
}

impl QcSpec {
    /// Entity kind of nodes addressed by a path of length `depth`.
    ///
    /// Depth 0 is the root entity itself; depth 1 is the first bifurcation.
    /// `None` when the path is deeper than the scheme.
    #[must_use]
    pub fn kind_at_depth(&self, depth: usize) -> Option<EntityKind> {
        if depth == 0 {
            Some(self.root_entity_type)
        } else {
            self.bifurcations
                .get(depth - 1)
                .map(|b| b.attribute_kind)
        }
    }

    /// Validate a control stack against this scheme.
    pub fn validate_controls(&self, controls: &[ControlSpec]) -> Result<(), SpecError> {
        if self.bifurcations.is_empty() {
            return Err(SpecError::NoBifurcations);
        }
        if controls.len() > self.bifurcations.len() {
            return Err(SpecError::TooManyControls {
                controls: controls.len(),
                bifurcations: self.bifurcations.len(),
            });
        }
        Ok(())
    }
}

/// Structural validation errors for qc-spec and control input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    UnknownEntityKind { value: String },
    NoBifurcations,
    TooManyControls { controls: usize, bifurcations: usize },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntityKind { value } => {
                write!(f, "unknown entity kind {value:?}")
            }
            Self::NoBifurcations => write!(f, "qc-spec has no bifurcations"),
            Self::TooManyControls {
                controls,
                bifurcations,
            } => write!(
                f,
                "{controls} control specs for {bifurcations} bifurcations"
            ),
        }
    }
}

impl std::error::Error for SpecError {}
