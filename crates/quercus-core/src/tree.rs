//! Recursive tree shapes and path addressing.
//!
//! The full weighted tree is loaded by an external collaborator and treated
//! as read-only here. The selection tree is a sparse bare mirror of it:
//! presence of a path marks that node as selected by the user. Both shapes
//! are addressed by id paths from the root, and both degrade missing path
//! segments to "not present" rather than failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of a child within its parent's children map.
pub type NodeId = String;

/// Children keyed by id.
///
/// A `BTreeMap` keeps iteration deterministic across derivations, which the
/// ranking tie-breaks rely on.
pub type ChildMap<T> = BTreeMap<NodeId, T>;

/// Shared path-addressing behavior over recursive tree shapes.
pub trait TreeLike: Sized {
    /// Direct child by id, if present.
    fn child(&self, id: &str) -> Option<&Self>;

    /// Node at `path`, walking from this node. Any missing segment yields
    /// `None`.
    fn node_at(&self, path: &[NodeId]) -> Option<&Self> {
        let mut node = self;
        for id in path {
            node = node.child(id)?;
        }
        Some(node)
    }

    /// Whether `path` resolves to a node. The empty path always does.
    fn contains_path(&self, path: &[NodeId]) -> bool {
        self.node_at(path).is_some()
    }
}

/// A node of the full weighted tree.
///
/// By convention a node's weight is at least the sum of its visible
/// children's weights; this is relied upon for ranking but not enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedNode {
    /// Non-negative weight of the subtree rooted here.
    pub weight: f64,
    /// Children keyed by id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: ChildMap<WeightedNode>,
}

impl WeightedNode {
    /// Create a childless node with the given weight.
    #[must_use]
    pub fn leaf(weight: f64) -> Self {
        Self {
            weight,
            children: ChildMap::new(),
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn child(mut self, id: impl Into<NodeId>, node: WeightedNode) -> Self {
        self.children.insert(id.into(), node);
        self
    }
}

impl TreeLike for WeightedNode {
    fn child(&self, id: &str) -> Option<&Self> {
        self.children.get(id)
    }
}

/// A node of the sparse selection tree.
///
/// Carries no payload; the presence of a path is the whole signal. Mutated
/// only by the UI layer, read by the derivation core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionNode {
    /// Selected descendants keyed by id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: ChildMap<SelectionNode>,
}

impl SelectionNode {
    /// Mark `path` (and, implicitly, its prefixes) as selected.
    pub fn select(&mut self, path: &[NodeId]) {
        let mut node = self;
        for id in path {
            node = node.children.entry(id.clone()).or_default();
        }
    }

    /// Remove `path` and everything under it from the selection.
    pub fn deselect(&mut self, path: &[NodeId]) {
        let Some((last, prefix)) = path.split_last() else {
            self.children.clear();
            return;
        };
        let mut node = self;
        for id in prefix {
            match node.children.get_mut(id) {
                Some(next) => node = next,
                None => return,
            }
        }
        node.children.remove(last);
    }
}

impl TreeLike for SelectionNode {
    fn child(&self, id: &str) -> Option<&Self> {
        self.children.get(id)
    }
}

/// Rank and cumulative-weight offset of a node, either level-wide or among
/// its siblings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetInfo {
    /// Zero-based position.
    pub rank: usize,
    /// Sum of derived weights of everything before this node.
    pub weight: f64,
}

/// Aggregate meta for one embedded level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Sum of derived weights on the level.
    pub total_weight: f64,
    /// Number of visible nodes on the level.
    pub total_nodes: usize,
}
