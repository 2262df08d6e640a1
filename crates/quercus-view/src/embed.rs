//! The embedder: flat per-level lists into a nested, addressable tree.
//!
//! Levels embed strictly top-down: level N can only attach to parents that
//! level N-1 already embedded. Each level is sorted by parent rank, then
//! derived weight, then id (larger id wins ties) so a re-derivation with
//! identical inputs reproduces the same tree bit for bit. Every embedded
//! node gets a level-wide offset, a sibling offset, and a proportional
//! scale slice subdivided from its parent's interval.

use rustc_hash::FxHashMap;
use serde::Serialize;

use quercus_core::{
    ChildMap, LevelInfo, NodeId, OffsetInfo, PLACEHOLDER_NAME, SizeBase, TreeLike,
};
use quercus_metrics::Metric;

use crate::window::{LevelEntry, ViewInputs, flat_filter};

/// A node's proportional screen-space slice, inherited and subdivided from
/// its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleEnds {
    pub min: f64,
    pub max: f64,
    pub mid: f64,
}

impl ScaleEnds {
    /// The root's full range.
    pub const FULL: ScaleEnds = ScaleEnds {
        min: 0.0,
        max: 1.0,
        mid: 0.5,
    };
}

/// A visible node with everything the rendering layer needs to place it.
///
/// Built fresh on every derivation, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddedNode {
    /// Display name, placeholder when the label is missing.
    pub name: String,
    /// Raw subtree weight.
    pub weight: f64,
    /// Embedded children keyed by id.
    pub children: ChildMap<EmbeddedNode>,
    /// Sum of embedded children's derived weights.
    pub children_sum_weight: f64,
    /// Rank and cumulative derived weight among the whole level.
    pub total_offset_on_level: OffsetInfo,
    /// Rank and cumulative derived weight among siblings.
    pub total_offset_among_siblings: OffsetInfo,
    /// Whether the node's path is in the selection tree.
    pub is_selected: bool,
    /// Proportional slice of the parent's interval.
    pub scale_ends: ScaleEnds,
    /// Present only on specialization-sized levels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_metric: Option<Metric>,
}

/// The embedded window plus per-level aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeInfo {
    pub tree: EmbeddedNode,
    pub meta: Vec<LevelInfo>,
}

fn embedded_at_mut<'r>(
    root: &'r mut EmbeddedNode,
    path: &[NodeId],
) -> Option<&'r mut EmbeddedNode> {
    let mut node = root;
    for id in path {
        node = node.children.get_mut(id)?;
    }
    Some(node)
}

/// Derive the visible window and embed it as a nested tree.
///
/// The synthetic root carries the root weight, the full `[0, 1]` scale
/// range, and rank 0. Per-level meta accumulates derived weights so the
/// rendering layer can normalize offsets against level totals.
#[must_use]
pub fn derive_visible_tree(inputs: &ViewInputs<'_>) -> TreeInfo {
    let levels = flat_filter(inputs);

    let mut tree = EmbeddedNode {
        name: inputs
            .labels
            .child_name(inputs.qc_spec.root_entity_type, inputs.root_id),
        weight: inputs.root.weight,
        children: ChildMap::new(),
        children_sum_weight: 0.0,
        total_offset_on_level: OffsetInfo::default(),
        total_offset_among_siblings: OffsetInfo::default(),
        is_selected: inputs.selection.contains_path(&[]),
        scale_ends: ScaleEnds::FULL,
        spec_metric: None,
    };
    let mut meta = vec![LevelInfo {
        total_weight: inputs.root.weight,
        total_nodes: 1,
    }];

    // Level-wide ranks of the previously embedded level, by path.
    let mut parent_ranks: FxHashMap<Vec<NodeId>, usize> = FxHashMap::default();
    parent_ranks.insert(Vec::new(), 0);

    for (depth, entries) in levels.iter().enumerate().skip(1) {
        let control = &inputs.controls[depth - 1];
        let level_kind = inputs.qc_spec.kind_at_depth(depth);

        // Slice widths come from a per-parent child count, not from the
        // level-wide total.
        let mut child_counts: FxHashMap<&[NodeId], usize> = FxHashMap::default();
        for entry in entries {
            let parent_path = &entry.path[..entry.path.len() - 1];
            *child_counts.entry(parent_path).or_insert(0) += 1;
        }

        let mut sorted: Vec<&LevelEntry<'_>> = entries.iter().collect();
        sorted.sort_by(|a, b| {
            let pa = &a.path[..a.path.len() - 1];
            let pb = &b.path[..b.path.len() - 1];
            let ra = parent_ranks.get(pa).copied().unwrap_or(0);
            let rb = parent_ranks.get(pb).copied().unwrap_or(0);
            ra.cmp(&rb)
                .then_with(|| a.derived_weight.total_cmp(&b.derived_weight))
                .then_with(|| b.path.last().cmp(&a.path.last()))
        });

        let mut level_weight = 0.0;
        let mut level_rank = 0usize;
        let mut next_ranks: FxHashMap<Vec<NodeId>, usize> = FxHashMap::default();

        for entry in sorted {
            let Some((id, parent_path)) = entry.path.split_last() else {
                continue;
            };
            let Some(parent) = embedded_at_mut(&mut tree, parent_path) else {
                continue;
            };
            let siblings = child_counts
                .get(parent_path)
                .copied()
                .unwrap_or(1)
                .max(1) as f64;
            let width = (parent.scale_ends.max - parent.scale_ends.min) / siblings;
            let min = parent.scale_ends.min + parent.children.len() as f64 * width;
            let max = min + width;

            let node = EmbeddedNode {
                name: level_kind.map_or_else(
                    || PLACEHOLDER_NAME.to_string(),
                    |kind| inputs.labels.child_name(kind, id),
                ),
                weight: entry.node.weight,
                children: ChildMap::new(),
                children_sum_weight: 0.0,
                total_offset_on_level: OffsetInfo {
                    rank: level_rank,
                    weight: level_weight,
                },
                total_offset_among_siblings: OffsetInfo {
                    rank: parent.children.len(),
                    weight: parent.children_sum_weight,
                },
                is_selected: inputs.selection.contains_path(&entry.path),
                scale_ends: ScaleEnds {
                    min,
                    max,
                    mid: (min + max) / 2.0,
                },
                // The ranking weight is reused here instead of re-running
                // the metric engine; see DESIGN.md.
                spec_metric: (control.size_base == SizeBase::Specialization).then(|| Metric {
                    raw: entry.node.weight,
                    normalized: 0.0,
                }),
            };

            parent.children_sum_weight += entry.derived_weight;
            parent.children.insert(id.clone(), node);
            next_ranks.insert(entry.path.clone(), level_rank);
            level_weight += entry.derived_weight;
            level_rank += 1;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            level = depth,
            nodes = level_rank,
            total_weight = level_weight,
            "level embedded"
        );

        meta.push(LevelInfo {
            total_weight: level_weight,
            total_nodes: level_rank,
        });
        parent_ranks = next_ranks;
    }

    TreeInfo { tree, meta }
}
