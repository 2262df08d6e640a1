//! The per-level window selector.
//!
//! Starting from the previous level's visible parents, each level produces
//! a flat list of `{path, node, derived weight}` entries: selected
//! children first (never dropped), then include-listed ids, then a
//! balanced top/bottom-K fill that splits the remaining quota across
//! parents. A level is only processed at all while something on the
//! previous level is selected; the first quiet level stops the derivation.

use std::cmp::Ordering;

use rustc_hash::FxHashSet;

use quercus_core::{
    AttributeLabels, BoundedRank, ControlSpec, NodeId, QcSpec, RootMeta, SelectionNode, SizeBase,
    TreeLike, WeightedNode,
};
use quercus_metrics::{SpecBaselines, spec_metric};

/// Immutable snapshot of everything one derivation reads.
#[derive(Clone, Copy)]
pub struct ViewInputs<'a> {
    /// Full weighted tree; read-only.
    pub root: &'a WeightedNode,
    /// Id of the root entity, used for its display name.
    pub root_id: &'a str,
    /// Bifurcation scheme defining each level's entity kind.
    pub qc_spec: &'a QcSpec,
    /// Visibility policy, one entry per level.
    pub controls: &'a [ControlSpec],
    /// Sparse selection mirror; read-only here.
    pub selection: &'a SelectionNode,
    /// Display names and metadata.
    pub labels: &'a AttributeLabels,
    /// Root entity's attribute metadata (continent, country, …).
    pub root_meta: &'a RootMeta,
    /// Specialization baseline tables.
    pub baselines: &'a SpecBaselines,
}

/// One visible node of one level, as selected by [`flat_filter`].
#[derive(Debug, Clone)]
pub struct LevelEntry<'t> {
    /// Ids from the root to this node.
    pub path: Vec<NodeId>,
    /// The underlying weighted node.
    pub node: &'t WeightedNode,
    /// Ranking weight for this level: raw weight in volume mode, the
    /// specialization score in specialization mode.
    pub derived_weight: f64,
}

/// Select the visible window, level by level.
///
/// Level 0 is always the root entry. Each subsequent level is produced
/// only while at least one node of the previous level is present in the
/// selection tree; remaining controls are ignored once that gate fails.
#[must_use]
pub fn flat_filter<'a>(inputs: &ViewInputs<'a>) -> Vec<Vec<LevelEntry<'a>>> {
    let mut levels: Vec<Vec<LevelEntry<'a>>> = vec![vec![LevelEntry {
        path: Vec::new(),
        node: inputs.root,
        derived_weight: inputs.root.weight,
    }]];

    for (depth, control) in inputs.controls.iter().enumerate() {
        let next = {
            let parents = &levels[depth];
            if !parents
                .iter()
                .any(|p| inputs.selection.contains_path(&p.path))
            {
                #[cfg(feature = "tracing")]
                tracing::debug!(level = depth + 1, "nothing selected, stopping derivation");
                break;
            }
            fill_level(inputs, parents, control)
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(level = depth + 1, nodes = next.len(), "level selected");
        levels.push(next);
    }
    levels
}

/// Derived ranking weight for one candidate child.
fn derived_weight(
    inputs: &ViewInputs<'_>,
    control: &ControlSpec,
    path: &[NodeId],
    node: &WeightedNode,
) -> f64 {
    match control.size_base {
        SizeBase::Volume => node.weight,
        SizeBase::Specialization => spec_metric(
            path,
            inputs.root,
            inputs.qc_spec,
            inputs.root_meta,
            inputs.baselines,
        ),
    }
}

fn child_entry<'a>(
    inputs: &ViewInputs<'a>,
    control: &ControlSpec,
    parent: &LevelEntry<'a>,
    id: &str,
    node: &'a WeightedNode,
) -> LevelEntry<'a> {
    let mut path = parent.path.clone();
    path.push(id.to_string());
    let derived_weight = derived_weight(inputs, control, &path, node);
    LevelEntry {
        path,
        node,
        derived_weight,
    }
}

fn fill_level<'a>(
    inputs: &ViewInputs<'a>,
    parents: &[LevelEntry<'a>],
    control: &'a ControlSpec,
) -> Vec<LevelEntry<'a>> {
    let mut out: Vec<LevelEntry<'a>> = Vec::new();
    let mut included: Vec<FxHashSet<&'a str>> = vec![FxHashSet::default(); parents.len()];
    let mut remaining = control.limit_n as isize;

    // (a) Children the user drilled into (present in the selection tree)
    // are shown unconditionally; the quota may go negative here.
    for (pi, parent) in parents.iter().enumerate() {
        let Some(selected) = inputs.selection.node_at(&parent.path) else {
            continue;
        };
        for id in selected.children.keys() {
            let Some(node) = parent.node.children.get(id) else {
                continue;
            };
            out.push(child_entry(inputs, control, parent, id, node));
            included[pi].insert(id.as_str());
            remaining -= 1;
        }
    }
    if remaining <= 0 {
        return out;
    }

    // (b) Include-listed ids, per qualifying parent, until quota runs out.
    'include: for id in &control.include {
        for (pi, parent) in parents.iter().enumerate() {
            if included[pi].contains(id.as_str()) {
                continue;
            }
            let Some(node) = parent.node.children.get(id) else {
                continue;
            };
            out.push(child_entry(inputs, control, parent, id, node));
            included[pi].insert(id.as_str());
            remaining -= 1;
            if remaining == 0 {
                break 'include;
            }
        }
    }
    if remaining <= 0 {
        return out;
    }

    // Balanced extremal fill: split what's left across parents,
    // left-to-right. An under-filled parent does not hand its slack to the
    // next one.
    let by_weight =
        |a: &LevelEntry<'a>, b: &LevelEntry<'a>| a.derived_weight.total_cmp(&b.derived_weight);
    let show_top = control.show_top;
    let compare = move |a: &LevelEntry<'a>, b: &LevelEntry<'a>| -> Ordering {
        if show_top { by_weight(a, b) } else { by_weight(b, a) }
    };

    let mut parents_left = parents.len();
    for (pi, parent) in parents.iter().enumerate() {
        let share = (remaining as f64 / parents_left as f64).round() as usize;
        parents_left -= 1;
        if share == 0 {
            continue;
        }
        let mut rank = BoundedRank::new(share);
        for (id, node) in &parent.node.children {
            if control.exclude.iter().any(|e| e == id) {
                continue;
            }
            if included[pi].contains(id.as_str()) {
                continue;
            }
            rank.offer(child_entry(inputs, control, parent, id, node), compare);
        }
        let picked = rank.into_vec();
        remaining -= picked.len() as isize;
        out.extend(picked);
        if remaining <= 0 {
            break;
        }
    }
    out
}
