//! The basis/hierarchy-resolving specialization score.
//!
//! For a node addressed by `path`, the score is the node's weight share
//! (against a divisor picked by the hierarchy scope) divided by a baseline
//! expected share (picked by the basis scope). Which table and which
//! divisor apply is a fixed per-entity-kind configuration, see
//! [`spec_basis_for`](crate::baseline::spec_basis_for).

use quercus_core::{BaseScope, NodeId, QcSpec, RootMeta, TreeLike, WeightedNode};

use crate::baseline::{SpecBaselines, SpecBasis, spec_base_kind_to_str, spec_basis_for};

/// Specialization score for the node at `path`.
///
/// Degrades to defined fallbacks everywhere except the final division: a
/// zero or missing baseline rate yields a non-finite score, which is the
/// documented behavior and must not be clamped here.
#[must_use]
pub fn spec_metric(
    path: &[NodeId],
    root: &WeightedNode,
    qc_spec: &QcSpec,
    root_meta: &RootMeta,
    baselines: &SpecBaselines,
) -> f64 {
    let depth = path.len();
    let (Some(child_id), Some(kind)) = (path.last(), qc_spec.kind_at_depth(depth)) else {
        return 0.0;
    };
    let node_weight = root.node_at(path).map_or(0.0, |n| n.weight);

    let SpecBasis { basis, hierarchy } = spec_basis_for(kind);
    let key = spec_base_kind_to_str(kind, basis, hierarchy);
    let mut table = baselines.table(&key);

    if let BaseScope::Kind(basis_kind) = basis {
        // The slice is picked by the *root's* attribute value, not the
        // current node's.
        table = match root_meta.scope_value(basis_kind) {
            Some(value) => table.and_then(|t| t.dig(&value)),
            None => None,
        };
    }

    let mut divisor = root.weight;
    match hierarchy {
        BaseScope::Kind(hierarchy_kind) => {
            // Walk from the node's parent toward the root; the first
            // ancestor level of the hierarchy kind supplies one more table
            // descent and the divisor. Without a match the divisor keeps
            // its last assignment.
            for prefix_len in (1..depth).rev() {
                if qc_spec.kind_at_depth(prefix_len) == Some(hierarchy_kind) {
                    let ancestor_id = &path[prefix_len - 1];
                    table = table.and_then(|t| t.dig(ancestor_id));
                    if let Some(ancestor) = root.node_at(&path[..prefix_len]) {
                        divisor = ancestor.weight;
                    }
                    break;
                }
            }
        }
        BaseScope::Global => {
            // Normalize against the nearest-to-root ancestor of the root
            // entity kind, excluding the root itself.
            for prefix_len in 1..depth {
                if qc_spec.kind_at_depth(prefix_len) == Some(qc_spec.root_entity_type) {
                    if let Some(ancestor) = root.node_at(&path[..prefix_len]) {
                        divisor = ancestor.weight;
                    }
                    break;
                }
            }
        }
    }

    let node_rate = node_weight / divisor;
    let baseline_rate = table.and_then(|t| t.rate(child_id)).unwrap_or(0.0);
    // Division by a zero baseline is intentionally unguarded.
    node_rate / baseline_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineTable;
    use quercus_core::{Bifurcation, EntityKind};

    fn bifurcation(kind: EntityKind) -> Bifurcation {
        Bifurcation {
            attribute_kind: kind,
            resolver_id: kind.as_str().to_ascii_lowercase(),
            description: String::new(),
            control_format_str: String::new(),
        }
    }

    fn path(ids: &[&str]) -> Vec<NodeId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn table(json: &str) -> BaselineTable {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn global_basis_global_hierarchy() {
        // Concept under an institution root: flat table, root-weight divisor.
        let qc_spec = QcSpec {
            title: String::new(),
            description: String::new(),
            root_entity_type: EntityKind::Institution,
            bifurcations: vec![bifurcation(EntityKind::Concept)],
        };
        let root = WeightedNode::leaf(1000.0).child("c1", WeightedNode::leaf(300.0));
        let mut baselines = SpecBaselines::default();
        baselines.insert("Concept-Global-Global", table(r#"{"c1": 0.3}"#));

        let score = spec_metric(
            &path(&["c1"]),
            &root,
            &qc_spec,
            &RootMeta::default(),
            &baselines,
        );
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn kind_basis_digs_by_root_scope_value() {
        // Country under a continent bifurcation: table sliced by the root
        // institution's continent.
        let qc_spec = QcSpec {
            title: String::new(),
            description: String::new(),
            root_entity_type: EntityKind::Institution,
            bifurcations: vec![bifurcation(EntityKind::Country)],
        };
        let root = WeightedNode::leaf(400.0).child("756", WeightedNode::leaf(100.0));
        let mut baselines = SpecBaselines::default();
        baselines.insert(
            "Country-Continent-Global",
            table(r#"{"eu": {"756": 0.5}, "na": {"756": 0.1}}"#),
        );
        let meta = RootMeta::from_pairs([("continent", "eu")]);

        let score = spec_metric(&path(&["756"]), &root, &qc_spec, &meta, &baselines);
        // (100/400) / 0.5
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn kind_hierarchy_uses_ancestor_weight_and_slice() {
        // SubConcept normalized within its Concept ancestor.
        let qc_spec = QcSpec {
            title: String::new(),
            description: String::new(),
            root_entity_type: EntityKind::Institution,
            bifurcations: vec![
                bifurcation(EntityKind::Concept),
                bifurcation(EntityKind::SubConcept),
            ],
        };
        let root = WeightedNode::leaf(1000.0).child(
            "c1",
            WeightedNode::leaf(200.0).child("s1", WeightedNode::leaf(50.0)),
        );
        let mut baselines = SpecBaselines::default();
        baselines.insert(
            "SubConcept-Global-Concept",
            table(r#"{"c1": {"s1": 0.125}}"#),
        );

        let score = spec_metric(
            &path(&["c1", "s1"]),
            &root,
            &qc_spec,
            &RootMeta::default(),
            &baselines,
        );
        // (50/200) / 0.125
        assert!((score - 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_hierarchy_ancestor_keeps_root_divisor() {
        // No Concept level on the path: divisor keeps its last assignment,
        // the full-tree root weight.
        let qc_spec = QcSpec {
            title: String::new(),
            description: String::new(),
            root_entity_type: EntityKind::Institution,
            bifurcations: vec![bifurcation(EntityKind::SubConcept)],
        };
        let root = WeightedNode::leaf(500.0).child("s1", WeightedNode::leaf(125.0));
        let mut baselines = SpecBaselines::default();
        baselines.insert("SubConcept-Global-Concept", table(r#"{"s1": 0.5}"#));

        let score = spec_metric(
            &path(&["s1"]),
            &root,
            &qc_spec,
            &RootMeta::default(),
            &baselines,
        );
        // (125/500) / 0.5 against the un-dug table
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_baseline_yields_non_finite_score() {
        let qc_spec = QcSpec {
            title: String::new(),
            description: String::new(),
            root_entity_type: EntityKind::Institution,
            bifurcations: vec![bifurcation(EntityKind::Concept)],
        };
        let root = WeightedNode::leaf(1000.0).child("c1", WeightedNode::leaf(300.0));
        let baselines = SpecBaselines::default();

        let score = spec_metric(
            &path(&["c1"]),
            &root,
            &qc_spec,
            &RootMeta::default(),
            &baselines,
        );
        assert!(!score.is_finite());
    }

    #[test]
    fn global_hierarchy_divides_by_nearest_root_kind_ancestor() {
        // Institution level nested under the root institution: institutions
        // below the first institution ancestor normalize against it.
        let qc_spec = QcSpec {
            title: String::new(),
            description: String::new(),
            root_entity_type: EntityKind::Institution,
            bifurcations: vec![
                bifurcation(EntityKind::Institution),
                bifurcation(EntityKind::Concept),
            ],
        };
        let root = WeightedNode::leaf(1000.0).child(
            "i2",
            WeightedNode::leaf(400.0).child("c1", WeightedNode::leaf(100.0)),
        );
        let mut baselines = SpecBaselines::default();
        baselines.insert("Concept-Global-Global", table(r#"{"c1": 0.25}"#));

        let score = spec_metric(
            &path(&["i2", "c1"]),
            &root,
            &qc_spec,
            &RootMeta::default(),
            &baselines,
        );
        // (100/400) / 0.25, divisor from the "i2" institution ancestor
        assert!((score - 1.0).abs() < 1e-12);
    }
}
