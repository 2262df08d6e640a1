//! Global and continent-scoped RCA calculators.
//!
//! Both calculators share one factory contract: given a bifurcation scheme,
//! a level, the parent node, and the root's metadata, they return a closure
//! mapping `(child weight, child id)` to a metric. A missing baseline table
//! never fails the derivation; it resolves to the empty calculator, which
//! reports zero for every child.

use rustc_hash::FxHashMap;
use serde::Serialize;

use quercus_core::{EntityKind, QcSpec, RootMeta, WeightedNode};

/// A raw comparative score plus its log-scaled display form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    /// Ratio of local share to baseline expected share.
    pub raw: f64,
    /// `log2(raw) / 2`, the form the color ramp consumes.
    pub normalized: f64,
}

impl Metric {
    /// The empty calculator's answer.
    pub const ZERO: Metric = Metric {
        raw: 0.0,
        normalized: 0.0,
    };
}

/// Maps `(child weight, child id)` to a metric.
pub type MetricCalculator<'a> = Box<dyn Fn(f64, &str) -> Metric + 'a>;

/// The metric flavors the control panel can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    GlobalRca,
    ContinentRca,
}

impl MetricKind {
    /// Display name shown in the metric selector.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::GlobalRca => "Global RCA",
            Self::ContinentRca => "Continent level RCA",
        }
    }

    /// Resolve a selector display name. Unknown names select no calculator.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Global RCA" => Some(Self::GlobalRca),
            "Continent level RCA" => Some(Self::ContinentRca),
            _ => None,
        }
    }
}

/// Flat and continent-sliced RCA baseline tables per entity kind.
#[derive(Debug, Clone, Default)]
pub struct RcaBases {
    /// `kind → id → rate`.
    pub global: FxHashMap<EntityKind, FxHashMap<String, f64>>,
    /// `kind → continent id → id → rate`.
    pub continent: FxHashMap<EntityKind, FxHashMap<String, FxHashMap<String, f64>>>,
}

impl RcaBases {
    /// Bases with the built-in global concept table registered.
    #[must_use]
    pub fn with_builtin_concepts() -> Self {
        let mut bases = Self::default();
        bases
            .global
            .insert(EntityKind::Concept, concept_global_base());
        bases
    }
}

/// The calculator every degraded lookup falls back to.
#[must_use]
pub fn empty_calculator<'a>() -> MetricCalculator<'a> {
    Box::new(|_, _| Metric::ZERO)
}

/// Build the calculator for `kind` at `level` of `qc_spec`.
///
/// `parent` supplies the level's total weight (a missing parent or zero
/// weight falls back to 1 so shares stay finite); `root_meta` supplies the
/// continent slice for [`MetricKind::ContinentRca`].
#[must_use]
pub fn metric_calculator<'a>(
    kind: MetricKind,
    qc_spec: &QcSpec,
    level: usize,
    parent: Option<&WeightedNode>,
    root_meta: &RootMeta,
    bases: &'a RcaBases,
) -> MetricCalculator<'a> {
    let Some(att_kind) = qc_spec.kind_at_depth(level) else {
        return empty_calculator();
    };
    let base = match kind {
        MetricKind::GlobalRca => bases.global.get(&att_kind),
        MetricKind::ContinentRca => {
            let Some(per_continent) = bases.continent.get(&att_kind) else {
                return empty_calculator();
            };
            let continent = root_meta
                .scope_value(EntityKind::Continent)
                .unwrap_or_default();
            per_continent.get(&continent)
        }
    };
    rca_calculator(parent, base)
}

fn rca_calculator<'a>(
    parent: Option<&WeightedNode>,
    base: Option<&'a FxHashMap<String, f64>>,
) -> MetricCalculator<'a> {
    let Some(base) = base else {
        return empty_calculator();
    };
    let total = match parent {
        Some(node) if node.weight != 0.0 => node.weight,
        _ => 1.0,
    };
    Box::new(move |weight, child_id| {
        let child_rate = weight / total;
        // A missing id leaves the rate undefined; the division is left
        // unguarded and the non-finite score propagates.
        let raw = child_rate / base.get(child_id).copied().unwrap_or(f64::NAN);
        Metric {
            raw,
            normalized: raw.log2() / 2.0,
        }
    })
}

/// Built-in global expected shares for top-level concepts.
#[must_use]
pub fn concept_global_base() -> FxHashMap<String, f64> {
    [
        ("44783", 0.011),
        ("11568", 0.028),
        ("18966", 0.027),
        ("44048", 0.141),
        ("21044", 0.077),
        ("64020", 0.042),
        ("4578", 0.015),
        ("16583", 0.515),
        ("10484", 0.05),
        ("11797", 0.428),
        ("58847", 0.35),
        ("32279", 0.074),
        ("7501", 0.122),
        ("7922", 0.027),
        ("25155", 0.136),
        ("19974", 0.1),
        ("38043", 0.008),
        ("48940", 0.032),
        ("31340", 0.253),
    ]
    .into_iter()
    .map(|(id, rate)| (id.to_string(), rate))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quercus_core::Bifurcation;

    fn concept_spec() -> QcSpec {
        QcSpec {
            title: String::new(),
            description: String::new(),
            root_entity_type: EntityKind::Institution,
            bifurcations: vec![Bifurcation {
                attribute_kind: EntityKind::Concept,
                resolver_id: "concept".into(),
                description: String::new(),
                control_format_str: String::new(),
            }],
        }
    }

    #[test]
    fn global_rca_worked_example() {
        // Root weight 1000, child weight 300, baseline 0.3:
        // raw = (300/1000)/0.3 = 1.0, normalized = log2(1)/2 = 0.
        let mut bases = RcaBases::default();
        bases.global.insert(
            EntityKind::Concept,
            [("c1".to_string(), 0.3)].into_iter().collect(),
        );
        let root = WeightedNode::leaf(1000.0);
        let calc = metric_calculator(
            MetricKind::GlobalRca,
            &concept_spec(),
            1,
            Some(&root),
            &RootMeta::default(),
            &bases,
        );
        let metric = calc(300.0, "c1");
        assert_eq!(metric.raw, 1.0);
        assert_eq!(metric.normalized, 0.0);
    }

    #[test]
    fn missing_baseline_table_gives_empty_calculator() {
        let bases = RcaBases::default();
        let root = WeightedNode::leaf(1000.0);
        let calc = metric_calculator(
            MetricKind::GlobalRca,
            &concept_spec(),
            1,
            Some(&root),
            &RootMeta::default(),
            &bases,
        );
        assert_eq!(calc(300.0, "c1"), Metric::ZERO);
    }

    #[test]
    fn missing_baseline_id_is_not_clamped() {
        let mut bases = RcaBases::default();
        bases
            .global
            .insert(EntityKind::Concept, FxHashMap::default());
        let root = WeightedNode::leaf(1000.0);
        let calc = metric_calculator(
            MetricKind::GlobalRca,
            &concept_spec(),
            1,
            Some(&root),
            &RootMeta::default(),
            &bases,
        );
        assert!(calc(300.0, "nowhere").raw.is_nan());
    }

    #[test]
    fn continent_rca_slices_by_root_continent() {
        let mut bases = RcaBases::default();
        bases.continent.insert(
            EntityKind::Concept,
            [(
                "eu".to_string(),
                [("c1".to_string(), 0.15)].into_iter().collect(),
            )]
            .into_iter()
            .collect(),
        );
        let root = WeightedNode::leaf(200.0);
        let meta = RootMeta::from_pairs([("continent", "eu")]);
        let calc = metric_calculator(
            MetricKind::ContinentRca,
            &concept_spec(),
            1,
            Some(&root),
            &meta,
            &bases,
        );
        let metric = calc(30.0, "c1");
        assert!((metric.raw - 1.0).abs() < 1e-12);
    }

    #[test]
    fn continent_rca_without_continent_meta_is_empty() {
        let mut bases = RcaBases::default();
        bases.continent.insert(
            EntityKind::Concept,
            [(
                "eu".to_string(),
                [("c1".to_string(), 0.15)].into_iter().collect(),
            )]
            .into_iter()
            .collect(),
        );
        let root = WeightedNode::leaf(200.0);
        let calc = metric_calculator(
            MetricKind::ContinentRca,
            &concept_spec(),
            1,
            Some(&root),
            &RootMeta::default(),
            &bases,
        );
        assert_eq!(calc(30.0, "c1"), Metric::ZERO);
    }

    #[test]
    fn zero_parent_weight_falls_back_to_one() {
        let mut bases = RcaBases::default();
        bases.global.insert(
            EntityKind::Concept,
            [("c1".to_string(), 0.5)].into_iter().collect(),
        );
        let root = WeightedNode::leaf(0.0);
        let calc = metric_calculator(
            MetricKind::GlobalRca,
            &concept_spec(),
            1,
            Some(&root),
            &RootMeta::default(),
            &bases,
        );
        assert_eq!(calc(2.0, "c1").raw, 4.0);
    }

    #[test]
    fn metric_kind_names_round_trip() {
        for kind in [MetricKind::GlobalRca, MetricKind::ContinentRca] {
            assert_eq!(MetricKind::from_name(kind.display_name()), Some(kind));
        }
        assert_eq!(MetricKind::from_name("Sibling level RCA"), None);
    }
}
