#![forbid(unsafe_code)]

//! Baseline tables and comparative metrics for the Quercus impact explorer.
//!
//! # Role in Quercus
//! Every visible node can carry a "specialization" or revealed comparative
//! advantage (RCA) score: the ratio of its local share of weight to a
//! baseline expected share. This crate owns the baseline-table store, the
//! key codec that addresses those tables, and the metric calculators the
//! window selector and embedder consult.
//!
//! # This crate provides
//! - [`BaselineTable`] and [`SpecBaselines`], nested rate tables addressed
//!   by the `"<target>-<basis>-<hierarchy>"` key codec.
//! - [`MetricKind`] and [`metric_calculator`], the global and
//!   continent-scoped RCA calculators.
//! - [`spec_metric`], the basis/hierarchy-resolving specialization score
//!   used as a ranking weight.
//!
//! All lookups degrade to defined fallbacks; the only deliberate sharp edge
//! is a zero or missing baseline rate, which yields a non-finite score and
//! is documented rather than clamped.

/// Baseline rate tables, key codec, and the static basis configuration.
pub mod baseline;
/// Global and continent-scoped RCA calculators.
pub mod rca;
/// The basis/hierarchy-resolving specialization score.
pub mod specialization;

pub use baseline::{
    BaseKeyError, BaselineTable, IGNORED_BASES, SpecBaselines, SpecBasis, spec_base_kind_to_str,
    spec_base_str_to_kind, spec_basis_for,
};
pub use rca::{Metric, MetricCalculator, MetricKind, RcaBases, empty_calculator, metric_calculator};
pub use specialization::spec_metric;
