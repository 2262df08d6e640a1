#![forbid(unsafe_code)]

//! Data model and tree primitives for the Quercus impact explorer.
//!
//! # Role in Quercus
//! `quercus-core` is the shared vocabulary for the derivation pipeline.
//! It owns the recursive tree shapes, the per-level control model, the
//! attribute-label lookup, and the bounded ordered-insert primitive that
//! every ranking step builds on. It performs no I/O and holds no state
//! between derivations.
//!
//! # This crate provides
//! - [`WeightedNode`] and [`SelectionNode`], the read-only source tree and
//!   the sparse user-selection mirror, addressed by [`TreeLike`] paths.
//! - [`ControlSpec`], [`QcSpec`], and [`EntityKind`], the visibility policy
//!   and per-level entity configuration.
//! - [`AttributeLabels`] and [`RootMeta`], display names and root-scoped
//!   attribute metadata with degrading lookups.
//! - [`insert_keeping_order`] and [`BoundedRank`], the sorted-insert
//!   primitive used for top/bottom-K window selection.

/// Attribute labels and root metadata with degrading lookups.
pub mod labels;
/// Binary-search insertion and bounded top/bottom-K ranking.
pub mod ordered;
/// Control specs, qc-specs, and entity kinds.
pub mod spec;
/// Recursive tree shapes and path addressing.
pub mod tree;

pub use labels::{AttributeLabels, AttributeStatics, PLACEHOLDER_NAME, RootMeta};
pub use ordered::{BoundedRank, insert_keeping_order};
pub use spec::{
    BaseScope, Bifurcation, ControlSpec, DEFAULT_LIMIT_N, EntityKind, QcSpec, SizeBase, SpecError,
};
pub use tree::{ChildMap, LevelInfo, NodeId, OffsetInfo, SelectionNode, TreeLike, WeightedNode};
