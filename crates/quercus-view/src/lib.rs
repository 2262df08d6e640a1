#![forbid(unsafe_code)]

//! Window selection and tree embedding for the Quercus impact explorer.
//!
//! # Role in Quercus
//! This crate turns the full weighted tree plus the user's controls and
//! selection into the bounded window that actually gets rendered. It is
//! synchronous, side-effect-free over its inputs, and recomputes wholesale
//! on every change: each derivation is bounded by the sum of per-level
//! quotas, not by the dataset size.
//!
//! # This crate provides
//! - [`flat_filter`], the per-level window selector: forced inclusions
//!   first, then a balanced top/bottom-K fill split across parents.
//! - [`derive_visible_tree`], the embedder that nests the flat selection
//!   into an [`EmbeddedNode`] tree with ranks, weight offsets, and
//!   proportional scale slices.
//! - [`level_visuals`], the per-level vertical band layout.
//!
//! # Data flow
//! raw tree + controls + selection → [`flat_filter`] →
//! [`derive_visible_tree`] → embedded tree + per-level meta → rendering
//! layer (out of scope).

/// The embedder: flat per-level lists into a nested, addressable tree.
pub mod embed;
/// Screen-space vertical bands per level.
pub mod visual;
/// The per-level window selector.
pub mod window;

pub use embed::{EmbeddedNode, ScaleEnds, TreeInfo, derive_visible_tree};
pub use visual::{LevelBand, level_visuals};
pub use window::{LevelEntry, ViewInputs, flat_filter};
