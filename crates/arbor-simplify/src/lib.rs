//! # arbor-simplify
//!
//! Simplification passes over trees stored in an [`arbor_core::Arena`].
//!
//! This crate provides:
//! - A total canonical order and n-ary helpers (flatten, sort, squash)
//! - Pattern matching with placeholders and rule tables
//! - Projection onto a reduced vocabulary and back (beautification)
//! - Systematic reduction to a canonical form
//! - A bounded search over contractions and expansions
//!
//! ## Pipeline
//!
//! [`Simplifier`] projects the input, reduces it systematically, searches
//! for a simpler equivalent under a [`metric::Metric`] and finally
//! beautifies the result. Everything runs under a checkpoint: when an exact
//! computation cannot go on, the work is rolled back and retried with
//! floats.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod advanced;
pub mod beautification;
pub mod comparison;
pub mod engine;
pub mod metric;
pub mod n_ary;
pub mod pattern;
pub mod projection;
pub mod rules;
pub mod set;
pub mod systematic;

#[cfg(test)]
mod proptests;

pub use advanced::{advanced_reduce, SearchConfig};
pub use beautification::deep_beautify;
pub use comparison::{compare, Order};
pub use engine::{SimplificationStats, Simplifier, SimplifierConfig, SimplifyError};
pub use metric::{Metric, MetricKind};
pub use n_ary::sort_children;
pub use pattern::{match_and_replace, match_replace_and_simplify, Pattern, Placeholder, Rule};
pub use projection::{basic_reduce, deep_project, Strategy};
pub use systematic::{deep_reduce, shallow_reduce};
