//! # arbor-core
//!
//! Compact expression storage for the arbor kernel.
//!
//! This crate provides:
//! - A single byte arena holding every live tree in preorder
//! - Offset handles and self-relocating cursors
//! - Splicing primitives (clone, move over, remove, insert before/after)
//! - Number encodings, builders and an s-expression notation
//! - A numeric evaluator and checkpoint-based recovery
//!
//! ## Design Principles
//!
//! - **Pointer-Free Encoding**: a node is a tag byte, its payload and then
//!   its children; sizes are recomputed, never stored
//! - **Build at the Tail**: new trees are appended past all live content and
//!   spliced into place once complete
//! - **One Relocation Table**: cursors are ids whose offsets are rewritten by
//!   the byte primitives and nowhere else

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod approx;
pub mod arena;
pub mod builder;
pub mod checkpoint;
pub mod cursor;
pub mod error;
pub mod handle;
pub mod number;
pub mod sexpr;
pub mod tag;
pub mod tree;

#[cfg(test)]
mod proptests;

pub use approx::{Approximator, StandardApproximation};
pub use arena::{Arena, DEFAULT_CAPACITY};
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use handle::Node;
pub use number::Number;
pub use sexpr::{ParseError, TreeDisplay};
pub use tag::{Constant, Tag};
pub use tree::{Children, Descendants};
