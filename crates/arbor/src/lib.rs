//! # Arbor
//!
//! A symbolic expression kernel written in Rust.
//!
//! Expressions live in one byte arena as pointer-free preorder trees and are
//! rewritten in place. Numbers stay exact until a computation cannot, at
//! which point the work is rolled back and redone with floats.
//!
//! ## Features
//!
//! - **Compact Storage**: tag-and-payload nodes in a single growable buffer
//! - **Arbitrary Precision**: big integers and rationals
//! - **Canonical Forms**: total order and systematic reduction
//! - **Search-Based Simplification**: contractions and expansions under a
//!   metric
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor::prelude::*;
//!
//! let simplifier = Simplifier::new();
//! let result = simplifier.simplify_str("(+ (^ (sin x) 2) (^ (cos x) 2))").unwrap();
//! assert_eq!(result, "1");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use arbor_core as core;
pub use arbor_integers as integers;
pub use arbor_simplify as simplify;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use arbor_core::{Arena, Cursor, Error, Node, Tag};
    pub use arbor_integers::{Integer, Rational};
    pub use arbor_simplify::{Simplifier, SimplifierConfig, Strategy};
}
