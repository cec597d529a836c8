//! # arbor-integers
//!
//! Exact arithmetic used by constant folding in the arbor kernel.
//!
//! This crate wraps `dashu` to provide:
//! - Arbitrary precision integers (`Integer`)
//! - Arbitrary precision rationals (`Rational`)
//! - Base-256 little-endian magnitude codecs, the payload format of big
//!   number nodes in the arena
//!
//! ## Performance Notes
//!
//! - Values that fit a machine word never leave the stack inside `dashu`
//! - Conversions to `f64` take an `i64` fast path before falling back to
//!   decimal parsing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod integer;
pub mod rational;

#[cfg(test)]
mod proptests;

pub use integer::Integer;
pub use rational::Rational;
