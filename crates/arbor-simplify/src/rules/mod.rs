//! Rewrite families used by the simplification search.
//!
//! Each family offers a contraction (fewer, larger terms) and an expansion
//! (more, smaller terms). An operation rewrites the node in place and
//! reports whether it fired; the result is not reduced, callers reduce it.

pub mod arithmetic;
pub mod exp_log;
pub mod logic;
pub mod trig;

use arbor_core::{Arena, Node, Result};

/// A rewrite applied to one node.
pub type Operation = fn(&mut Arena, Node) -> Result<bool>;

/// Contractions, tried in order.
pub const CONTRACTIONS: &[Operation] = &[
    exp_log::contract_ln,
    arithmetic::contract_abs,
    exp_log::contract_exp,
    trig::contract_trig,
    arithmetic::contract_mult,
];

/// Expansions, tried in order.
pub const EXPANSIONS: &[Operation] = &[
    arithmetic::expand_abs,
    exp_log::expand_ln,
    exp_log::expand_exp,
    trig::expand_trig,
    arithmetic::expand_power,
    arithmetic::expand_mult,
];

/// Applies the first contraction that fires on `node`.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn shallow_contract(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_any(arena, node, CONTRACTIONS)
}

/// Applies the first expansion that fires on `node`.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn shallow_expand(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_any(arena, node, EXPANSIONS)
}

fn apply_any(arena: &mut Arena, node: Node, operations: &[Operation]) -> Result<bool> {
    for operation in operations {
        if operation(arena, node)? {
            return Ok(true);
        }
    }
    Ok(false)
}
