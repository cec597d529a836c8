//! Boolean connectives.

use std::sync::LazyLock;

use arbor_core::{Arena, Node, Result, Tag};

use crate::n_ary;
use crate::pattern::build::{any, leaf, not};
use crate::pattern::{apply_first, Placeholder::A, Rule};
use crate::set;

static NEGATIONS: LazyLock<[Rule; 3]> = LazyLock::new(|| {
    [
        Rule::new("not-not", not(not(any(A))), any(A)),
        Rule::new("not-true", not(leaf(Tag::True)), leaf(Tag::False)),
        Rule::new("not-false", not(leaf(Tag::False)), leaf(Tag::True)),
    ]
});

/// Reduces a negation, conjunction or disjunction.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn reduce(arena: &mut Arena, node: Node) -> Result<bool> {
    match arena.tag(node) {
        Tag::LogicalNot => apply_first(arena, node, &*NEGATIONS),
        Tag::LogicalAnd => reduce_connective(arena, node, Tag::False, Tag::True),
        Tag::LogicalOr => reduce_connective(arena, node, Tag::True, Tag::False),
        _ => Ok(false),
    }
}

fn reduce_connective(arena: &mut Arena, node: Node, absorbing: Tag, neutral: Tag) -> Result<bool> {
    let mut changed = n_ary::flatten(arena, node)?;
    if arena.children(node).any(|child| arena.tag(child) == absorbing) {
        let leaf = arena.push(absorbing)?;
        arena.move_tree_over_tree(node, leaf);
        return Ok(true);
    }
    let mut index = 0;
    while index < arena.number_of_children(node) {
        if arena.tag(arena.child(node, index)) == neutral {
            n_ary::remove_child_at(arena, node, index)?;
            changed = true;
        } else {
            index += 1;
        }
    }
    changed |= set::sort_and_dedup(arena, node)?;
    Ok(n_ary::sanitize(arena, node)? || changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systematic::deep_reduce;

    fn reduce(text: &str) -> String {
        let mut arena = Arena::new();
        let node = arena.parse(text).unwrap();
        deep_reduce(&mut arena, node).unwrap();
        arena.display(node).to_string()
    }

    #[test]
    fn test_negation() {
        assert_eq!(reduce("(not (not p))"), "p");
        assert_eq!(reduce("(not true)"), "false");
        assert_eq!(reduce("(not (not (not false)))"), "true");
    }

    #[test]
    fn test_connectives() {
        assert_eq!(reduce("(and p true q)"), "(and p q)");
        assert_eq!(reduce("(and p false)"), "false");
        assert_eq!(reduce("(or q p q)"), "(or p q)");
        assert_eq!(reduce("(or false p)"), "p");
        assert_eq!(reduce("(and true)"), "true");
    }
}
