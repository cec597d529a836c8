//! Sorted, duplicate-free sets and variable collection.

use std::cmp::Ordering;

use arbor_core::{Arena, Node, Result, Tag};
use smallvec::SmallVec;

use crate::comparison::compare;
use crate::n_ary;

/// Sorts the elements of a set and drops duplicates.
///
/// # Errors
///
/// Returns [`arbor_core::Error::ArenaExhausted`] if the sorted copy does not
/// fit.
pub fn sort_and_dedup(arena: &mut Arena, set: Node) -> Result<bool> {
    let mut changed = n_ary::sort_children(arena, set, crate::comparison::Order::System)?;
    let mut index = 1;
    while index < arena.number_of_children(set) {
        let previous = arena.child(set, index - 1);
        let current = arena.child(set, index);
        if compare(arena, previous, current) == Ordering::Equal {
            n_ary::remove_child_at(arena, set, index)?;
            changed = true;
        } else {
            index += 1;
        }
    }
    Ok(changed)
}

/// Whether `set` holds an element equal to `element`.
#[must_use]
pub fn contains(arena: &Arena, set: Node, element: Node) -> bool {
    arena
        .children(set)
        .any(|child| compare(arena, child, element) == Ordering::Equal)
}

/// Moves the detached tree `element` into its sorted position in `set`.
/// A duplicate is discarded instead. Returns whether the set grew.
///
/// # Errors
///
/// Returns [`arbor_core::Error::ArityOverflow`] past 255 elements.
pub fn insert(arena: &mut Arena, set: Node, element: Node) -> Result<bool> {
    let children: SmallVec<[Node; 8]> = arena.children(set).collect();
    let mut index = children.len();
    for (position, &child) in children.iter().enumerate() {
        match compare(arena, child, element) {
            Ordering::Less => {}
            Ordering::Equal => {
                arena.remove_tree(element);
                return Ok(false);
            }
            Ordering::Greater => {
                index = position;
                break;
            }
        }
    }
    n_ary::add_child_at(arena, set, index, element)?;
    Ok(true)
}

/// Adds copies of every element of `other` to `set`.
///
/// # Errors
///
/// Returns an error if the arena is full or the set outgrows 255 elements.
pub fn union(arena: &mut Arena, set: Node, other: Node) -> Result<()> {
    let on_other = arena.cursor(other)?;
    let count = arena.number_of_children(other);
    let result = (|| -> Result<()> {
        for index in 0..count {
            let Some(other) = arena.resolve(on_other) else {
                break;
            };
            let copy = arena.clone_tree(arena.child(other, index))?;
            insert(arena, set, copy)?;
        }
        Ok(())
    })();
    arena.release(on_other);
    result
}

/// Collects the distinct variables of a tree into a new set at the tail.
///
/// # Errors
///
/// Returns an error if the arena is full or there are more than 255
/// variables.
pub fn variables(arena: &mut Arena, node: Node) -> Result<Node> {
    let symbols: SmallVec<[Node; 8]> = arena
        .descendants(node)
        .filter(|&descendant| arena.tag(descendant) == Tag::UserSymbol)
        .collect();
    let set = arena.push_n_ary(Tag::Set, 0)?;
    for symbol in symbols {
        let copy = arena.clone_tree(symbol)?;
        insert(arena, set, copy)?;
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_and_dedup() {
        let mut arena = Arena::new();
        let set = arena.parse("(set 3 x 1 x 3)").unwrap();
        assert!(sort_and_dedup(&mut arena, set).unwrap());
        assert_eq!(arena.display(set).to_string(), "(set 1 3 x)");
    }

    #[test]
    fn test_insert_and_contains() {
        let mut arena = Arena::new();
        let set = arena.parse("(set a c)").unwrap();
        let b = arena.parse("b").unwrap();
        assert!(insert(&mut arena, set, b).unwrap());
        let again = arena.parse("c").unwrap();
        assert!(!insert(&mut arena, set, again).unwrap());
        assert_eq!(arena.display(set).to_string(), "(set a b c)");
        let probe = arena.parse("b").unwrap();
        assert!(contains(&arena, set, probe));
    }

    #[test]
    fn test_union() {
        let mut arena = Arena::new();
        let set = arena.parse("(set 1 y)").unwrap();
        let other = arena.parse("(set 2 y z)").unwrap();
        union(&mut arena, set, other).unwrap();
        assert_eq!(arena.display(set).to_string(), "(set 1 2 y z)");
        assert_eq!(arena.live_cursors(), 0);
    }

    #[test]
    fn test_variables() {
        let mut arena = Arena::new();
        let node = arena.parse("(+ (* 2 y) (exp x) (f y))").unwrap();
        let set = variables(&mut arena, node).unwrap();
        assert_eq!(arena.display(set).to_string(), "(set x y)");
    }
}
