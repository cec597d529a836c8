//! Helpers for variable-arity nodes.

use std::cmp::Ordering;

use arbor_core::{Arena, Error, Node, Result, Tag};
use smallvec::SmallVec;

use crate::comparison::{compare_with, Order};

/// Splices children of the same tag into their parent:
/// `(+ a (+ b c))` becomes `(+ a b c)`.
///
/// # Errors
///
/// Returns [`arbor_core::Error::ArityOverflow`] past 255 children, leaving
/// the tree untouched.
pub fn flatten(arena: &mut Arena, node: Node) -> Result<bool> {
    let tag = arena.tag(node);
    if !arena.children(node).any(|child| arena.tag(child) == tag) {
        return Ok(false);
    }
    if flattened_len(arena, node, tag) > MAX_CHILDREN {
        return Err(Error::ArityOverflow(tag));
    }
    let mut count = arena.number_of_children(node);
    let mut child = arena.next_node(node);
    let mut index = 0;
    let mut changed = false;
    while index < count {
        if arena.tag(child) == tag {
            let grandchildren = arena.number_of_children(child);
            arena.remove_node(child);
            count = count + grandchildren - 1;
            changed = true;
            // the first grandchild now sits at `child` and is examined next
            continue;
        }
        child = arena.next_tree(child);
        index += 1;
    }
    if changed {
        arena.set_number_of_children(node, count)?;
    }
    Ok(changed)
}

const MAX_CHILDREN: usize = u8::MAX as usize;

fn flattened_len(arena: &Arena, node: Node, tag: Tag) -> usize {
    arena
        .children(node)
        .map(|child| {
            if arena.tag(child) == tag {
                flattened_len(arena, child, tag)
            } else {
                1
            }
        })
        .sum()
}

/// Stable-sorts the children of `node` in the given order.
///
/// # Errors
///
/// Returns [`arbor_core::Error::ArenaExhausted`] if the sorted copy does not
/// fit.
pub fn sort_children(arena: &mut Arena, node: Node, order: Order) -> Result<bool> {
    sort_children_by(arena, node, |arena, a, b| compare_with(arena, a, b, order))
}

/// Stable-sorts the children of `node` with an arbitrary comparator.
///
/// The sorted tree is assembled at the tail and moved over `node`, so the
/// node keeps its offset.
///
/// # Errors
///
/// Returns [`arbor_core::Error::ArenaExhausted`] if the sorted copy does not
/// fit.
pub fn sort_children_by(
    arena: &mut Arena,
    node: Node,
    mut compare: impl FnMut(&Arena, Node, Node) -> Ordering,
) -> Result<bool> {
    let children: SmallVec<[Node; 8]> = arena.children(node).collect();
    let mut permutation: SmallVec<[usize; 8]> = (0..children.len()).collect();
    permutation.sort_by(|&i, &j| compare(arena, children[i], children[j]));
    if permutation.iter().enumerate().all(|(position, &i)| position == i) {
        return Ok(false);
    }
    let sorted = clone_header(arena, node)?;
    for &i in &permutation {
        arena.clone_tree(children[i])?;
    }
    arena.move_tree_over_tree(node, sorted);
    Ok(true)
}

/// Copies the header of `node` (tag and payload, no children) to the tail.
///
/// # Errors
///
/// Returns [`arbor_core::Error::ArenaExhausted`] if the arena is full.
pub fn clone_header(arena: &mut Arena, node: Node) -> Result<Node> {
    let start = node.offset();
    let header = arena.bytes()[start..start + arena.node_size(node)].to_vec();
    arena.push_bytes(&header)
}

/// Moves the detached tree `child` so it becomes the `index`-th child.
///
/// # Errors
///
/// Returns [`arbor_core::Error::ArityOverflow`] past 255 children, in which
/// case `child` stays detached.
pub fn add_child_at(arena: &mut Arena, node: Node, index: usize, child: Node) -> Result<Node> {
    let count = arena.number_of_children(node);
    debug_assert!(index <= count);
    if count >= MAX_CHILDREN {
        return Err(Error::ArityOverflow(arena.tag(node)));
    }
    let anchor = if index == count {
        arena.next_tree(node)
    } else {
        arena.child(node, index)
    };
    let placed = arena.move_tree_before(anchor, child);
    arena.set_number_of_children(node, count + 1)?;
    Ok(placed)
}

/// Deletes the `index`-th child.
///
/// # Errors
///
/// Never fails in practice; the count only shrinks.
pub fn remove_child_at(arena: &mut Arena, node: Node, index: usize) -> Result<()> {
    let count = arena.number_of_children(node);
    let child = arena.child(node, index);
    arena.remove_tree(child);
    arena.set_number_of_children(node, count - 1)
}

/// Replaces a single-child node by that child.
pub fn squash_if_unary(arena: &mut Arena, node: Node) -> bool {
    if arena.number_of_children(node) != 1 {
        return false;
    }
    arena.remove_node(node);
    true
}

/// Replaces a childless node by its neutral element: `0` for sums, `1` for
/// products, `true` for conjunctions and `false` for disjunctions.
///
/// # Errors
///
/// Returns [`arbor_core::Error::ArenaExhausted`] if the arena is full.
pub fn squash_if_empty(arena: &mut Arena, node: Node) -> Result<bool> {
    if arena.number_of_children(node) != 0 {
        return Ok(false);
    }
    let neutral = match arena.tag(node) {
        Tag::Addition => Tag::Zero,
        Tag::Multiplication => Tag::One,
        Tag::LogicalAnd => Tag::True,
        Tag::LogicalOr => Tag::False,
        _ => return Ok(false),
    };
    let leaf = arena.push(neutral)?;
    arena.move_tree_over_tree(node, leaf);
    Ok(true)
}

/// Collapses empty and single-child sums, products and connectives.
///
/// # Errors
///
/// Returns [`arbor_core::Error::ArenaExhausted`] if the arena is full.
pub fn sanitize(arena: &mut Arena, node: Node) -> Result<bool> {
    if !matches!(
        arena.tag(node),
        Tag::Addition | Tag::Multiplication | Tag::LogicalAnd | Tag::LogicalOr
    ) {
        return Ok(false);
    }
    Ok(squash_if_empty(arena, node)? || squash_if_unary(arena, node))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(arena: &Arena, node: Node) -> String {
        arena.display(node).to_string()
    }

    #[test]
    fn test_flatten_nested() {
        let mut arena = Arena::new();
        let node = arena.parse("(+ a (+ (+ b c) d) (+) e)").unwrap();
        assert!(flatten(&mut arena, node).unwrap());
        assert_eq!(display(&arena, node), "(+ a b c d e)");
        assert!(!flatten(&mut arena, node).unwrap());
    }

    fn wide_sum(prefix: &str, count: usize) -> String {
        let terms: Vec<String> = (0..count).map(|i| format!("{prefix}{i}")).collect();
        format!("(+ {})", terms.join(" "))
    }

    #[test]
    fn test_flatten_overflow_leaves_tree_intact() {
        let mut arena = Arena::new();
        let text = format!("(+ a {})", wide_sum("v", 255));
        let node = arena.parse(&text).unwrap();
        let before = arena.bytes().to_vec();
        assert_eq!(
            flatten(&mut arena, node),
            Err(Error::ArityOverflow(Tag::Addition))
        );
        assert_eq!(arena.bytes(), &before[..]);
        assert_eq!(arena.number_of_children(node), 2);
        assert_eq!(display(&arena, node), text);
    }

    #[test]
    fn test_flatten_overflow_through_nesting() {
        let mut arena = Arena::new();
        let text = format!("(+ (+ {} b) {})", wide_sum("u", 128), wide_sum("w", 127));
        let node = arena.parse(&text).unwrap();
        assert!(flatten(&mut arena, node).is_err());
        assert_eq!(display(&arena, node), text);
    }

    #[test]
    fn test_add_child_overflow_keeps_child_detached() {
        let mut arena = Arena::new();
        let node = arena.parse(&wide_sum("v", 255)).unwrap();
        let extra = arena.parse("z").unwrap();
        assert_eq!(
            add_child_at(&mut arena, node, 0, extra),
            Err(Error::ArityOverflow(Tag::Addition))
        );
        assert_eq!(arena.number_of_children(node), 255);
        assert_eq!(display(&arena, extra), "z");
    }

    #[test]
    fn test_sort_keeps_offset() {
        let mut arena = Arena::new();
        let node = arena.parse("(* y 3 x)").unwrap();
        let after = arena.parse("z").unwrap();
        assert!(sort_children(&mut arena, node, Order::System).unwrap());
        assert_eq!(display(&arena, node), "(* 3 x y)");
        assert_eq!(display(&arena, after), "z");
        assert!(!sort_children(&mut arena, node, Order::System).unwrap());
    }

    #[test]
    fn test_add_and_remove_child() {
        let mut arena = Arena::new();
        let node = arena.parse("(+ a c)").unwrap();
        let b = arena.parse("b").unwrap();
        add_child_at(&mut arena, node, 1, b).unwrap();
        assert_eq!(display(&arena, node), "(+ a b c)");
        remove_child_at(&mut arena, node, 0).unwrap();
        assert_eq!(display(&arena, node), "(+ b c)");
    }

    #[test]
    fn test_sanitize() {
        let mut arena = Arena::new();
        let empty = arena.parse("(*)").unwrap();
        assert!(sanitize(&mut arena, empty).unwrap());
        assert_eq!(display(&arena, empty), "1");
        let unary = arena.parse("(+ x)").unwrap();
        assert!(sanitize(&mut arena, unary).unwrap());
        assert_eq!(display(&arena, unary), "x");
        let pair = arena.parse("(+ x y)").unwrap();
        assert!(!sanitize(&mut arena, pair).unwrap());
    }
}
