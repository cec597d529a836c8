//! The canonical order.
//!
//! Sorting the children of commutative nodes with [`compare`] makes equal
//! reduced expressions byte-identical. Children must already be reduced.

use std::cmp::Ordering;

use arbor_core::{Arena, Node, Tag};
use smallvec::SmallVec;

/// Which flavour of the order to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Order {
    /// Keeps like terms adjacent for reduction.
    #[default]
    System,
    /// Display order: a sum or product ranks by its last child against a
    /// higher-ranked node, so `2x` sits next to `x`.
    User,
}

/// Compares two trees in [`Order::System`].
#[must_use]
pub fn compare(arena: &Arena, a: Node, b: Node) -> Ordering {
    compare_with(arena, a, b, Order::System)
}

/// Byte equality; meaningful once both sides are reduced.
#[must_use]
pub fn are_equal(arena: &Arena, a: Node, b: Node) -> bool {
    arena.tree_is_identical(a, b)
}

/// Compares two trees.
#[must_use]
pub fn compare_with(arena: &Arena, a: Node, b: Node, order: Order) -> Ordering {
    let (tag_a, tag_b) = (arena.tag(a), arena.tag(b));
    if tag_a > tag_b {
        return compare_with(arena, b, a, order).reverse();
    }
    if tag_b.is_number() {
        return compare_numbers(arena, a, b);
    }
    if tag_a < tag_b {
        if tag_a == Tag::Power {
            // x < x^2 and 1/x < x: a non-power node behaves like itself^1
            return match compare_with(arena, arena.child(a, 0), b, order) {
                Ordering::Equal => compare_with_one(arena, arena.child(a, 1)),
                other => other,
            };
        }
        if order == Order::User && matches!(tag_a, Tag::Addition | Tag::Multiplication) {
            return match compare_with(arena, arena.last_child(a), b, order) {
                Ordering::Equal => Ordering::Greater,
                other => other,
            };
        }
        return Ordering::Less;
    }
    if tag_a.is_user_named() {
        let name_a = arena.symbol_name(a).unwrap_or_default();
        let name_b = arena.symbol_name(b).unwrap_or_default();
        let by_name = name_a.as_bytes().cmp(name_b.as_bytes());
        if by_name != Ordering::Equal {
            return by_name;
        }
    }
    if tag_a == Tag::Polynomial {
        let by_exponents = arena
            .polynomial_exponents(a)
            .cmp(arena.polynomial_exponents(b));
        if by_exponents != Ordering::Equal {
            return by_exponents;
        }
    }
    if tag_a == Tag::Decimal {
        let by_digits = arena.decimal_digits(a).cmp(&arena.decimal_digits(b));
        if by_digits != Ordering::Equal {
            return by_digits;
        }
    }
    compare_children(
        arena,
        a,
        b,
        order,
        matches!(tag_a, Tag::Addition | Tag::Multiplication),
    )
}

fn compare_numbers(arena: &Arena, a: Node, b: Node) -> Ordering {
    match (arena.constant_value(a), arena.constant_value(b)) {
        (Some(ka), Some(kb)) => return ka.cmp(&kb),
        (Some(_), None) => return Ordering::Greater,
        (None, Some(_)) => return Ordering::Less,
        (None, None) => {}
    }
    if let (Some(x), Some(y)) = (arena.rational_value(a), arena.rational_value(b)) {
        return x.cmp(&y);
    }
    arena.approximate(a).total_cmp(&arena.approximate(b))
}

fn compare_with_one(arena: &Arena, exponent: Node) -> Ordering {
    if arena.tag(exponent).is_number() && arena.constant_value(exponent).is_none() {
        arena.approximate(exponent).total_cmp(&1.0)
    } else {
        Ordering::Greater
    }
}

/// Pairwise comparison, last children first when `backward`. When one list
/// runs out, the node with fewer children ranks greater.
fn compare_children(arena: &Arena, a: Node, b: Node, order: Order, backward: bool) -> Ordering {
    let left: SmallVec<[Node; 8]> = arena.children(a).collect();
    let right: SmallVec<[Node; 8]> = arena.children(b).collect();
    for i in 0..left.len().min(right.len()) {
        let (x, y) = if backward {
            (left[left.len() - 1 - i], right[right.len() - 1 - i])
        } else {
            (left[i], right[i])
        };
        let ordering = compare_with(arena, x, y, order);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    right.len().cmp(&left.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(left: &str, right: &str) -> Ordering {
        let mut arena = Arena::new();
        let a = arena.parse(left).unwrap();
        let b = arena.parse(right).unwrap();
        compare(&arena, a, b)
    }

    #[test]
    fn test_numbers_by_value() {
        assert_eq!(cmp("3", "1/2"), Ordering::Greater);
        assert_eq!(cmp("-7", "2"), Ordering::Less);
        assert_eq!(cmp("0.5", "1/2"), Ordering::Equal);
        assert_eq!(cmp("1000", "pi"), Ordering::Less);
        assert_eq!(cmp("x", "1000"), Ordering::Greater);
    }

    #[test]
    fn test_power_exception() {
        assert_eq!(cmp("x", "(^ x 2)"), Ordering::Less);
        assert_eq!(cmp("(^ x -1)", "x"), Ordering::Less);
        assert_eq!(cmp("(^ x 2)", "y"), Ordering::Less);
        assert_eq!(cmp("(^ y 2)", "x"), Ordering::Greater);
    }

    #[test]
    fn test_children_and_arity() {
        assert_eq!(cmp("(f 0)", "(f 1)"), Ordering::Less);
        assert_eq!(cmp("(set 0 1 4)", "(set 0 2 3)"), Ordering::Less);
        assert_eq!(cmp("(set 0 1)", "(set 0 1 4)"), Ordering::Greater);
        // sums compare from their last term
        assert_eq!(cmp("(+ 5 x)", "(+ 1 y)"), Ordering::Less);
    }

    #[test]
    fn test_names() {
        assert_eq!(cmp("a", "b"), Ordering::Less);
        assert_eq!(cmp("ab", "a"), Ordering::Greater);
        assert_eq!(cmp("(f x)", "(g a)"), Ordering::Less);
    }

    #[test]
    fn test_user_order_keeps_coefficient_next_to_term() {
        let mut arena = Arena::new();
        let product = arena.parse("(* 2 x)").unwrap();
        let x = arena.parse("x").unwrap();
        let y = arena.parse("y").unwrap();
        assert_eq!(compare_with(&arena, product, x, Order::User), Ordering::Greater);
        assert_eq!(compare_with(&arena, product, y, Order::User), Ordering::Less);
        assert_eq!(compare(&arena, product, x), Ordering::Less);
    }
}
