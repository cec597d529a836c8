//! Property-based tests for the canonical order and reduction.

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use proptest::prelude::*;

    use crate::comparison::{compare, compare_with, Order};
    use crate::n_ary::sort_children;
    use crate::systematic::deep_reduce;
    use arbor_core::Arena;

    fn leaf() -> impl Strategy<Value = String> {
        prop_oneof![
            (-20i64..20).prop_map(|n| n.to_string()),
            prop_oneof![1i64..5, -4i64..0].prop_map(|n| format!("{n}/5")),
            prop::sample::select(vec!["x", "y", "z", "pi"]).prop_map(str::to_owned),
        ]
    }

    /// Expressions without powers, on which the order is lexicographic.
    fn expression() -> impl Strategy<Value = String> {
        leaf().prop_recursive(3, 24, 3, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_map(|children| format!("(+ {})", children.join(" "))),
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_map(|children| format!("(* {})", children.join(" "))),
                inner.clone().prop_map(|a| format!("(ln {a})")),
                inner.prop_map(|a| format!("(f {a})")),
            ]
        })
    }

    fn with_powers() -> impl Strategy<Value = String> {
        prop_oneof![
            expression(),
            (expression(), -3i64..4).prop_map(|(base, n)| format!("(^ {base} {n})")),
        ]
    }

    proptest! {
        #[test]
        fn order_is_antisymmetric(left in with_powers(), right in with_powers()) {
            let mut arena = Arena::new();
            let a = arena.parse(&left).unwrap();
            let b = arena.parse(&right).unwrap();
            for order in [Order::System, Order::User] {
                prop_assert_eq!(
                    compare_with(&arena, a, b, order),
                    compare_with(&arena, b, a, order).reverse()
                );
            }
            let copy = arena.clone_tree(a).unwrap();
            prop_assert_eq!(compare(&arena, a, copy), Ordering::Equal);
        }

        #[test]
        fn order_is_transitive(texts in prop::collection::vec(expression(), 3)) {
            let mut arena = Arena::new();
            let mut nodes: Vec<_> = texts.iter().map(|text| arena.parse(text).unwrap()).collect();
            nodes.sort_by(|&a, &b| compare(&arena, a, b));
            prop_assert_ne!(compare(&arena, nodes[0], nodes[1]), Ordering::Greater);
            prop_assert_ne!(compare(&arena, nodes[1], nodes[2]), Ordering::Greater);
            prop_assert_ne!(compare(&arena, nodes[0], nodes[2]), Ordering::Greater);
        }

        #[test]
        fn sorting_is_idempotent(children in prop::collection::vec(expression(), 2..6)) {
            let mut arena = Arena::new();
            let node = arena.parse(&format!("(+ {})", children.join(" "))).unwrap();
            sort_children(&mut arena, node, Order::System).unwrap();
            let sorted = arena.tree_bytes(node).to_vec();
            prop_assert!(!sort_children(&mut arena, node, Order::System).unwrap());
            prop_assert_eq!(arena.tree_bytes(node), sorted.as_slice());
        }

        #[test]
        fn reduction_ignores_operand_order(
            atoms in prop::collection::vec(leaf(), 2..6),
            product in any::<bool>(),
        ) {
            let operator = if product { "*" } else { "+" };
            let mut reversed = atoms.clone();
            reversed.reverse();
            let reduce = |operands: &[String]| {
                let mut arena = Arena::new();
                let node = arena.parse(&format!("({operator} {})", operands.join(" "))).unwrap();
                deep_reduce(&mut arena, node).unwrap();
                arena.display(node).to_string()
            };
            prop_assert_eq!(reduce(&atoms), reduce(&reversed));
        }
    }
}
