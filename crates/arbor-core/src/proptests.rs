//! Property-based tests for the encoding and cursor relocation.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{Arena, Node};

    fn leaf() -> impl Strategy<Value = String> {
        prop_oneof![
            (-300i64..300).prop_map(|n| n.to_string()),
            prop_oneof![1i64..7, -6i64..0].prop_map(|n| format!("{n}/7")),
            prop::sample::select(vec!["x", "y", "z", "pi", "e"]).prop_map(str::to_owned),
        ]
    }

    fn expression() -> impl Strategy<Value = String> {
        leaf().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_map(|children| format!("(+ {})", children.join(" "))),
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_map(|children| format!("(* {})", children.join(" "))),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("(^ {a} {b})")),
                inner.clone().prop_map(|a| format!("(exp {a})")),
                inner.prop_map(|a| format!("(f {a})")),
            ]
        })
    }

    fn sizes_add_up(arena: &Arena, node: Node) -> bool {
        let children: usize = arena.children(node).map(|child| arena.tree_size(child)).sum();
        arena.tree_size(node) == arena.node_size(node) + children
            && arena.children(node).all(|child| sizes_add_up(arena, child))
    }

    proptest! {
        #[test]
        fn clone_is_identity(text in expression()) {
            let mut arena = Arena::new();
            let tree = arena.parse(&text).unwrap();
            let copy = arena.clone_tree(tree).unwrap();
            prop_assert_eq!(arena.tree_bytes(tree), arena.tree_bytes(copy));
            prop_assert!(sizes_add_up(&arena, tree));
            prop_assert_eq!(arena.display(copy).to_string(), text);
        }

        #[test]
        fn cursors_shift_by_inserted_length(
            texts in prop::collection::vec(expression(), 2..5),
            inserted in expression(),
            target in 0usize..4,
        ) {
            let mut arena = Arena::new();
            let roots: Vec<Node> = texts.iter().map(|text| arena.parse(text).unwrap()).collect();
            let cursors: Vec<_> = roots.iter().map(|root| arena.cursor(*root).unwrap()).collect();
            let snapshots: Vec<Vec<u8>> =
                roots.iter().map(|root| arena.tree_bytes(*root).to_vec()).collect();
            let target = target % roots.len();

            let new_tree = arena.parse(&inserted).unwrap();
            let size = arena.tree_size(new_tree);
            arena.move_tree_before(roots[target], new_tree);

            for (index, cursor) in cursors.iter().enumerate() {
                let node = arena.resolve(*cursor).unwrap();
                let expected = if index >= target {
                    roots[index].offset() + size
                } else {
                    roots[index].offset()
                };
                prop_assert_eq!(node.offset(), expected);
                prop_assert_eq!(arena.tree_bytes(node), snapshots[index].as_slice());
            }
        }

        #[test]
        fn sibling_cursor_survives_edit(
            first in expression(),
            second in expression(),
            replacement in expression(),
        ) {
            let mut arena = Arena::new();
            let a = arena.parse(&first).unwrap();
            let b = arena.parse(&second).unwrap();
            let on_b = arena.cursor(b).unwrap();
            let expected = arena.tree_bytes(b).to_vec();
            let new_tree = arena.parse(&replacement).unwrap();
            arena.move_tree_over_tree(a, new_tree);
            let b_now = arena.resolve(on_b).unwrap();
            prop_assert_eq!(arena.tree_bytes(b_now), expected.as_slice());
            prop_assert_eq!(arena.display(a).to_string(), replacement);
        }
    }
}
