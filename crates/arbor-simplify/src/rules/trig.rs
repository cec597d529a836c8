//! Trigonometric identities over `trig(A, k) = cos(A - k*pi/2)`.

use std::sync::LazyLock;

use arbor_core::{Arena, Node, Result};

use crate::pattern::build::{add, any, half, int, mult, pow, seq, trig};
use crate::pattern::{apply_first, Placeholder::*, Rule};

static CONTRACT_TRIG: LazyLock<[Rule; 2]> = LazyLock::new(|| {
    [
        Rule::new(
            "pythagoras",
            add([
                seq(A),
                pow(trig(any(B), int(0)), int(2)),
                seq(C),
                pow(trig(any(B), int(1)), int(2)),
                seq(D),
            ]),
            add([int(1), seq(A), seq(C), seq(D)]),
        ),
        // trig(B,C) * trig(D,E) = (trig(B-D, C-E) + trig(B+D, C+E)) / 2
        Rule::new(
            "product-to-sum",
            mult([seq(A), trig(any(B), any(C)), trig(any(D), any(E)), seq(F)]),
            mult([
                half(),
                seq(A),
                seq(F),
                add([
                    trig(
                        add([any(B), mult([int(-1), any(D)])]),
                        add([any(C), mult([int(-1), any(E)])]),
                    ),
                    trig(add([any(B), any(D)]), add([any(C), any(E)])),
                ]),
            ]),
        ),
    ]
});

static EXPAND_TRIG: LazyLock<[Rule; 1]> = LazyLock::new(|| {
    [Rule::new(
        "angle-sum",
        trig(add([seq(A), any(B)]), any(C)),
        add([
            mult([trig(add([seq(A)]), int(0)), trig(any(B), any(C))]),
            mult([
                trig(add([seq(A)]), int(1)),
                trig(any(B), add([any(C), int(-1)])),
            ]),
        ]),
    )]
});

/// Pythagorean identity, then product-to-sum.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn contract_trig(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*CONTRACT_TRIG)
}

/// Splits the angle of a trigonometric function over its last term.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn expand_trig(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*EXPAND_TRIG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systematic::deep_reduce;

    fn apply(text: &str, operation: fn(&mut Arena, Node) -> Result<bool>) -> String {
        let mut arena = Arena::new();
        let node = arena.parse(text).unwrap();
        deep_reduce(&mut arena, node).unwrap();
        assert!(operation(&mut arena, node).unwrap());
        deep_reduce(&mut arena, node).unwrap();
        arena.display(node).to_string()
    }

    #[test]
    fn test_pythagoras_keeps_other_terms() {
        assert_eq!(
            apply("(+ y (^ (trig x 1) 2) (^ (trig x 0) 2))", contract_trig),
            "(+ 1 y)"
        );
    }

    #[test]
    fn test_product_to_sum() {
        // sin(x)cos(x) = sin(2x)/2
        assert_eq!(
            apply("(* (trig x 0) (trig x 1))", contract_trig),
            "(* 1/2 (trig (* 2 x) 1))"
        );
    }

    #[test]
    fn test_angle_sum() {
        assert_eq!(
            apply("(trig (+ x y) 0)", expand_trig),
            "(+ (* (trig x 0) (trig y 0)) (* -1 (trig x 1) (trig y 1)))"
        );
    }
}
