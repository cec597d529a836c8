//! Products, powers and absolute values.

use std::sync::LazyLock;

use arbor_core::{Arena, Node, Result};
use arbor_integers::Integer;

use crate::pattern::build::{abs, add, any, int, mult, pow, seq};
use crate::pattern::{apply_first, Bindings, Placeholder::*, Rule};

static CONTRACT_ABS: LazyLock<[Rule; 1]> = LazyLock::new(|| {
    [Rule::new(
        "abs-product",
        mult([seq(A), abs(any(B)), seq(C), abs(any(D)), seq(E)]),
        mult([seq(A), seq(C), abs(mult([any(B), any(D)])), seq(E)]),
    )]
});

static EXPAND_ABS: LazyLock<[Rule; 1]> = LazyLock::new(|| {
    [Rule::new(
        "abs-split",
        abs(mult([any(A), seq(B)])),
        mult([abs(any(A)), abs(mult([seq(B)]))]),
    )]
});

static CONTRACT_MULT: LazyLock<[Rule; 3]> = LazyLock::new(|| {
    [
        // A*B + A*C -> A*(B + C), the shared factor anywhere in each product
        Rule::new(
            "common-factor",
            add([
                seq(A),
                mult([seq(B), any(C), seq(D)]),
                seq(E),
                mult([seq(F), any(C), seq(G)]),
                seq(H),
            ]),
            add([
                seq(A),
                seq(E),
                seq(H),
                mult([
                    any(C),
                    add([mult([seq(B), seq(D)]), mult([seq(F), seq(G)])]),
                ]),
            ]),
        ),
        // A*B + A -> A*(B + 1), with the product sorted on either side
        Rule::new(
            "common-term",
            add([seq(A), mult([seq(D), any(B), seq(E)]), seq(C), any(B), seq(F)]),
            add([
                seq(A),
                seq(C),
                seq(F),
                mult([any(B), add([int(1), mult([seq(D), seq(E)])])]),
            ]),
        ),
        Rule::new(
            "common-term-before",
            add([seq(A), any(B), seq(C), mult([seq(D), any(B), seq(E)]), seq(F)]),
            add([
                seq(A),
                seq(C),
                seq(F),
                mult([any(B), add([int(1), mult([seq(D), seq(E)])])]),
            ]),
        ),
    ]
});

static EXPAND_MULT: LazyLock<[Rule; 1]> = LazyLock::new(|| {
    [Rule::new(
        "distribute",
        mult([seq(A), add([any(B), seq(C)]), seq(D)]),
        add([
            mult([seq(A), any(B), seq(D)]),
            mult([seq(A), add([seq(C)]), seq(D)]),
        ]),
    )]
});

fn integer_at_least(bindings: &Bindings, arena: &Arena, minimum: i64) -> bool {
    bindings
        .tree(C)
        .and_then(|c| arena.integer_value(c))
        .is_some_and(|n| n >= Integer::new(minimum))
}

static EXPAND_POWER: LazyLock<[Rule; 2]> = LazyLock::new(|| {
    [
        Rule::new(
            "square-of-sum",
            pow(add([any(A), seq(B)]), int(2)),
            add([
                pow(any(A), int(2)),
                mult([int(2), any(A), add([seq(B)])]),
                pow(add([seq(B)]), int(2)),
            ]),
        ),
        // (A + B)^n -> A*(A + B)^(n-1) + B*(A + B)^(n-1)
        Rule::new(
            "power-of-sum",
            pow(add([any(A), seq(B)]), any(C)),
            add([
                mult([any(A), pow(add([any(A), seq(B)]), add([any(C), int(-1)]))]),
                mult([
                    add([seq(B)]),
                    pow(add([any(A), seq(B)]), add([any(C), int(-1)])),
                ]),
            ]),
        )
        .when(|arena, bindings| integer_at_least(bindings, arena, 3)),
    ]
});

/// `|A| * |B|` to `|A*B|`.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn contract_abs(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*CONTRACT_ABS)
}

/// `|A*B|` to `|A| * |B|`.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn expand_abs(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*EXPAND_ABS)
}

/// Factors a shared factor out of two terms of a sum.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn contract_mult(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*CONTRACT_MULT)
}

/// Distributes a product over one of its sum factors.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn expand_mult(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*EXPAND_MULT)
}

/// Expands a sum raised to an integer power of at least two.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn expand_power(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*EXPAND_POWER)
}
