//! Exponentials and logarithms.

use std::sync::LazyLock;

use arbor_core::{Arena, Node, Result};

use crate::pattern::build::{add, any, exp, ln, mult, pow, seq};
use crate::pattern::{apply_first, Placeholder::*, Rule};

static CONTRACT_EXP: LazyLock<[Rule; 1]> = LazyLock::new(|| {
    [Rule::new(
        "exp-product",
        mult([seq(A), exp(any(B)), seq(C), exp(any(D)), seq(E)]),
        mult([seq(A), seq(C), exp(add([any(B), any(D)])), seq(E)]),
    )]
});

static EXPAND_EXP: LazyLock<[Rule; 1]> = LazyLock::new(|| {
    [Rule::new(
        "exp-sum",
        exp(add([any(A), seq(B)])),
        mult([exp(any(A)), exp(add([seq(B)]))]),
    )]
});

static CONTRACT_LN: LazyLock<[Rule; 2]> = LazyLock::new(|| {
    [
        Rule::new(
            "ln-sum",
            add([seq(A), ln(any(B)), seq(C), ln(any(D)), seq(E)]),
            add([seq(A), seq(C), ln(mult([any(B), any(D)])), seq(E)]),
        ),
        Rule::new(
            "ln-coefficient",
            mult([any(A), ln(any(B))]),
            ln(pow(any(B), any(A))),
        )
        .when(|arena, bindings| {
            bindings
                .tree(A)
                .is_some_and(|a| arena.integer_value(a).is_some())
        }),
    ]
});

static EXPAND_LN: LazyLock<[Rule; 2]> = LazyLock::new(|| {
    [
        Rule::new(
            "ln-product",
            ln(mult([any(A), seq(B)])),
            add([ln(any(A)), ln(mult([seq(B)]))]),
        ),
        Rule::new(
            "ln-power",
            ln(pow(any(A), any(B))),
            mult([any(B), ln(any(A))]),
        ),
    ]
});

/// `exp(A) * exp(B)` to `exp(A + B)`.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn contract_exp(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*CONTRACT_EXP)
}

/// `exp(A + B)` to `exp(A) * exp(B)`.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn expand_exp(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*EXPAND_EXP)
}

/// `ln(A) + ln(B)` to `ln(A*B)`, and `n*ln(A)` to `ln(A^n)` for integer `n`.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn contract_ln(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*CONTRACT_LN)
}

/// `ln(A*B)` to `ln(A) + ln(B)`, and `ln(A^B)` to `B*ln(A)`.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn expand_ln(arena: &mut Arena, node: Node) -> Result<bool> {
    apply_first(arena, node, &*EXPAND_LN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systematic::deep_reduce;

    fn apply(text: &str, operation: fn(&mut Arena, Node) -> Result<bool>) -> String {
        let mut arena = Arena::new();
        let node = arena.parse(text).unwrap();
        assert!(operation(&mut arena, node).unwrap());
        deep_reduce(&mut arena, node).unwrap();
        arena.display(node).to_string()
    }

    #[test]
    fn test_ln_coefficient_needs_integer() {
        assert_eq!(apply("(* 2 (ln x))", contract_ln), "(ln (^ x 2))");
        let mut arena = Arena::new();
        let node = arena.parse("(* 1/2 (ln x))").unwrap();
        assert!(!contract_ln(&mut arena, node).unwrap());
    }

    #[test]
    fn test_ln_power() {
        assert_eq!(apply("(ln (^ x y))", expand_ln), "(* y (ln x))");
    }

    #[test]
    fn test_exp_sum_of_three() {
        assert_eq!(
            apply("(exp (+ x y z))", expand_exp),
            "(* (exp (+ y z)) (exp x))"
        );
    }
}
