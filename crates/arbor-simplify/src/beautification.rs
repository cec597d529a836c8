//! Beautification: rewriting a reduced tree for display.
//!
//! Undoes projection where the result reads better: `trig` becomes sine
//! and cosine, negative exponents become divisions, negative coefficients
//! become subtractions and negations, and children are sorted in
//! [`Order::User`].

use std::sync::LazyLock;

use arbor_core::{Arena, Constant, Node, Result, Tag};
use arbor_integers::{Integer, Rational};
use smallvec::SmallVec;

use crate::comparison::Order;
use crate::n_ary;
use crate::pattern::build::{any, binary, constant, half, int, ln, mult, pow, seq, trig, unary};
use crate::pattern::{apply_first, Placeholder::*, Rule};

static BEAUTIFICATIONS: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("cos", trig(any(A), int(0)), unary(Tag::Cosine, any(A))),
        Rule::new("sin", trig(any(A), int(1)), unary(Tag::Sine, any(A))),
        Rule::new("e", unary(Tag::Exponential, int(1)), constant(Constant::E)),
        Rule::new(
            "e-power",
            unary(Tag::Exponential, any(A)),
            pow(constant(Constant::E), any(A)),
        ),
        Rule::new("sqrt", pow(any(A), half()), unary(Tag::SquareRoot, any(A))),
        Rule::new(
            "log",
            mult([seq(A), ln(any(B)), seq(C), pow(ln(int(10)), int(-1)), seq(D)]),
            mult([seq(A), unary(Tag::Log, any(B)), seq(C), seq(D)]),
        ),
        Rule::new(
            "log-before",
            mult([seq(A), pow(ln(int(10)), int(-1)), seq(C), ln(any(B)), seq(D)]),
            mult([seq(A), seq(C), unary(Tag::Log, any(B)), seq(D)]),
        ),
        Rule::new(
            "logarithm",
            mult([seq(A), ln(any(B)), seq(C), pow(ln(any(D)), int(-1)), seq(E)]),
            mult([seq(A), binary(Tag::Logarithm, any(B), any(D)), seq(C), seq(E)]),
        ),
        Rule::new(
            "logarithm-before",
            mult([seq(A), pow(ln(any(D)), int(-1)), seq(C), ln(any(B)), seq(E)]),
            mult([seq(A), seq(C), binary(Tag::Logarithm, any(B), any(D)), seq(E)]),
        ),
    ]
});

/// Beautifies every node of a tree, parents before children.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn deep_beautify(arena: &mut Arena, node: Node) -> Result<bool> {
    let mut changed = sort_for_display(arena, node)?;
    let mut end = arena.next_tree(node).offset();
    let mut current = node;
    while current.offset() < end {
        let before = arena.len();
        changed |= shallow_beautify(arena, current)?;
        end = (end + arena.len()).saturating_sub(before);
        current = arena.next_node(current);
    }
    Ok(changed)
}

/// Beautifies a single node.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn shallow_beautify(arena: &mut Arena, node: Node) -> Result<bool> {
    let changed = apply_first(arena, node, &BEAUTIFICATIONS)?;
    let rewritten = match arena.tag(node) {
        Tag::Addition => beautify_sum(arena, node)?,
        Tag::Multiplication => beautify_product(arena, node)?,
        Tag::Power => beautify_power(arena, node)?,
        _ => false,
    };
    Ok(changed || rewritten)
}

fn sort_for_display(arena: &mut Arena, node: Node) -> Result<bool> {
    let commutative: SmallVec<[Node; 16]> = arena
        .descendants(node)
        .filter(|&n| matches!(arena.tag(n), Tag::Addition | Tag::Multiplication))
        .collect();
    let mut changed = false;
    // innermost first: sorting keeps sizes, so outer offsets stay valid
    for &n in commutative.iter().rev() {
        changed |= n_ary::sort_children(arena, n, Order::User)?;
    }
    Ok(changed)
}

fn negative_exponent(arena: &Arena, node: Node) -> Option<Rational> {
    if arena.tag(node) != Tag::Power {
        return None;
    }
    arena
        .rational_value(arena.child(node, 1))
        .filter(Rational::is_negative)
        .map(|r| -r)
}

enum Piece {
    Tree(Node),
    Integer(Integer),
    Power(Node, Rational),
}

fn push_piece(arena: &mut Arena, piece: &Piece) -> Result<()> {
    match piece {
        Piece::Tree(node) => {
            arena.clone_tree(*node)?;
        }
        Piece::Integer(value) => {
            arena.push_integer(value)?;
        }
        Piece::Power(base, exponent) => {
            arena.push(Tag::Power)?;
            arena.clone_tree(*base)?;
            arena.push_rational(exponent)?;
        }
    }
    Ok(())
}

fn push_product(arena: &mut Arena, pieces: &[Piece]) -> Result<()> {
    match pieces {
        [] => {
            arena.push(Tag::One)?;
        }
        [piece] => push_piece(arena, piece)?,
        _ => {
            arena.push_n_ary(Tag::Multiplication, pieces.len())?;
            for piece in pieces {
                push_piece(arena, piece)?;
            }
        }
    }
    Ok(())
}

/// `a * b^-1` to `a / b`, `-1 * a` to `-a`, `1/2 * a` to `a / 2`.
fn beautify_product(arena: &mut Arena, node: Node) -> Result<bool> {
    let one = Integer::from(1);
    let mut negative = false;
    let mut top: SmallVec<[Piece; 8]> = SmallVec::new();
    let mut bottom: SmallVec<[Piece; 4]> = SmallVec::new();
    for child in arena.children(node) {
        if let Some(mut value) = arena.rational_value(child) {
            if value.is_negative() {
                negative = !negative;
                value = value.abs();
            }
            if value.numerator() != one {
                top.push(Piece::Integer(value.numerator()));
            }
            if value.denominator() != one {
                bottom.push(Piece::Integer(value.denominator()));
            }
        } else if let Some(exponent) = negative_exponent(arena, child) {
            let base = arena.child(child, 0);
            if exponent == Rational::from(1) {
                bottom.push(Piece::Tree(base));
            } else {
                bottom.push(Piece::Power(base, exponent));
            }
        } else {
            top.push(Piece::Tree(child));
        }
    }
    if bottom.is_empty() && !negative {
        return Ok(false);
    }
    let built = arena.end();
    if negative {
        arena.push(Tag::Opposite)?;
    }
    if bottom.is_empty() {
        push_product(arena, &top)?;
    } else {
        arena.push(Tag::Division)?;
        push_product(arena, &top)?;
        push_product(arena, &bottom)?;
    }
    arena.move_tree_over_tree(node, built);
    Ok(true)
}

/// `x^-n` to `1 / x^n`.
fn beautify_power(arena: &mut Arena, node: Node) -> Result<bool> {
    let Some(exponent) = negative_exponent(arena, node) else {
        return Ok(false);
    };
    let base = arena.child(node, 0);
    let built = arena.push(Tag::Division)?;
    arena.push(Tag::One)?;
    if exponent == Rational::from(1) {
        arena.clone_tree(base)?;
    } else {
        push_piece(arena, &Piece::Power(base, exponent))?;
    }
    arena.move_tree_over_tree(node, built);
    Ok(true)
}

/// The coefficient of a term when it is negative.
fn negative_coefficient(arena: &Arena, term: Node) -> Option<Rational> {
    let leading = if arena.tag(term) == Tag::Multiplication {
        arena.child(term, 0)
    } else {
        term
    };
    arena.rational_value(leading).filter(Rational::is_negative)
}

/// Pushes `-term` for a term with a negative coefficient.
fn push_negated(arena: &mut Arena, term: Node, coefficient: &Rational) -> Result<()> {
    let positive = -coefficient;
    if arena.tag(term) != Tag::Multiplication {
        arena.push_rational(&positive)?;
        return Ok(());
    }
    let rest: SmallVec<[Node; 8]> = arena.children(term).skip(1).collect();
    let keep_coefficient = positive != Rational::from(1);
    let count = rest.len() + usize::from(keep_coefficient);
    if count > 1 {
        arena.push_n_ary(Tag::Multiplication, count)?;
    }
    if keep_coefficient {
        arena.push_rational(&positive)?;
    }
    for factor in rest {
        arena.clone_tree(factor)?;
    }
    Ok(())
}

/// `a + (-1)*b` to `a - b`.
fn beautify_sum(arena: &mut Arena, node: Node) -> Result<bool> {
    let mut positives: SmallVec<[Node; 8]> = SmallVec::new();
    let mut negatives: SmallVec<[(Node, Rational); 4]> = SmallVec::new();
    for child in arena.children(node) {
        match negative_coefficient(arena, child) {
            Some(coefficient) => negatives.push((child, coefficient)),
            None => positives.push(child),
        }
    }
    if negatives.is_empty() {
        return Ok(false);
    }
    let built = arena.end();
    let subtractions = if positives.is_empty() {
        negatives.len() - 1
    } else {
        negatives.len()
    };
    for _ in 0..subtractions {
        arena.push(Tag::Subtraction)?;
    }
    let mut pending = negatives.iter();
    match positives.as_slice() {
        [] => {
            if let Some((term, coefficient)) = pending.next() {
                arena.push(Tag::Opposite)?;
                push_negated(arena, *term, coefficient)?;
            }
        }
        [single] => {
            arena.clone_tree(*single)?;
        }
        many => {
            arena.push_n_ary(Tag::Addition, many.len())?;
            for &term in many {
                arena.clone_tree(term)?;
            }
        }
    }
    for (term, coefficient) in pending {
        push_negated(arena, *term, coefficient)?;
    }
    arena.move_tree_over_tree(node, built);
    Ok(true)
}
