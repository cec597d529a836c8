//! Systematic reduction.
//!
//! Local rewrites that are always worth doing and bring a projected tree to
//! its canonical form: flattened and sorted sums and products, folded
//! numbers, merged like terms and powers, and the identities of the
//! projected functions. [`shallow_reduce`] assumes the children of the node
//! are already reduced; [`deep_reduce`] reduces bottom-up.

use arbor_core::{Arena, Constant, Error, Node, Number, Result, Tag};
use arbor_integers::Rational;
use smallvec::SmallVec;

use crate::comparison::Order;
use crate::n_ary;
use crate::rules;
use crate::set;

/// Deepest nesting [`deep_reduce`] descends into.
pub const MAX_DEPTH: usize = 256;

/// Largest exact power, in bits of the result, folded without relaxing.
const MAX_EXACT_POWER_BITS: usize = 2048;

/// Reduces every node of a tree, children first.
///
/// # Errors
///
/// Returns [`Error::DepthExceeded`] past [`MAX_DEPTH`] levels,
/// [`Error::Unhandled`] when an exact result would be too large, or
/// [`Error::ArenaExhausted`].
pub fn deep_reduce(arena: &mut Arena, node: Node) -> Result<bool> {
    deep_reduce_at(arena, node, 0)
}

fn deep_reduce_at(arena: &mut Arena, node: Node, depth: usize) -> Result<bool> {
    if depth > MAX_DEPTH {
        return Err(Error::DepthExceeded { limit: MAX_DEPTH });
    }
    let mut changed = false;
    let mut child = arena.next_node(node);
    for _ in 0..arena.number_of_children(node) {
        changed |= deep_reduce_at(arena, child, depth + 1)?;
        child = arena.next_tree(child);
    }
    Ok(shallow_reduce(arena, node)? || changed)
}

/// Reduces a single node whose children are already reduced.
///
/// # Errors
///
/// Returns [`Error::Unhandled`] when an exact result would be too large, or
/// [`Error::ArenaExhausted`].
pub fn shallow_reduce(arena: &mut Arena, node: Node) -> Result<bool> {
    let tag = arena.tag(node);
    if arena.number_of_children(node) == 0 {
        return n_ary::sanitize(arena, node);
    }
    if tag != Tag::Set && arena.children(node).any(|child| arena.tag(child) == Tag::Undefined) {
        replace_with_leaf(arena, node, Tag::Undefined)?;
        return Ok(true);
    }
    if fold_float_function(arena, node)? {
        return Ok(true);
    }
    match tag {
        Tag::Addition => reduce_addition(arena, node),
        Tag::Multiplication => reduce_multiplication(arena, node),
        Tag::Power => reduce_power(arena, node),
        Tag::Exponential => reduce_exponential(arena, node),
        Tag::Ln => reduce_logarithm(arena, node),
        Tag::Abs => reduce_absolute_value(arena, node),
        Tag::Trig => reduce_trig(arena, node),
        Tag::LogicalNot | Tag::LogicalAnd | Tag::LogicalOr => rules::logic::reduce(arena, node),
        Tag::Set => set::sort_and_dedup(arena, node),
        _ => Ok(false),
    }
}

// === Replacement helpers ===

fn replace_with_leaf(arena: &mut Arena, node: Node, tag: Tag) -> Result<()> {
    let leaf = arena.push(tag)?;
    arena.move_tree_over_tree(node, leaf);
    Ok(())
}

fn replace_with_child(arena: &mut Arena, node: Node, index: usize) {
    let child = arena.child(node, index);
    arena.move_tree_over_tree(node, child);
}

fn replace_with_number(arena: &mut Arena, node: Node, value: &Number) -> Result<()> {
    let origin = arena.tag(node);
    let leaf = push_folded(arena, value, origin)?;
    arena.move_tree_over_tree(node, leaf);
    Ok(())
}

/// Deep-reduces a tree built at the tail and moves it over `node`.
fn replace_with_reduced(arena: &mut Arena, node: Node, built: Node) -> Result<()> {
    deep_reduce(arena, built)?;
    arena.move_tree_over_tree(node, built);
    Ok(())
}

/// Pushes a folded number; magnitudes past the encoding limit are reported
/// as unhandled so the caller can retry with floats.
fn push_folded(arena: &mut Arena, value: &Number, origin: Tag) -> Result<Node> {
    arena.push_number(value).map_err(|err| match err {
        Error::PayloadOverflow(_) => Error::Unhandled(origin),
        other => other,
    })
}

fn fold_float_function(arena: &mut Arena, node: Node) -> Result<bool> {
    if !matches!(
        arena.tag(node),
        Tag::Power | Tag::Exponential | Tag::Ln | Tag::Abs | Tag::Trig
    ) {
        return Ok(false);
    }
    let mut any_float = false;
    for child in arena.children(node) {
        match arena.number_value(child) {
            Some(Number::Float(_)) => any_float = true,
            Some(Number::Exact(_)) => {}
            None => return Ok(false),
        }
    }
    if !any_float {
        return Ok(false);
    }
    let value = arena.approximate(node);
    if value.is_nan() {
        replace_with_leaf(arena, node, Tag::Undefined)?;
    } else {
        replace_with_number(arena, node, &Number::Float(value))?;
    }
    Ok(true)
}

// === Sums and products ===

fn reduce_addition(arena: &mut Arena, node: Node) -> Result<bool> {
    let mut changed = false;
    loop {
        changed |= n_ary::flatten(arena, node)?;
        changed |= n_ary::sort_children(arena, node, Order::System)?;
        changed |= fold_numbers(arena, node, Number::add)?;
        if !merge_like_terms(arena, node)? {
            break;
        }
        changed = true;
    }
    Ok(n_ary::sanitize(arena, node)? || changed)
}

fn reduce_multiplication(arena: &mut Arena, node: Node) -> Result<bool> {
    let mut changed = false;
    loop {
        changed |= n_ary::flatten(arena, node)?;
        if arena.children(node).any(|child| arena.tag(child) == Tag::Zero) {
            replace_with_leaf(arena, node, Tag::Zero)?;
            return Ok(true);
        }
        changed |= n_ary::sort_children(arena, node, Order::System)?;
        changed |= fold_numbers(arena, node, Number::mul)?;
        if !merge_powers(arena, node)? {
            break;
        }
        changed = true;
    }
    Ok(n_ary::sanitize(arena, node)? || changed)
}

/// Folds the leading numeric children of a sorted sum or product into one
/// and drops it when it is the neutral element.
fn fold_numbers(arena: &mut Arena, node: Node, op: fn(&Number, &Number) -> Number) -> Result<bool> {
    let tag = arena.tag(node);
    let is_neutral = |value: &Number| {
        if tag == Tag::Addition {
            value.is_zero()
        } else {
            value.is_one()
        }
    };
    let count = arena.number_of_children(node);
    let numbers: SmallVec<[Number; 4]> = arena
        .children(node)
        .map_while(|child| arena.number_value(child))
        .collect();
    let Some((first, rest)) = numbers.split_first() else {
        return Ok(false);
    };
    if rest.is_empty() {
        if is_neutral(first) && count > 1 {
            n_ary::remove_child_at(arena, node, 0)?;
            return Ok(true);
        }
        return Ok(false);
    }
    let total = rest.iter().fold(first.clone(), |acc, value| op(&acc, value));
    for _ in 0..rest.len() {
        n_ary::remove_child_at(arena, node, 1)?;
    }
    let folded = push_folded(arena, &total, tag)?;
    arena.move_tree_over_tree(arena.child(node, 0), folded);
    if is_neutral(&total) && count > numbers.len() {
        n_ary::remove_child_at(arena, node, 0)?;
    }
    Ok(true)
}

/// Splits a non-numeric term into its numeric coefficient and the bytes of
/// the rest: `3xy` gives `(3, xy)`, `x` gives `(1, x)`.
fn split_term(arena: &Arena, term: Node) -> Option<(Number, Vec<u8>)> {
    if arena.number_value(term).is_some() {
        return None;
    }
    let count = arena.number_of_children(term);
    if arena.tag(term) == Tag::Multiplication && count >= 2 {
        if let Some(coefficient) = arena.number_value(arena.child(term, 0)) {
            let second = arena.child(term, 1);
            let rest = if count == 2 {
                arena.tree_bytes(second).to_vec()
            } else {
                let end = term.offset() + arena.tree_size(term);
                let factors = u8::try_from(count - 1).ok()?;
                let mut bytes = vec![Tag::Multiplication.byte(), factors];
                bytes.extend_from_slice(&arena.bytes()[second.offset()..end]);
                bytes
            };
            return Some((coefficient, rest));
        }
    }
    Some((Number::Exact(Rational::from(1)), arena.tree_bytes(term).to_vec()))
}

/// Merges the first pair of terms differing only by their coefficient:
/// `2x + 3x` becomes `5x`.
fn merge_like_terms(arena: &mut Arena, node: Node) -> Result<bool> {
    let children: SmallVec<[Node; 8]> = arena.children(node).collect();
    let terms: SmallVec<[Option<(Number, Vec<u8>)>; 8]> =
        children.iter().map(|&child| split_term(arena, child)).collect();
    for (i, left) in terms.iter().enumerate() {
        let Some((left_coefficient, left_term)) = left else {
            continue;
        };
        for (j, right) in terms.iter().enumerate().skip(i + 1) {
            let Some((right_coefficient, right_term)) = right else {
                continue;
            };
            if left_term != right_term {
                continue;
            }
            let sum = left_coefficient.add(right_coefficient);
            if sum.is_zero() {
                n_ary::remove_child_at(arena, node, j)?;
                n_ary::remove_child_at(arena, node, i)?;
                return Ok(true);
            }
            let merged = arena.push_n_ary(Tag::Multiplication, 2)?;
            push_folded(arena, &sum, Tag::Addition)?;
            arena.push_bytes(right_term)?;
            reduce_multiplication(arena, merged)?;
            arena.move_tree_over_tree(children[i], merged);
            n_ary::remove_child_at(arena, node, j)?;
            return Ok(true);
        }
    }
    Ok(false)
}

fn base_and_exponent(arena: &Arena, node: Node) -> (Node, Option<Node>) {
    if arena.tag(node) == Tag::Power {
        (arena.child(node, 0), Some(arena.child(node, 1)))
    } else {
        (node, None)
    }
}

/// Merges the first adjacent pair of factors with the same base:
/// `x * x^2` becomes `x^3`.
fn merge_powers(arena: &mut Arena, node: Node) -> Result<bool> {
    let children: SmallVec<[Node; 8]> = arena.children(node).collect();
    for (i, pair) in children.windows(2).enumerate() {
        let (left, right) = (pair[0], pair[1]);
        if arena.number_value(left).is_some() {
            continue;
        }
        let (left_base, left_exponent) = base_and_exponent(arena, left);
        let (right_base, right_exponent) = base_and_exponent(arena, right);
        if !arena.tree_is_identical(left_base, right_base) {
            continue;
        }
        let merged = arena.push(Tag::Power)?;
        arena.clone_tree(left_base)?;
        let exponent = arena.push_n_ary(Tag::Addition, 2)?;
        for side in [left_exponent, right_exponent] {
            match side {
                Some(existing) => arena.clone_tree(existing)?,
                None => arena.push(Tag::One)?,
            };
        }
        reduce_addition(arena, exponent)?;
        shallow_reduce(arena, merged)?;
        arena.move_tree_over_tree(left, merged);
        n_ary::remove_child_at(arena, node, i + 1)?;
        return Ok(true);
    }
    Ok(false)
}

// === Powers ===

fn reduce_power(arena: &mut Arena, node: Node) -> Result<bool> {
    let base = arena.child(node, 0);
    let exponent = arena.child(node, 1);
    if arena.is_one(exponent) {
        replace_with_child(arena, node, 0);
        return Ok(true);
    }
    if arena.is_zero(exponent) {
        let tag = if arena.is_zero(base) { Tag::Undefined } else { Tag::One };
        replace_with_leaf(arena, node, tag)?;
        return Ok(true);
    }
    let exponent_value = arena.rational_value(exponent);
    if arena.is_zero(base) {
        let tag = match exponent_value.as_ref().map(Rational::signum) {
            Some(1) => Tag::Zero,
            Some(_) => Tag::Undefined,
            None => return Ok(false),
        };
        replace_with_leaf(arena, node, tag)?;
        return Ok(true);
    }
    if arena.is_one(base) {
        replace_with_leaf(arena, node, Tag::One)?;
        return Ok(true);
    }
    let Some(n) = exponent_value.filter(Rational::is_integer) else {
        return Ok(false);
    };
    if let Some(value) = arena.rational_value(base) {
        let folded = exact_power(&value, &n)?;
        replace_with_number(arena, node, &Number::Exact(folded))?;
        return Ok(true);
    }
    let built = match arena.tag(base) {
        // (A^B)^n -> A^(B*n)
        Tag::Power => {
            let built = arena.push(Tag::Power)?;
            arena.clone_tree(arena.child(base, 0))?;
            arena.push_n_ary(Tag::Multiplication, 2)?;
            arena.clone_tree(arena.child(base, 1))?;
            arena.clone_tree(exponent)?;
            built
        }
        // (A*B)^n -> A^n * B^n
        Tag::Multiplication => {
            let factors: SmallVec<[Node; 8]> = arena.children(base).collect();
            let built = arena.push_n_ary(Tag::Multiplication, factors.len())?;
            for factor in factors {
                arena.push(Tag::Power)?;
                arena.clone_tree(factor)?;
                arena.clone_tree(exponent)?;
            }
            built
        }
        // exp(A)^n -> exp(A*n)
        Tag::Exponential => {
            let built = arena.push(Tag::Exponential)?;
            arena.push_n_ary(Tag::Multiplication, 2)?;
            arena.clone_tree(arena.child(base, 0))?;
            arena.clone_tree(exponent)?;
            built
        }
        _ => return Ok(false),
    };
    replace_with_reduced(arena, node, built)?;
    Ok(true)
}

fn exact_power(base: &Rational, exponent: &Rational) -> Result<Rational> {
    let unhandled = Error::Unhandled(Tag::Power);
    let n = exponent
        .to_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| unhandled.clone())?;
    if base.abs() == Rational::from(1) {
        let odd = n % 2 != 0;
        let sign = if base.is_negative() && odd { -1 } else { 1 };
        return Ok(Rational::from(sign));
    }
    let bits = 8 * base
        .numerator()
        .to_le_magnitude()
        .len()
        .max(base.denominator().to_le_magnitude().len());
    if bits.saturating_mul(n.unsigned_abs() as usize) > MAX_EXACT_POWER_BITS {
        return Err(unhandled);
    }
    base.pow(n).ok_or(unhandled)
}

// === Exponential, logarithm, absolute value ===

fn reduce_exponential(arena: &mut Arena, node: Node) -> Result<bool> {
    let argument = arena.child(node, 0);
    if arena.is_zero(argument) {
        replace_with_leaf(arena, node, Tag::One)?;
        return Ok(true);
    }
    if arena.tag(argument) == Tag::Ln {
        let inner = arena.child(argument, 0);
        arena.move_tree_over_tree(node, inner);
        return Ok(true);
    }
    Ok(false)
}

fn reduce_logarithm(arena: &mut Arena, node: Node) -> Result<bool> {
    let argument = arena.child(node, 0);
    if arena.is_one(argument) {
        replace_with_leaf(arena, node, Tag::Zero)?;
        return Ok(true);
    }
    let non_positive = arena
        .rational_value(argument)
        .is_some_and(|value| value.signum() <= 0);
    if non_positive {
        replace_with_leaf(arena, node, Tag::Undefined)?;
        return Ok(true);
    }
    if arena.tag(argument) == Tag::Exponential {
        let inner = arena.child(argument, 0);
        arena.move_tree_over_tree(node, inner);
        return Ok(true);
    }
    Ok(false)
}

fn reduce_absolute_value(arena: &mut Arena, node: Node) -> Result<bool> {
    let argument = arena.child(node, 0);
    if let Some(value) = arena.rational_value(argument) {
        replace_with_number(arena, node, &Number::Exact(value.abs()))?;
        return Ok(true);
    }
    let positive = matches!(
        arena.constant_value(argument),
        Some(Constant::E | Constant::Pi)
    );
    if positive || matches!(arena.tag(argument), Tag::Abs | Tag::Exponential) {
        replace_with_child(arena, node, 0);
        return Ok(true);
    }
    Ok(false)
}

// === Trigonometry ===

/// Exact values of `cos(n*pi/12)` for the angles that have one.
enum ExactCosine {
    Rational(i64, i64),
    /// `sign * sqrt(radicand) / 2`
    HalfRoot(i64, i64),
}

fn cosine_of_twelfths(n: i64) -> Option<ExactCosine> {
    let n = n.rem_euclid(24);
    let n = if n > 12 { 24 - n } else { n };
    let value = match n {
        0 => ExactCosine::Rational(1, 1),
        2 => ExactCosine::HalfRoot(1, 3),
        3 => ExactCosine::HalfRoot(1, 2),
        4 => ExactCosine::Rational(1, 2),
        6 => ExactCosine::Rational(0, 1),
        8 => ExactCosine::Rational(-1, 2),
        9 => ExactCosine::HalfRoot(-1, 2),
        10 => ExactCosine::HalfRoot(-1, 3),
        12 => ExactCosine::Rational(-1, 1),
        _ => return None,
    };
    Some(value)
}

/// `r` when the angle is `r*pi` with rational `r`.
fn pi_multiple(arena: &Arena, angle: Node) -> Option<Rational> {
    if arena.is_zero(angle) {
        return Some(Rational::from(0));
    }
    if arena.constant_value(angle) == Some(Constant::Pi) {
        return Some(Rational::from(1));
    }
    if arena.tag(angle) == Tag::Multiplication
        && arena.number_of_children(angle) == 2
        && arena.constant_value(arena.child(angle, 1)) == Some(Constant::Pi)
    {
        return arena.rational_value(arena.child(angle, 0));
    }
    None
}

fn has_negative_coefficient(arena: &Arena, angle: Node) -> bool {
    let leading = if arena.tag(angle) == Tag::Multiplication {
        arena.child(angle, 0)
    } else {
        angle
    };
    arena
        .rational_value(leading)
        .is_some_and(|value| value.is_negative())
}

fn reduce_trig(arena: &mut Arena, node: Node) -> Result<bool> {
    let angle = arena.child(node, 0);
    let index = arena.child(node, 1);
    let Some(k) = arena.integer_value(index).and_then(|k| k.to_i64()) else {
        return Ok(false);
    };
    let k_mod = k.rem_euclid(4);
    if k_mod >= 2 {
        // trig(A, k) = -trig(A, k-2)
        let built = arena.push_n_ary(Tag::Multiplication, 2)?;
        arena.push(Tag::MinusOne)?;
        arena.push(Tag::Trig)?;
        arena.clone_tree(angle)?;
        arena.push_int(k_mod - 2)?;
        replace_with_reduced(arena, node, built)?;
        return Ok(true);
    }
    let mut changed = false;
    if k_mod != k {
        let normalized = arena.push_int(k_mod)?;
        arena.move_tree_over_tree(index, normalized);
        changed = true;
    }
    if let Some(r) = pi_multiple(arena, angle) {
        let twelfths = (r * Rational::from(12)).to_integer().and_then(|n| n.to_i64());
        let cosine = twelfths.and_then(|n| cosine_of_twelfths(n.rem_euclid(24) - 6 * k_mod));
        if let Some(value) = cosine {
            let built = match value {
                ExactCosine::Rational(p, q) => arena.push_rational(&Rational::from_i64(p, q))?,
                ExactCosine::HalfRoot(sign, radicand) => {
                    let built = arena.push_n_ary(Tag::Multiplication, 2)?;
                    arena.push_rational(&Rational::from_i64(sign, 2))?;
                    arena.push(Tag::Power)?;
                    arena.push_int(radicand)?;
                    arena.push(Tag::Half)?;
                    built
                }
            };
            arena.move_tree_over_tree(node, built);
            return Ok(true);
        }
    }
    if has_negative_coefficient(arena, angle) {
        // cos(-A) = cos(A), sin(-A) = -sin(A)
        let built = arena.end();
        if k_mod == 1 {
            arena.push_n_ary(Tag::Multiplication, 2)?;
            arena.push(Tag::MinusOne)?;
        }
        arena.push(Tag::Trig)?;
        arena.push_n_ary(Tag::Multiplication, 2)?;
        arena.push(Tag::MinusOne)?;
        arena.clone_tree(angle)?;
        arena.push_int(k_mod)?;
        replace_with_reduced(arena, node, built)?;
        return Ok(true);
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce(text: &str) -> String {
        let mut arena = Arena::new();
        let node = arena.parse(text).unwrap();
        deep_reduce(&mut arena, node).unwrap();
        arena.display(node).to_string()
    }

    #[test]
    fn test_numbers_fold() {
        assert_eq!(reduce("(+ 2 3)"), "5");
        assert_eq!(reduce("(* 1/2 4 x)"), "(* 2 x)");
        assert_eq!(reduce("(+ 1/3 2/3 y)"), "(+ 1 y)");
        assert_eq!(reduce("(+ 0.5 1/2)"), "1.0");
    }

    #[test]
    fn test_commutative_inputs_converge() {
        let mut arena = Arena::new();
        let a = arena.parse("(* x 2)").unwrap();
        let b = arena.parse("(* 2 x)").unwrap();
        deep_reduce(&mut arena, a).unwrap();
        deep_reduce(&mut arena, b).unwrap();
        assert_eq!(arena.tree_bytes(a), arena.tree_bytes(b));
    }

    #[test]
    fn test_like_terms_and_powers() {
        assert_eq!(reduce("(+ x (* 2 x) y)"), "(+ (* 3 x) y)");
        assert_eq!(reduce("(+ x (* -1 x))"), "0");
        assert_eq!(reduce("(* x x (^ x 2))"), "(^ x 4)");
        assert_eq!(reduce("(* x (^ x -1))"), "1");
        assert_eq!(reduce("(* 0 x)"), "0");
    }

    #[test]
    fn test_power_identities() {
        assert_eq!(reduce("(^ x 0)"), "1");
        assert_eq!(reduce("(^ 0 0)"), "undef");
        assert_eq!(reduce("(^ 0 -2)"), "undef");
        assert_eq!(reduce("(^ 0 3)"), "0");
        assert_eq!(reduce("(^ 2/3 2)"), "4/9");
        assert_eq!(reduce("(^ 2 -2)"), "1/4");
        assert_eq!(reduce("(^ (^ x 2) 3)"), "(^ x 6)");
        assert_eq!(reduce("(^ (* 2 x) 2)"), "(* 4 (^ x 2))");
        assert_eq!(reduce("(^ (exp x) 2)"), "(exp (* 2 x))");
    }

    #[test]
    fn test_huge_power_is_unhandled() {
        let mut arena = Arena::new();
        let node = arena.parse("(^ 3 100000)").unwrap();
        assert_eq!(
            deep_reduce(&mut arena, node),
            Err(Error::Unhandled(Tag::Power))
        );
    }

    #[test]
    fn test_functions() {
        assert_eq!(reduce("(exp 0)"), "1");
        assert_eq!(reduce("(exp (ln x))"), "x");
        assert_eq!(reduce("(ln (exp x))"), "x");
        assert_eq!(reduce("(ln 1)"), "0");
        assert_eq!(reduce("(ln 0)"), "undef");
        assert_eq!(reduce("(abs -3/2)"), "3/2");
        assert_eq!(reduce("(abs (abs x))"), "(abs x)");
        assert_eq!(reduce("(+ x undef)"), "undef");
    }

    #[test]
    fn test_trig() {
        assert_eq!(reduce("(trig x 2)"), "(* -1 (trig x 0))");
        assert_eq!(reduce("(trig x 5)"), "(trig x 1)");
        assert_eq!(reduce("(trig 0 0)"), "1");
        assert_eq!(reduce("(trig pi 1)"), "0");
        assert_eq!(reduce("(trig (* 1/3 pi) 0)"), "1/2");
        assert_eq!(reduce("(trig (* 1/4 pi) 1)"), "(* 1/2 (^ 2 1/2))");
        // twelve times the coefficient is i64::MIN, the angle is 4pi/3
        assert_eq!(
            reduce("(trig (* -2305843009213693952/3 pi) 1)"),
            "(* -1/2 (^ 3 1/2))"
        );
        assert_eq!(reduce("(trig (* -1 x) 0)"), "(trig x 0)");
        assert_eq!(reduce("(trig (* -2 x) 1)"), "(* -1 (trig (* 2 x) 1))");
    }

    #[test]
    fn test_depth_limit() {
        let mut arena = Arena::new();
        let mut text = String::from("x");
        for _ in 0..=MAX_DEPTH {
            text = format!("(abs {text})");
        }
        let node = arena.parse(&text).unwrap();
        assert_eq!(
            deep_reduce(&mut arena, node),
            Err(Error::DepthExceeded { limit: MAX_DEPTH })
        );
    }
}
