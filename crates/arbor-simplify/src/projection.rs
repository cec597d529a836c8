//! Projection onto the reduced vocabulary.
//!
//! Basic reduction rewrites every user-facing construct in terms of the
//! few tags the later passes understand: subtraction, division and
//! negation become sums, products and powers; sine, cosine and tangent
//! become `trig`; roots and every logarithm become powers and `ln`.

use std::sync::LazyLock;

use arbor_core::{Arena, Constant, Error, Node, Number, Result, Tag};
use arbor_integers::{Integer, Rational};

use crate::n_ary;
use crate::pattern::build::{add, any, binary, constant, half, int, ln, mult, pow, trig, unary};
use crate::pattern::{apply_first, Placeholder::*, Rule};

/// How exactly numbers are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Exact arithmetic; a float in the input relaxes the context.
    #[default]
    Default,
    /// Every symbol-free subtree is replaced by its float approximation.
    ApproximateToFloat,
}

/// Options for [`deep_project`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectionContext {
    /// Exactness of numbers.
    pub strategy: Strategy,
}

static PROJECTIONS: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("sqrt", unary(Tag::SquareRoot, any(A)), pow(any(A), half())),
        Rule::new(
            "e-power",
            pow(constant(Constant::E), any(A)),
            unary(Tag::Exponential, any(A)),
        ),
        Rule::new(
            "e",
            constant(Constant::E),
            unary(Tag::Exponential, int(1)),
        ),
        Rule::new(
            "opposite",
            unary(Tag::Opposite, any(A)),
            mult([int(-1), any(A)]),
        ),
        Rule::new(
            "subtraction",
            binary(Tag::Subtraction, any(A), any(B)),
            add([any(A), mult([int(-1), any(B)])]),
        ),
        Rule::new(
            "division",
            binary(Tag::Division, any(A), any(B)),
            mult([any(A), pow(any(B), int(-1))]),
        ),
        Rule::new("cos", unary(Tag::Cosine, any(A)), trig(any(A), int(0))),
        Rule::new("sin", unary(Tag::Sine, any(A)), trig(any(A), int(1))),
        Rule::new(
            "tan",
            unary(Tag::Tangent, any(A)),
            mult([trig(any(A), int(1)), pow(trig(any(A), int(0)), int(-1))]),
        ),
        Rule::new(
            "log",
            unary(Tag::Log, any(A)),
            mult([ln(any(A)), pow(ln(int(10)), int(-1))]),
        ),
        Rule::new(
            "logarithm",
            binary(Tag::Logarithm, any(A), any(B)),
            mult([ln(any(A)), pow(ln(any(B)), int(-1))]),
        ),
    ]
});

/// Projects every node of a tree, parents before children.
///
/// # Errors
///
/// Returns [`Error::RelaxContext`] on a float under [`Strategy::Default`],
/// or [`Error::ArenaExhausted`].
pub fn deep_project(arena: &mut Arena, node: Node, context: ProjectionContext) -> Result<bool> {
    let mut changed = false;
    if context.strategy == Strategy::ApproximateToFloat {
        changed |= approximate_scalars(arena, node)?;
    }
    let mut end = arena.next_tree(node).offset();
    let mut current = node;
    while current.offset() < end {
        let before = arena.len();
        changed |= shallow_project(arena, current, context)?;
        // rewrites only happen inside the tree, so the shift is the growth
        end = (end + arena.len()).saturating_sub(before);
        current = arena.next_node(current);
    }
    Ok(changed)
}

/// Basic reduction with the default context.
///
/// # Errors
///
/// See [`deep_project`].
pub fn basic_reduce(arena: &mut Arena, node: Node) -> Result<bool> {
    deep_project(arena, node, ProjectionContext::default())
}

/// Projects a single node.
///
/// # Errors
///
/// Returns [`Error::RelaxContext`] on a float under [`Strategy::Default`],
/// or [`Error::ArenaExhausted`].
pub fn shallow_project(arena: &mut Arena, node: Node, context: ProjectionContext) -> Result<bool> {
    match arena.tag(node) {
        Tag::Float if context.strategy == Strategy::Default => Err(Error::RelaxContext),
        Tag::Decimal => project_decimal(arena, node),
        Tag::Addition | Tag::Multiplication => n_ary::flatten(arena, node),
        _ => apply_first(arena, node, &PROJECTIONS),
    }
}

/// `(dec m k)` is `m * 10^-k`.
fn project_decimal(arena: &mut Arena, node: Node) -> Result<bool> {
    let digits = u32::from(arena.decimal_digits(node));
    let Some(mantissa) = arena.integer_value(arena.child(node, 0)) else {
        return Ok(false);
    };
    let value = Rational::new(mantissa, Integer::new(10).pow(digits));
    let exact = arena.push_number(&Number::Exact(value))?;
    arena.move_tree_over_tree(node, exact);
    Ok(true)
}

/// Whether a tree has a real value independent of any variable.
fn is_scalar(arena: &Arena, node: Node) -> bool {
    !arena.any_descendant(node, |tag| {
        !(tag.is_number()
            || matches!(
                tag,
                Tag::Multiplication
                    | Tag::Power
                    | Tag::Addition
                    | Tag::Trig
                    | Tag::Exponential
                    | Tag::Ln
                    | Tag::Abs
                    | Tag::Sine
                    | Tag::Cosine
                    | Tag::Tangent
                    | Tag::ArcSine
                    | Tag::ArcCosine
                    | Tag::ArcTangent
                    | Tag::Decimal
                    | Tag::Division
                    | Tag::Subtraction
                    | Tag::Opposite
                    | Tag::SquareRoot
                    | Tag::Log
                    | Tag::Logarithm
            ))
    })
}

/// Replaces each maximal symbol-free subtree by its float value.
fn approximate_scalars(arena: &mut Arena, node: Node) -> Result<bool> {
    let mut changed = false;
    let mut end = arena.next_tree(node).offset();
    let mut current = node;
    while current.offset() < end {
        if arena.tag(current) != Tag::Float && is_scalar(arena, current) {
            let value = arena.approximate(current);
            if value.is_finite() {
                let old_size = arena.tree_size(current);
                let float = arena.push_float(value)?;
                let placed = arena.move_tree_over_tree(current, float);
                end = end + arena.tree_size(placed) - old_size;
                current = arena.next_tree(placed);
                changed = true;
                continue;
            }
        }
        current = arena.next_node(current);
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(text: &str) -> String {
        let mut arena = Arena::new();
        let node = arena.parse(text).unwrap();
        basic_reduce(&mut arena, node).unwrap();
        arena.display(node).to_string()
    }

    #[test]
    fn test_division_and_subtraction() {
        assert_eq!(project("(/ a b)"), "(* a (^ b -1))");
        assert_eq!(project("(- a b)"), "(+ a (* -1 b))");
        assert_eq!(project("(- a)"), "(* -1 a)");
    }

    #[test]
    fn test_functions() {
        assert_eq!(project("(sin x)"), "(trig x 1)");
        assert_eq!(project("(cos (sqrt x))"), "(trig (^ x 1/2) 0)");
        assert_eq!(project("(tan x)"), "(* (trig x 1) (^ (trig x 0) -1))");
        assert_eq!(project("(log x)"), "(* (ln x) (^ (ln 10) -1))");
        assert_eq!(project("(log x 2)"), "(* (ln x) (^ (ln 2) -1))");
        assert_eq!(project("(^ e x)"), "(exp x)");
        assert_eq!(project("(+ e 1)"), "(+ (exp 1) 1)");
    }

    #[test]
    fn test_decimal_and_nesting() {
        assert_eq!(project("(dec 125 2)"), "5/4");
        assert_eq!(project("(f (- (/ a b) c))"), "(f (+ (* a (^ b -1)) (* -1 c)))");
        assert_eq!(project("(+ a (+ b (- c)))"), "(+ a b (* -1 c))");
    }

    #[test]
    fn test_float_relaxes() {
        let mut arena = Arena::new();
        let node = arena.parse("(+ x 0.5)").unwrap();
        assert_eq!(basic_reduce(&mut arena, node), Err(Error::RelaxContext));
        let context = ProjectionContext {
            strategy: Strategy::ApproximateToFloat,
        };
        let node = arena.parse("(+ x 0.5 (* 2 pi))").unwrap();
        assert!(deep_project(&mut arena, node, context).unwrap());
        let text = arena.display(node).to_string();
        assert!(text.starts_with("(+ x 0.5 6.28318"), "{text}");
    }
}
