//! Structural patterns, bindings and rewrite rules.
//!
//! A [`Pattern`] is matched against a reduced tree. Inside a sum, product,
//! set or connective, an [`Pattern::AnyTrees`] placeholder absorbs zero or
//! more consecutive children and the matcher backtracks over how many. A
//! placeholder bound twice must denote byte-identical trees.
//!
//! Rules are written with the constructors in [`build`]:
//!
//! ```
//! use arbor_simplify::pattern::build::{any, ln, mult, seq, add};
//! use arbor_simplify::pattern::{Placeholder::*, Rule};
//!
//! // ln(A*B...) -> ln(A) + ln(B...)
//! let rule = Rule::new(
//!     "expand-ln-product",
//!     ln(mult([any(A), seq(B)])),
//!     add([ln(any(A)), ln(mult([seq(B)]))]),
//! );
//! # let _ = rule;
//! ```

use arbor_core::{Arena, Error, Node, Result, Tag};
use smallvec::SmallVec;
use tracing::trace;

use crate::n_ary;
use crate::systematic;

/// A pattern variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Placeholder {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Placeholder {
    const COUNT: usize = 8;

    const fn index(self) -> usize {
        self as usize
    }
}

/// A tree shape with holes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Exactly one tree.
    Any(Placeholder),
    /// Zero or more consecutive siblings of a variable-arity node.
    AnyTrees(Placeholder),
    /// A fixed tree, compared byte for byte.
    Literal(Box<[u8]>),
    /// A node with the given tag. The payload is compared except for
    /// variable-arity tags, whose count follows from `children`.
    Node {
        /// Node tag.
        tag: Tag,
        /// Header bytes after the tag.
        payload: Box<[u8]>,
        /// Child patterns.
        children: Vec<Pattern>,
    },
}

/// What a placeholder stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    /// A single tree.
    Tree(Node),
    /// `count` consecutive sibling trees starting at `first`.
    Trees {
        /// First tree of the run, `None` for an empty run.
        first: Option<Node>,
        /// Length of the run.
        count: usize,
    },
}

impl Binding {
    fn run(self) -> (Option<Node>, usize) {
        match self {
            Binding::Tree(node) => (Some(node), 1),
            Binding::Trees { first, count } => (first, count),
        }
    }
}

/// Placeholder assignments of one match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    slots: [Option<Binding>; Placeholder::COUNT],
}

impl Bindings {
    /// The binding of a placeholder.
    #[must_use]
    pub fn get(&self, placeholder: Placeholder) -> Option<Binding> {
        self.slots[placeholder.index()]
    }

    /// The tree bound to a placeholder, if it is bound to exactly one.
    #[must_use]
    pub fn tree(&self, placeholder: Placeholder) -> Option<Node> {
        match self.get(placeholder)?.run() {
            (first, 1) => first,
            _ => None,
        }
    }

    fn set(&mut self, placeholder: Placeholder, binding: Binding) {
        self.slots[placeholder.index()] = Some(binding);
    }
}

/// Matches `pattern` against the tree at `node`.
#[must_use]
pub fn match_pattern(arena: &Arena, pattern: &Pattern, node: Node) -> Option<Bindings> {
    match_pattern_where(arena, pattern, node, |_| true)
}

/// Returns the first match of `pattern` whose bindings `accept` approves.
///
/// A refusal resumes the search, so every way of splitting the sequence
/// placeholders is offered before giving up.
#[must_use]
pub fn match_pattern_where(
    arena: &Arena,
    pattern: &Pattern,
    node: Node,
    mut accept: impl FnMut(&Bindings) -> bool,
) -> Option<Bindings> {
    let mut found = None;
    matches(
        arena,
        pattern,
        node,
        &Bindings::default(),
        &mut |bindings: &Bindings| {
            if accept(bindings) {
                found = Some(*bindings);
                true
            } else {
                false
            }
        },
    );
    found
}

/// Receives the bindings of a match of everything to the left and decides
/// whether the whole match succeeds.
type Continuation<'a> = dyn FnMut(&Bindings) -> bool + 'a;

fn matches(
    arena: &Arena,
    pattern: &Pattern,
    node: Node,
    bindings: &Bindings,
    then: &mut Continuation<'_>,
) -> bool {
    match pattern {
        Pattern::Any(placeholder) | Pattern::AnyTrees(placeholder) => {
            match bindings.get(*placeholder).map(Binding::run) {
                Some((Some(bound), 1)) => arena.tree_is_identical(bound, node) && then(bindings),
                Some(_) => false,
                None => {
                    let mut extended = *bindings;
                    extended.set(*placeholder, Binding::Tree(node));
                    then(&extended)
                }
            }
        }
        Pattern::Literal(bytes) => arena.tree_bytes(node) == &bytes[..] && then(bindings),
        Pattern::Node {
            tag,
            payload,
            children,
        } => {
            if arena.tag(node) != *tag {
                return false;
            }
            let subjects: SmallVec<[Node; 8]> = arena.children(node).collect();
            if tag.is_n_ary() && *tag != Tag::Polynomial {
                return match_sequence(arena, children, &subjects, bindings, then);
            }
            let header = &arena.bytes()[node.offset() + 1..node.offset() + arena.node_size(node)];
            header == &payload[..]
                && subjects.len() == children.len()
                && match_children(arena, children, &subjects, bindings, then)
        }
    }
}

/// Matches fixed-arity children pairwise.
fn match_children(
    arena: &Arena,
    patterns: &[Pattern],
    subjects: &[Node],
    bindings: &Bindings,
    then: &mut Continuation<'_>,
) -> bool {
    let (Some((first, rest)), Some((&subject, others))) =
        (patterns.split_first(), subjects.split_first())
    else {
        return then(bindings);
    };
    matches(arena, first, subject, bindings, &mut |next: &Bindings| {
        match_children(arena, rest, others, next, &mut *then)
    })
}

fn match_sequence(
    arena: &Arena,
    patterns: &[Pattern],
    subjects: &[Node],
    bindings: &Bindings,
    then: &mut Continuation<'_>,
) -> bool {
    let Some((first, rest)) = patterns.split_first() else {
        return subjects.is_empty() && then(bindings);
    };
    if let Pattern::AnyTrees(placeholder) = first {
        if let Some(bound) = bindings.get(*placeholder) {
            let (start, count) = bound.run();
            if subjects.len() < count {
                return false;
            }
            let mut expected = start;
            for &subject in &subjects[..count] {
                let Some(tree) = expected else { return false };
                if !arena.tree_is_identical(tree, subject) {
                    return false;
                }
                expected = Some(arena.next_tree(tree));
            }
            return match_sequence(arena, rest, &subjects[count..], bindings, then);
        }
        for count in 0..=subjects.len() {
            let mut extended = *bindings;
            extended.set(
                *placeholder,
                Binding::Trees {
                    first: subjects.first().copied().filter(|_| count > 0),
                    count,
                },
            );
            if match_sequence(arena, rest, &subjects[count..], &extended, then) {
                return true;
            }
        }
        return false;
    }
    let Some((&subject, others)) = subjects.split_first() else {
        return false;
    };
    matches(arena, first, subject, bindings, &mut |next: &Bindings| {
        match_sequence(arena, rest, others, next, &mut *then)
    })
}

/// Builds `pattern` at the tail with its placeholders filled in.
///
/// Sums and products left with zero or one child are collapsed.
///
/// # Errors
///
/// Returns [`Error::UnboundPlaceholder`] before writing anything if the
/// template names a placeholder `bindings` leaves unset, and an error if the
/// arena is full or a node outgrows 255 children.
pub fn instantiate(arena: &mut Arena, pattern: &Pattern, bindings: &Bindings) -> Result<Node> {
    if !is_covered(pattern, bindings) {
        return Err(Error::UnboundPlaceholder);
    }
    let root = arena.end();
    let written = write(arena, pattern, bindings)?;
    debug_assert_eq!(written, 1, "a template must produce exactly one tree");
    Ok(root)
}

fn is_covered(pattern: &Pattern, bindings: &Bindings) -> bool {
    match pattern {
        Pattern::Any(placeholder) | Pattern::AnyTrees(placeholder) => {
            bindings.get(*placeholder).is_some()
        }
        Pattern::Literal(_) => true,
        Pattern::Node { children, .. } => children.iter().all(|child| is_covered(child, bindings)),
    }
}

fn write(arena: &mut Arena, pattern: &Pattern, bindings: &Bindings) -> Result<usize> {
    match pattern {
        Pattern::Any(placeholder) | Pattern::AnyTrees(placeholder) => {
            let (mut tree, count) = bindings
                .get(*placeholder)
                .map_or((None, 0), Binding::run);
            for _ in 0..count {
                let Some(source) = tree else { break };
                arena.clone_tree(source)?;
                tree = Some(arena.next_tree(source));
            }
            Ok(count)
        }
        Pattern::Literal(bytes) => {
            arena.push_bytes(bytes)?;
            Ok(1)
        }
        Pattern::Node {
            tag,
            payload,
            children,
        } => {
            let node = arena.end();
            if tag.is_n_ary() && *tag != Tag::Polynomial {
                arena.push_n_ary(*tag, 0)?;
                let mut count = 0;
                for child in children {
                    count += write(arena, child, bindings)?;
                }
                arena.set_number_of_children(node, count)?;
                n_ary::sanitize(arena, node)?;
            } else {
                let mut header = Vec::with_capacity(1 + payload.len());
                header.push(tag.byte());
                header.extend_from_slice(payload);
                arena.push_bytes(&header)?;
                for child in children {
                    write(arena, child, bindings)?;
                }
            }
            Ok(1)
        }
    }
}

/// Replaces `node` with `rhs` if it matches `lhs`.
///
/// # Errors
///
/// Returns an error if the arena is full or `rhs` uses a placeholder `lhs`
/// does not bind; the tree is left as it was.
pub fn match_and_replace(
    arena: &mut Arena,
    node: Node,
    lhs: &Pattern,
    rhs: &Pattern,
) -> Result<bool> {
    let Some(bindings) = match_pattern(arena, lhs, node) else {
        return Ok(false);
    };
    replace(arena, node, rhs, &bindings)?;
    Ok(true)
}

/// [`match_and_replace`] followed by a deep reduction of the result.
///
/// # Errors
///
/// Returns an error if the arena is full or reduction fails.
pub fn match_replace_and_simplify(
    arena: &mut Arena,
    node: Node,
    lhs: &Pattern,
    rhs: &Pattern,
) -> Result<bool> {
    if !match_and_replace(arena, node, lhs, rhs)? {
        return Ok(false);
    }
    systematic::deep_reduce(arena, node)?;
    Ok(true)
}

fn replace(arena: &mut Arena, node: Node, rhs: &Pattern, bindings: &Bindings) -> Result<()> {
    let created = instantiate(arena, rhs, bindings)?;
    arena.move_tree_over_tree(node, created);
    Ok(())
}

/// A side condition over the bindings of a successful match.
pub type Condition = fn(&Arena, &Bindings) -> bool;

/// A named rewrite.
#[derive(Clone, Debug)]
pub struct Rule {
    /// Name used in traces.
    pub name: &'static str,
    /// Shape to match.
    pub lhs: Pattern,
    /// Replacement template.
    pub rhs: Pattern,
    /// Extra test on the bindings.
    pub condition: Option<Condition>,
}

impl Rule {
    /// Creates an unconditional rule.
    #[must_use]
    pub fn new(name: &'static str, lhs: Pattern, rhs: Pattern) -> Self {
        Self {
            name,
            lhs,
            rhs,
            condition: None,
        }
    }

    /// Adds a side condition.
    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Rewrites `node` if the rule applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the arena is full.
    pub fn apply(&self, arena: &mut Arena, node: Node) -> Result<bool> {
        let view: &Arena = arena;
        let found = match_pattern_where(view, &self.lhs, node, |bindings| {
            self.condition.map_or(true, |condition| condition(view, bindings))
        });
        let Some(bindings) = found else {
            return Ok(false);
        };
        trace!(rule = self.name, %node, "rewrite");
        replace(arena, node, &self.rhs, &bindings)?;
        Ok(true)
    }
}

/// Applies the first rule of `rules` that matches `node`.
///
/// # Errors
///
/// Returns an error if the arena is full.
pub fn apply_first(arena: &mut Arena, node: Node, rules: &[Rule]) -> Result<bool> {
    for rule in rules {
        if rule.apply(arena, node)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// [`apply_first`] followed by a deep reduction of the result.
///
/// # Errors
///
/// Returns an error if the arena is full or reduction fails.
pub fn apply_first_and_simplify(arena: &mut Arena, node: Node, rules: &[Rule]) -> Result<bool> {
    if !apply_first(arena, node, rules)? {
        return Ok(false);
    }
    systematic::deep_reduce(arena, node)?;
    Ok(true)
}

/// Pattern constructors.
pub mod build {
    use arbor_core::{Constant, Tag};

    use super::{Pattern, Placeholder};

    /// One tree.
    #[must_use]
    pub fn any(placeholder: Placeholder) -> Pattern {
        Pattern::Any(placeholder)
    }

    /// A run of sibling trees.
    #[must_use]
    pub fn seq(placeholder: Placeholder) -> Pattern {
        Pattern::AnyTrees(placeholder)
    }

    /// A small integer.
    #[must_use]
    pub fn int(value: i8) -> Pattern {
        let bytes: Box<[u8]> = match value {
            0 => Box::new([Tag::Zero.byte()]),
            1 => Box::new([Tag::One.byte()]),
            2 => Box::new([Tag::Two.byte()]),
            -1 => Box::new([Tag::MinusOne.byte()]),
            _ => Box::new([Tag::IntegerShort.byte(), value.to_le_bytes()[0]]),
        };
        Pattern::Literal(bytes)
    }

    /// The rational 1/2.
    #[must_use]
    pub fn half() -> Pattern {
        Pattern::Literal(Box::new([Tag::Half.byte()]))
    }

    /// A constant.
    #[must_use]
    pub fn constant(constant: Constant) -> Pattern {
        Pattern::Literal(Box::new([Tag::Constant.byte(), constant as u8]))
    }

    /// A childless leaf such as `true` or `undef`.
    #[must_use]
    pub fn leaf(tag: Tag) -> Pattern {
        Pattern::Literal(Box::new([tag.byte()]))
    }

    /// A node without payload.
    #[must_use]
    pub fn node(tag: Tag, children: impl IntoIterator<Item = Pattern>) -> Pattern {
        Pattern::Node {
            tag,
            payload: Box::new([]),
            children: children.into_iter().collect(),
        }
    }

    /// A sum.
    #[must_use]
    pub fn add(children: impl IntoIterator<Item = Pattern>) -> Pattern {
        node(Tag::Addition, children)
    }

    /// A product.
    #[must_use]
    pub fn mult(children: impl IntoIterator<Item = Pattern>) -> Pattern {
        node(Tag::Multiplication, children)
    }

    /// `base ^ exponent`.
    #[must_use]
    pub fn pow(base: Pattern, exponent: Pattern) -> Pattern {
        node(Tag::Power, [base, exponent])
    }

    /// `trig(angle, k)`.
    #[must_use]
    pub fn trig(angle: Pattern, k: Pattern) -> Pattern {
        node(Tag::Trig, [angle, k])
    }

    /// Natural exponential.
    #[must_use]
    pub fn exp(argument: Pattern) -> Pattern {
        node(Tag::Exponential, [argument])
    }

    /// Natural logarithm.
    #[must_use]
    pub fn ln(argument: Pattern) -> Pattern {
        node(Tag::Ln, [argument])
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(argument: Pattern) -> Pattern {
        node(Tag::Abs, [argument])
    }

    /// Logical negation.
    #[must_use]
    pub fn not(argument: Pattern) -> Pattern {
        node(Tag::LogicalNot, [argument])
    }

    /// A unary node of the given tag.
    #[must_use]
    pub fn unary(tag: Tag, argument: Pattern) -> Pattern {
        node(tag, [argument])
    }

    /// A binary node of the given tag.
    #[must_use]
    pub fn binary(tag: Tag, left: Pattern, right: Pattern) -> Pattern {
        node(tag, [left, right])
    }
}

#[cfg(test)]
mod tests {
    use super::build::*;
    use super::Placeholder::*;
    use super::*;

    #[test]
    fn test_double_negation_fires_once() {
        let mut arena = Arena::new();
        let inner = arena.parse("(+ a b)").unwrap();
        let node = arena.parse("(not (not (+ a b)))").unwrap();
        let rule = Rule::new("not-not", not(not(any(A))), any(A));
        assert!(rule.apply(&mut arena, node).unwrap());
        assert_eq!(arena.display(node).to_string(), "(+ a b)");
        assert!(arena.tree_is_identical(node, inner));
        assert!(!rule.apply(&mut arena, node).unwrap());
    }

    #[test]
    fn test_repeated_placeholder_requires_identity() {
        let mut arena = Arena::new();
        let pattern = add([any(A), any(A)]);
        let same = arena.parse("(+ x x)").unwrap();
        let different = arena.parse("(+ x y)").unwrap();
        assert!(match_pattern(&arena, &pattern, same).is_some());
        assert!(match_pattern(&arena, &pattern, different).is_none());
    }

    #[test]
    fn test_sequences_backtrack() {
        let mut arena = Arena::new();
        let node = arena.parse("(+ a (ln b) c (ln d) e)").unwrap();
        let pattern = add([seq(A), ln(any(B)), seq(C), ln(any(D)), seq(E)]);
        let bindings = match_pattern(&arena, &pattern, node).unwrap();
        assert_eq!(bindings.get(A).map(Binding::run).map(|run| run.1), Some(1));
        assert_eq!(arena.display(bindings.tree(B).unwrap()).to_string(), "b");
        assert_eq!(arena.display(bindings.tree(D).unwrap()).to_string(), "d");
        assert_eq!(bindings.get(E).map(Binding::run).map(|run| run.1), Some(1));
    }

    #[test]
    fn test_inner_split_retried_for_later_sibling() {
        let mut arena = Arena::new();
        let node = arena.parse("(+ (* x y) y)").unwrap();
        let pattern = add([mult([seq(A), any(B), seq(C)]), any(B)]);
        let bindings = match_pattern(&arena, &pattern, node).unwrap();
        assert_eq!(arena.display(bindings.tree(B).unwrap()).to_string(), "y");
        assert_eq!(bindings.get(A).map(Binding::run).map(|run| run.1), Some(1));
        assert_eq!(bindings.get(C).map(Binding::run).map(|run| run.1), Some(0));
    }

    #[test]
    fn test_condition_retries_other_splits() {
        let mut arena = Arena::new();
        let node = arena.parse("(+ x y z)").unwrap();
        let rule = Rule::new("pick-y", add([seq(A), any(B), seq(C)]), any(B)).when(
            |arena, bindings| {
                bindings
                    .tree(B)
                    .is_some_and(|b| arena.display(b).to_string() == "y")
            },
        );
        assert!(rule.apply(&mut arena, node).unwrap());
        assert_eq!(arena.display(node).to_string(), "y");
    }

    #[test]
    fn test_unbound_template_placeholder_is_rejected() {
        let mut arena = Arena::new();
        let node = arena.parse("(not x)").unwrap();
        let end = arena.end();
        assert_eq!(
            match_and_replace(&mut arena, node, &not(any(A)), &not(any(B))),
            Err(Error::UnboundPlaceholder)
        );
        assert_eq!(arena.end(), end);
        assert_eq!(arena.display(node).to_string(), "(not x)");
    }

    #[test]
    fn test_instantiate_splices_and_collapses() {
        let mut arena = Arena::new();
        let node = arena.parse("(+ a (ln b) (ln d))").unwrap();
        let lhs = add([seq(A), ln(any(B)), seq(C), ln(any(D)), seq(E)]);
        let rhs = add([seq(A), seq(C), ln(mult([any(B), any(D)])), seq(E)]);
        assert!(match_and_replace(&mut arena, node, &lhs, &rhs).unwrap());
        assert_eq!(arena.display(node).to_string(), "(+ a (ln (* b d)))");

        let single = arena.parse("(ln (* x))").unwrap();
        let lhs = ln(mult([any(A), seq(B)]));
        let rhs = add([ln(any(A)), ln(mult([seq(B)]))]);
        assert!(match_and_replace(&mut arena, single, &lhs, &rhs).unwrap());
        assert_eq!(arena.display(single).to_string(), "(+ (ln x) (ln 1))");
    }

    #[test]
    fn test_condition_blocks_rule() {
        let mut arena = Arena::new();
        let node = arena.parse("(^ x 3)").unwrap();
        let rule = Rule::new("square", pow(any(A), any(B)), any(A))
            .when(|arena, bindings| bindings.tree(B).is_some_and(|b| arena.is_one(b)));
        assert!(!rule.apply(&mut arena, node).unwrap());
    }

    #[test]
    fn test_match_replace_and_simplify() {
        let mut arena = Arena::new();
        let node = arena.parse("(f (+ 1 2))").unwrap();
        let lhs = Pattern::Node {
            tag: Tag::UserFunction,
            payload: Box::new([1, b'f']),
            children: vec![any(A)],
        };
        let rhs = mult([any(A), int(2)]);
        assert!(match_replace_and_simplify(&mut arena, node, &lhs, &rhs).unwrap());
        assert_eq!(arena.display(node).to_string(), "6");
    }
}
