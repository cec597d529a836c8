//! S-expression reader and printer.
//!
//! A debugging notation, not a user-facing parser: `(+ x (* 2 y))`,
//! `(^ x 1/2)`, `(trig x 1)`, `(dec 125 2)` for `1.25`, `(poly:2:0 x 3 1)`
//! for `3x^2 + 1`, and `(f x)` for a named function. Printing then parsing
//! a tree gives back the same bytes.

use std::fmt;

use arbor_integers::{Integer, Rational};
use thiserror::Error;

use crate::arena::Arena;
use crate::error::Error;
use crate::handle::Node;
use crate::tag::{Constant, Tag};

/// Errors from [`Arena::parse`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input ended inside an expression.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A token that cannot appear here.
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),

    /// Wrong number of arguments for an operator.
    #[error("`{operator}` expects {expected} arguments, found {found}")]
    Arity {
        /// The operator as written.
        operator: String,
        /// Required argument count.
        expected: usize,
        /// Parsed argument count.
        found: usize,
    },

    /// A malformed numeric literal.
    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    /// The arena rejected the tree.
    #[error(transparent)]
    Arena(#[from] Error),
}

fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (index, ch) in text.char_indices() {
        if ch == '(' || ch == ')' || ch.is_whitespace() {
            if let Some(from) = start.take() {
                tokens.push(&text[from..index]);
            }
            if !ch.is_whitespace() {
                tokens.push(&text[index..=index]);
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(from) = start {
        tokens.push(&text[from..]);
    }
    tokens
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}

enum Head {
    NAry(Tag),
    Fixed(Tag),
    Minus,
    Log,
    Decimal,
    Polynomial(Vec<u8>),
    Function,
}

fn head(operator: &str) -> Result<Head, ParseError> {
    let head = match operator {
        "+" => Head::NAry(Tag::Addition),
        "*" => Head::NAry(Tag::Multiplication),
        "set" => Head::NAry(Tag::Set),
        "and" => Head::NAry(Tag::LogicalAnd),
        "or" => Head::NAry(Tag::LogicalOr),
        "-" => Head::Minus,
        "log" => Head::Log,
        "dec" => Head::Decimal,
        "^" => Head::Fixed(Tag::Power),
        "/" => Head::Fixed(Tag::Division),
        "trig" => Head::Fixed(Tag::Trig),
        "exp" => Head::Fixed(Tag::Exponential),
        "ln" => Head::Fixed(Tag::Ln),
        "abs" => Head::Fixed(Tag::Abs),
        "sin" => Head::Fixed(Tag::Sine),
        "cos" => Head::Fixed(Tag::Cosine),
        "tan" => Head::Fixed(Tag::Tangent),
        "asin" => Head::Fixed(Tag::ArcSine),
        "acos" => Head::Fixed(Tag::ArcCosine),
        "atan" => Head::Fixed(Tag::ArcTangent),
        "sqrt" => Head::Fixed(Tag::SquareRoot),
        "not" => Head::Fixed(Tag::LogicalNot),
        _ => {
            if let Some(exponents) = operator.strip_prefix("poly") {
                let exponents = exponents
                    .split(':')
                    .skip(1)
                    .map(|e| e.parse::<u8>().map_err(|_| ParseError::InvalidNumber(e.to_owned())))
                    .collect::<Result<Vec<_>, _>>()?;
                Head::Polynomial(exponents)
            } else if is_identifier(operator) {
                Head::Function
            } else {
                return Err(ParseError::UnexpectedToken(operator.to_owned()));
            }
        }
    };
    Ok(head)
}

struct Parser<'t> {
    tokens: Vec<&'t str>,
    position: usize,
}

impl<'t> Parser<'t> {
    fn next(&mut self) -> Result<&'t str, ParseError> {
        let token = self.tokens.get(self.position).copied().ok_or(ParseError::UnexpectedEnd)?;
        self.position += 1;
        Ok(token)
    }

    fn peek(&self) -> Option<&'t str> {
        self.tokens.get(self.position).copied()
    }

    fn expression(&mut self, arena: &mut Arena) -> Result<Node, ParseError> {
        match self.next()? {
            "(" => self.application(arena),
            ")" => Err(ParseError::UnexpectedToken(")".to_owned())),
            atom => Self::atom(arena, atom),
        }
    }

    fn arguments(&mut self, arena: &mut Arena) -> Result<usize, ParseError> {
        let mut count = 0;
        loop {
            match self.peek() {
                None => return Err(ParseError::UnexpectedEnd),
                Some(")") => {
                    self.position += 1;
                    return Ok(count);
                }
                Some(_) => {
                    self.expression(arena)?;
                    count += 1;
                }
            }
        }
    }

    fn application(&mut self, arena: &mut Arena) -> Result<Node, ParseError> {
        let operator = self.next()?;
        let arity = |expected: usize, found: usize| {
            if expected == found {
                Ok(())
            } else {
                Err(ParseError::Arity {
                    operator: operator.to_owned(),
                    expected,
                    found,
                })
            }
        };
        let node = match head(operator)? {
            Head::NAry(tag) => {
                let node = arena.push_n_ary(tag, 0)?;
                let count = self.arguments(arena)?;
                arena.set_number_of_children(node, count)?;
                node
            }
            Head::Fixed(tag) => {
                let node = arena.push(tag)?;
                arity(tag.fixed_arity().unwrap_or(0), self.arguments(arena)?)?;
                node
            }
            Head::Minus => {
                let node = arena.push(Tag::Opposite)?;
                match self.arguments(arena)? {
                    1 => {}
                    2 => arena.set_tag(node, Tag::Subtraction),
                    found => arity(2, found)?,
                }
                node
            }
            Head::Log => {
                let node = arena.push(Tag::Log)?;
                match self.arguments(arena)? {
                    1 => {}
                    2 => arena.set_tag(node, Tag::Logarithm),
                    found => arity(1, found)?,
                }
                node
            }
            Head::Decimal => {
                let node = arena.push_decimal(0)?;
                let mantissa = self.expression(arena)?;
                if !arena.tag(mantissa).is_integer() {
                    return Err(ParseError::InvalidNumber(arena.display(mantissa).to_string()));
                }
                let digits = self.next()?;
                let digits = digits
                    .parse::<u8>()
                    .map_err(|_| ParseError::InvalidNumber(digits.to_owned()))?;
                arena.write_byte(node.offset() + 1, digits);
                arity(0, self.arguments(arena)?)?;
                node
            }
            Head::Polynomial(exponents) => {
                let node = arena.push_polynomial(&exponents)?;
                arity(exponents.len() + 1, self.arguments(arena)?)?;
                node
            }
            Head::Function => {
                let node = arena.push_function(operator)?;
                arity(1, self.arguments(arena)?)?;
                node
            }
        };
        Ok(node)
    }

    fn atom(arena: &mut Arena, token: &str) -> Result<Node, ParseError> {
        let node = match token {
            "pi" => arena.push_constant(Constant::Pi)?,
            "e" => arena.push_constant(Constant::E)?,
            "i" => arena.push_constant(Constant::I)?,
            "undef" => arena.push(Tag::Undefined)?,
            "true" => arena.push(Tag::True)?,
            "false" => arena.push(Tag::False)?,
            _ => {
                if let Ok(integer) = Integer::from_str_radix(token, 10) {
                    arena.push_integer(&integer)?
                } else if let Some((numerator, denominator)) = token.split_once('/') {
                    let invalid = || ParseError::InvalidNumber(token.to_owned());
                    let numerator = Integer::from_str_radix(numerator, 10).map_err(|_| invalid())?;
                    let denominator =
                        Integer::from_str_radix(denominator, 10).map_err(|_| invalid())?;
                    if denominator.signum() == 0 {
                        return Err(invalid());
                    }
                    arena.push_rational(&Rational::new(numerator, denominator))?
                } else if token.starts_with(is_float_start) {
                    let value = token
                        .parse::<f64>()
                        .map_err(|_| ParseError::InvalidNumber(token.to_owned()))?;
                    arena.push_float(value)?
                } else if is_identifier(token) {
                    arena.push_symbol(token)?
                } else {
                    return Err(ParseError::UnexpectedToken(token.to_owned()));
                }
            }
        };
        Ok(node)
    }
}

fn is_float_start(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '-' | '.')
}

impl Arena {
    /// Parses an s-expression into a new tree at the tail.
    ///
    /// Nothing is left behind on failure.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for malformed input or a full arena.
    pub fn parse(&mut self, text: &str) -> Result<Node, ParseError> {
        let checkpoint = self.len();
        let mut parser = Parser {
            tokens: tokenize(text),
            position: 0,
        };
        let result = parser.expression(self).and_then(|node| match parser.peek() {
            None => Ok(node),
            Some(extra) => Err(ParseError::UnexpectedToken(extra.to_owned())),
        });
        if result.is_err() {
            self.truncate(checkpoint);
        }
        result
    }

    /// Formats a tree as an s-expression.
    #[must_use]
    pub fn display(&self, node: Node) -> TreeDisplay<'_> {
        TreeDisplay { arena: self, node }
    }
}

/// [`fmt::Display`] adapter returned by [`Arena::display`].
#[derive(Clone, Copy, Debug)]
pub struct TreeDisplay<'a> {
    arena: &'a Arena,
    node: Node,
}

impl TreeDisplay<'_> {
    fn write(&self, node: Node, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena;
        let tag = arena.tag(node);
        if tag.is_rational() {
            return match arena.rational_value(node) {
                Some(value) => write!(f, "{value}"),
                None => f.write_str("?"),
            };
        }
        match tag {
            Tag::Float => return write!(f, "{:?}", arena.float_value(node).unwrap_or(f64::NAN)),
            Tag::Constant => {
                let name = arena.constant_value(node).map_or("?", Constant::name);
                return f.write_str(name);
            }
            Tag::UserSymbol => return f.write_str(arena.symbol_name(node).unwrap_or("?")),
            Tag::True | Tag::False | Tag::Undefined => return f.write_str(tag.operator()),
            _ => {}
        }
        f.write_str("(")?;
        match tag {
            Tag::UserFunction => f.write_str(arena.symbol_name(node).unwrap_or("?"))?,
            Tag::Polynomial => {
                f.write_str("poly")?;
                for exponent in arena.polynomial_exponents(node) {
                    write!(f, ":{exponent}")?;
                }
            }
            _ => f.write_str(tag.operator())?,
        }
        for child in arena.children(node) {
            f.write_str(" ")?;
            self.write(child, f)?;
        }
        if tag == Tag::Decimal {
            write!(f, " {}", arena.decimal_digits(node))?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(self.node, f)
    }
}
