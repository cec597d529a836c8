//! Reading leaf payloads back out of the arena.

use arbor_integers::{Integer, Rational};

use crate::arena::Arena;
use crate::error::Result;
use crate::handle::Node;
use crate::tag::{Constant, Tag};

/// A folded numeric value: exact when possible, a double otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    /// An integer or rational.
    Exact(Rational),
    /// An approximation.
    Float(f64),
}

impl Number {
    /// Sum of two numbers; floats contaminate.
    #[must_use]
    pub fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Number::Exact(a + b),
            _ => Number::Float(self.to_f64() + other.to_f64()),
        }
    }

    /// Product of two numbers; floats contaminate.
    #[must_use]
    pub fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Number::Exact(a * b),
            _ => Number::Float(self.to_f64() * other.to_f64()),
        }
    }

    /// Approximation as a double.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Exact(value) => value.to_f64(),
            Number::Float(value) => *value,
        }
    }

    /// Whether the value is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Number::Exact(value) => value.signum() == 0,
            Number::Float(value) => *value == 0.0,
        }
    }

    /// Whether the value is exactly one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        match self {
            Number::Exact(value) => *value == Rational::from(1),
            Number::Float(value) => (*value - 1.0).abs() < f64::EPSILON,
        }
    }
}

impl Arena {
    fn payload(&self, node: Node, start: usize, len: usize) -> &[u8] {
        let from = node.offset() + 1 + start;
        &self.blocks[from..from + len]
    }

    /// The value of an integer leaf.
    #[must_use]
    pub fn integer_value(&self, node: Node) -> Option<Integer> {
        let tag = self.tag(node);
        let value = match tag {
            Tag::Zero => Integer::new(0),
            Tag::One => Integer::new(1),
            Tag::Two => Integer::new(2),
            Tag::MinusOne => Integer::new(-1),
            Tag::IntegerShort => {
                Integer::new(i64::from(i8::from_le_bytes([self.payload_byte(node, 0)])))
            }
            Tag::IntegerPosBig | Tag::IntegerNegBig => {
                let len = usize::from(self.payload_byte(node, 0));
                Integer::from_le_magnitude(tag == Tag::IntegerNegBig, self.payload(node, 1, len))
            }
            _ => return None,
        };
        Some(value)
    }

    /// The value of an integer or rational leaf.
    #[must_use]
    pub fn rational_value(&self, node: Node) -> Option<Rational> {
        let tag = self.tag(node);
        if tag.is_integer() {
            return self.integer_value(node).map(Rational::from);
        }
        let value = match tag {
            Tag::Half => Rational::from_i64(1, 2),
            Tag::RationalShort => Rational::from_i64(
                i64::from(i8::from_le_bytes([self.payload_byte(node, 0)])),
                i64::from(self.payload_byte(node, 1)),
            ),
            Tag::RationalPosBig | Tag::RationalNegBig => {
                let n = usize::from(self.payload_byte(node, 0));
                let d = usize::from(self.payload_byte(node, 1));
                Rational::new(
                    Integer::from_le_magnitude(
                        tag == Tag::RationalNegBig,
                        self.payload(node, 2, n),
                    ),
                    Integer::from_le_magnitude(false, self.payload(node, 2 + n, d)),
                )
            }
            _ => return None,
        };
        Some(value)
    }

    /// The value of a float leaf.
    #[must_use]
    pub fn float_value(&self, node: Node) -> Option<f64> {
        if self.tag(node) != Tag::Float {
            return None;
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.payload(node, 0, 8));
        Some(f64::from_le_bytes(bytes))
    }

    /// The value of an exact or float leaf. Constants are not numbers here.
    #[must_use]
    pub fn number_value(&self, node: Node) -> Option<Number> {
        self.rational_value(node)
            .map(Number::Exact)
            .or_else(|| self.float_value(node).map(Number::Float))
    }

    /// Pushes a folded number.
    ///
    /// # Errors
    ///
    /// Returns an error if the arena is full or a magnitude is too long.
    pub fn push_number(&mut self, value: &Number) -> Result<Node> {
        match value {
            Number::Exact(exact) => self.push_rational(exact),
            Number::Float(float) => self.push_float(*float),
        }
    }

    /// The kind of a constant leaf.
    #[must_use]
    pub fn constant_value(&self, node: Node) -> Option<Constant> {
        if self.tag(node) != Tag::Constant {
            return None;
        }
        Constant::from_byte(self.payload_byte(node, 0))
    }

    /// The name of a variable or function.
    #[must_use]
    pub fn symbol_name(&self, node: Node) -> Option<&str> {
        if !self.tag(node).is_user_named() {
            return None;
        }
        let len = usize::from(self.payload_byte(node, 0));
        std::str::from_utf8(self.payload(node, 1, len)).ok()
    }

    /// Digits after the point of a decimal node.
    #[must_use]
    pub fn decimal_digits(&self, node: Node) -> u8 {
        debug_assert_eq!(self.tag(node), Tag::Decimal);
        self.payload_byte(node, 0)
    }

    /// Exponents of a polynomial node, one per coefficient.
    #[must_use]
    pub fn polynomial_exponents(&self, node: Node) -> &[u8] {
        debug_assert_eq!(self.tag(node), Tag::Polynomial);
        let count = usize::from(self.payload_byte(node, 0));
        self.payload(node, 1, count - 1)
    }

    /// Whether the node is the integer 0.
    #[must_use]
    pub fn is_zero(&self, node: Node) -> bool {
        self.tag(node) == Tag::Zero
    }

    /// Whether the node is the integer 1.
    #[must_use]
    pub fn is_one(&self, node: Node) -> bool {
        self.tag(node) == Tag::One
    }

    /// Whether the node is the integer -1.
    #[must_use]
    pub fn is_minus_one(&self, node: Node) -> bool {
        self.tag(node) == Tag::MinusOne
    }
}
