//! Building trees at the tail of the arena.
//!
//! Numbers always take their most compact encoding, so two equal exact
//! numbers are byte-identical. A tree is built by pushing its header and
//! then each child in preorder.

use arbor_integers::{Integer, Rational};
use num_traits::One;

use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::handle::Node;
use crate::tag::{Constant, Tag};

fn length_byte(tag: Tag, len: usize) -> Result<u8> {
    u8::try_from(len).map_err(|_| Error::PayloadOverflow(tag))
}

/// Appends the encoding of an integer to `out`.
///
/// # Errors
///
/// Returns [`Error::PayloadOverflow`] for magnitudes longer than 255 bytes.
pub fn encode_integer(value: &Integer, out: &mut Vec<u8>) -> Result<()> {
    match value.to_i64().and_then(|v| i8::try_from(v).ok()) {
        Some(0) => out.push(Tag::Zero.byte()),
        Some(1) => out.push(Tag::One.byte()),
        Some(2) => out.push(Tag::Two.byte()),
        Some(-1) => out.push(Tag::MinusOne.byte()),
        Some(small) => {
            out.push(Tag::IntegerShort.byte());
            out.extend_from_slice(&small.to_le_bytes());
        }
        None => {
            let tag = if value.is_negative() {
                Tag::IntegerNegBig
            } else {
                Tag::IntegerPosBig
            };
            let magnitude = value.to_le_magnitude();
            out.push(tag.byte());
            out.push(length_byte(tag, magnitude.len())?);
            out.extend_from_slice(&magnitude);
        }
    }
    Ok(())
}

/// Appends the encoding of a rational to `out`.
///
/// # Errors
///
/// Returns [`Error::PayloadOverflow`] for magnitudes longer than 255 bytes.
pub fn encode_rational(value: &Rational, out: &mut Vec<u8>) -> Result<()> {
    if let Some(integer) = value.to_integer() {
        return encode_integer(&integer, out);
    }
    let numerator = value.numerator();
    let denominator = value.denominator();
    if numerator.is_one() && denominator.to_i64() == Some(2) {
        out.push(Tag::Half.byte());
        return Ok(());
    }
    if let (Some(n), Some(d)) = (
        numerator.to_i64().and_then(|n| i8::try_from(n).ok()),
        denominator.to_i64().and_then(|d| u8::try_from(d).ok()),
    ) {
        out.push(Tag::RationalShort.byte());
        out.extend_from_slice(&n.to_le_bytes());
        out.push(d);
        return Ok(());
    }
    let tag = if value.is_negative() {
        Tag::RationalNegBig
    } else {
        Tag::RationalPosBig
    };
    let n = numerator.to_le_magnitude();
    let d = denominator.to_le_magnitude();
    out.push(tag.byte());
    out.push(length_byte(tag, n.len())?);
    out.push(length_byte(tag, d.len())?);
    out.extend_from_slice(&n);
    out.extend_from_slice(&d);
    Ok(())
}

/// Appends the encoding of a float to `out`.
pub fn encode_float(value: f64, out: &mut Vec<u8>) {
    out.push(Tag::Float.byte());
    out.extend_from_slice(&value.to_le_bytes());
}

/// Appends a symbol or function header to `out`.
///
/// # Errors
///
/// Returns [`Error::PayloadOverflow`] for names longer than 255 bytes.
pub fn encode_named(tag: Tag, name: &str, out: &mut Vec<u8>) -> Result<()> {
    debug_assert!(tag.is_user_named());
    out.push(tag.byte());
    out.push(length_byte(tag, name.len())?);
    out.extend_from_slice(name.as_bytes());
    Ok(())
}

impl Arena {
    /// Pushes a node whose header is the tag alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaExhausted`] if the arena is full.
    pub fn push(&mut self, tag: Tag) -> Result<Node> {
        debug_assert_eq!(tag.fixed_node_size(), Some(1), "{tag:?} needs a payload");
        self.push_bytes(&[tag.byte()])
    }

    /// Pushes a variable-arity header; the children must follow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArityOverflow`] for more than 255 children, or
    /// [`Error::ArenaExhausted`] if the arena is full.
    pub fn push_n_ary(&mut self, tag: Tag, children: usize) -> Result<Node> {
        debug_assert!(tag.is_n_ary() && tag != Tag::Polynomial);
        let count = u8::try_from(children).map_err(|_| Error::ArityOverflow(tag))?;
        self.push_bytes(&[tag.byte(), count])
    }

    /// Rewrites the child count of a variable-arity node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArityOverflow`] for more than 255 children.
    pub fn set_number_of_children(&mut self, node: Node, children: usize) -> Result<()> {
        let tag = self.tag(node);
        debug_assert!(tag.is_n_ary());
        let count = u8::try_from(children).map_err(|_| Error::ArityOverflow(tag))?;
        self.write_byte(node.offset() + 1, count);
        Ok(())
    }

    /// Replaces the tag byte of a node with another tag of the same layout.
    pub fn set_tag(&mut self, node: Node, tag: Tag) {
        debug_assert_eq!(tag.fixed_node_size(), self.tag(node).fixed_node_size());
        self.write_byte(node.offset(), tag.byte());
    }

    /// Pushes an integer leaf.
    ///
    /// # Errors
    ///
    /// Returns an error if the arena is full or the magnitude is too long.
    pub fn push_integer(&mut self, value: &Integer) -> Result<Node> {
        let mut bytes = Vec::with_capacity(4);
        encode_integer(value, &mut bytes)?;
        self.push_bytes(&bytes)
    }

    /// Pushes a small integer leaf.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaExhausted`] if the arena is full.
    pub fn push_int(&mut self, value: i64) -> Result<Node> {
        self.push_integer(&Integer::new(value))
    }

    /// Pushes an exact number leaf.
    ///
    /// # Errors
    ///
    /// Returns an error if the arena is full or a magnitude is too long.
    pub fn push_rational(&mut self, value: &Rational) -> Result<Node> {
        let mut bytes = Vec::with_capacity(4);
        encode_rational(value, &mut bytes)?;
        self.push_bytes(&bytes)
    }

    /// Pushes a float leaf.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaExhausted`] if the arena is full.
    pub fn push_float(&mut self, value: f64) -> Result<Node> {
        let mut bytes = Vec::with_capacity(9);
        encode_float(value, &mut bytes);
        self.push_bytes(&bytes)
    }

    /// Pushes a constant leaf.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaExhausted`] if the arena is full.
    pub fn push_constant(&mut self, constant: Constant) -> Result<Node> {
        self.push_bytes(&[Tag::Constant.byte(), constant as u8])
    }

    /// Pushes a variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the arena is full or the name is too long.
    pub fn push_symbol(&mut self, name: &str) -> Result<Node> {
        let mut bytes = Vec::with_capacity(2 + name.len());
        encode_named(Tag::UserSymbol, name, &mut bytes)?;
        self.push_bytes(&bytes)
    }

    /// Pushes a named function header; its argument must follow.
    ///
    /// # Errors
    ///
    /// Returns an error if the arena is full or the name is too long.
    pub fn push_function(&mut self, name: &str) -> Result<Node> {
        let mut bytes = Vec::with_capacity(2 + name.len());
        encode_named(Tag::UserFunction, name, &mut bytes)?;
        self.push_bytes(&bytes)
    }

    /// Pushes a decimal header with `digits` after the point; the integer
    /// mantissa must follow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaExhausted`] if the arena is full.
    pub fn push_decimal(&mut self, digits: u8) -> Result<Node> {
        self.push_bytes(&[Tag::Decimal.byte(), digits])
    }

    /// Pushes a polynomial header; the variable and one coefficient per
    /// exponent must follow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArityOverflow`] for 255 or more exponents, or
    /// [`Error::ArenaExhausted`] if the arena is full.
    pub fn push_polynomial(&mut self, exponents: &[u8]) -> Result<Node> {
        let count =
            u8::try_from(exponents.len() + 1).map_err(|_| Error::ArityOverflow(Tag::Polynomial))?;
        let mut bytes = Vec::with_capacity(2 + exponents.len());
        bytes.push(Tag::Polynomial.byte());
        bytes.push(count);
        bytes.extend_from_slice(exponents);
        self.push_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_integers() {
        let mut out = Vec::new();
        encode_integer(&Integer::new(2), &mut out).unwrap();
        encode_integer(&Integer::new(-7), &mut out).unwrap();
        encode_integer(&Integer::new(1000), &mut out).unwrap();
        assert_eq!(
            out,
            [
                Tag::Two.byte(),
                Tag::IntegerShort.byte(),
                0xF9,
                Tag::IntegerPosBig.byte(),
                2,
                0xE8,
                0x03
            ]
        );
    }

    #[test]
    fn test_compact_rationals() {
        let mut out = Vec::new();
        encode_rational(&Rational::from_i64(1, 2), &mut out).unwrap();
        encode_rational(&Rational::from_i64(-3, 4), &mut out).unwrap();
        encode_rational(&Rational::from_i64(6, 3), &mut out).unwrap();
        assert_eq!(
            out,
            [
                Tag::Half.byte(),
                Tag::RationalShort.byte(),
                0xFD,
                4,
                Tag::Two.byte()
            ]
        );
    }

    #[test]
    fn test_polynomial_layout() {
        let mut arena = Arena::new();
        let poly = arena.push_polynomial(&[2, 0]).unwrap();
        arena.push_symbol("x").unwrap();
        arena.push_int(3).unwrap();
        arena.push_int(1).unwrap();
        assert_eq!(arena.number_of_children(poly), 3);
        assert_eq!(arena.node_size(poly), 4);
        assert_eq!(arena.tree_size(poly), 4 + 3 + 2 + 1);
    }

    #[test]
    fn test_name_too_long() {
        let mut arena = Arena::new();
        let name = "x".repeat(300);
        assert_eq!(
            arena.push_symbol(&name),
            Err(Error::PayloadOverflow(Tag::UserSymbol))
        );
    }
}
