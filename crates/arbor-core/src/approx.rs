//! Numeric approximation.
//!
//! The kernel only needs doubles for side conditions, comparing numbers and
//! folding floats. Richer evaluators plug in through [`Approximator`].

use std::f64::consts::{E, FRAC_PI_2, LN_10, PI};

use crate::arena::Arena;
use crate::handle::Node;
use crate::tag::{Constant, Tag};

/// Evaluates a tree to a double.
pub trait Approximator {
    /// Approximates `node`, returning NaN for anything without a real value.
    fn approximate(&self, arena: &Arena, node: Node) -> f64;
}

/// Real-valued evaluation of every tag the kernel knows.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardApproximation;

impl StandardApproximation {
    fn fold(
        &self,
        arena: &Arena,
        node: Node,
        init: f64,
        op: impl Fn(f64, f64) -> f64,
    ) -> f64 {
        arena
            .children(node)
            .fold(init, |acc, child| op(acc, self.approximate(arena, child)))
    }
}

impl Approximator for StandardApproximation {
    fn approximate(&self, arena: &Arena, node: Node) -> f64 {
        let tag = arena.tag(node);
        if tag.is_rational() {
            return arena.rational_value(node).map_or(f64::NAN, |value| value.to_f64());
        }
        let arg = |index| self.approximate(arena, arena.child(node, index));
        match tag {
            Tag::Float => arena.float_value(node).unwrap_or(f64::NAN),
            Tag::Constant => match arena.constant_value(node) {
                Some(Constant::E) => E,
                Some(Constant::Pi) => PI,
                _ => f64::NAN,
            },
            Tag::Addition => self.fold(arena, node, 0.0, |a, b| a + b),
            Tag::Multiplication => self.fold(arena, node, 1.0, |a, b| a * b),
            Tag::Power => arg(0).powf(arg(1)),
            Tag::Trig => (arg(0) - arg(1) * FRAC_PI_2).cos(),
            Tag::Exponential => arg(0).exp(),
            Tag::Ln => arg(0).ln(),
            Tag::Abs => arg(0).abs(),
            Tag::Sine => arg(0).sin(),
            Tag::Cosine => arg(0).cos(),
            Tag::Tangent => arg(0).tan(),
            Tag::ArcSine => arg(0).asin(),
            Tag::ArcCosine => arg(0).acos(),
            Tag::ArcTangent => arg(0).atan(),
            Tag::Decimal => {
                arg(0) * 10f64.powi(-i32::from(arena.decimal_digits(node)))
            }
            Tag::Division => arg(0) / arg(1),
            Tag::Subtraction => arg(0) - arg(1),
            Tag::Opposite => -arg(0),
            Tag::SquareRoot => arg(0).sqrt(),
            Tag::Log => arg(0).ln() / LN_10,
            Tag::Logarithm => arg(0).ln() / arg(1).ln(),
            _ => f64::NAN,
        }
    }
}

impl Arena {
    /// Approximates a tree with [`StandardApproximation`].
    #[must_use]
    pub fn approximate(&self, node: Node) -> f64 {
        StandardApproximation.approximate(self, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(text: &str) -> f64 {
        let mut arena = Arena::new();
        let node = arena.parse(text).unwrap();
        arena.approximate(node)
    }

    #[test]
    fn test_arithmetic() {
        assert!((approx("(+ 1 (* 2 3) (^ 2 -1))") - 7.5).abs() < 1e-12);
        assert!((approx("(dec 125 2)") - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_trig_quarter_turns() {
        assert!((approx("(trig 1/3 0)") - (1.0f64 / 3.0).cos()).abs() < 1e-12);
        assert!((approx("(trig 1/3 1)") - (1.0f64 / 3.0).sin()).abs() < 1e-12);
        assert!((approx("(trig pi 2)") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symbols_are_nan() {
        assert!(approx("(+ x 1)").is_nan());
        assert!(approx("i").is_nan());
    }
}
