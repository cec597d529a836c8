//! Node tags.
//!
//! The leading byte of every node. The discriminant order doubles as the
//! type-rank table of the canonical comparator, so new tags must be slotted
//! in where they should sort.

/// The algebraic type of a node.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    // === Numbers ===
    /// The integer 0.
    Zero,
    /// The integer 1.
    One,
    /// The integer 2.
    Two,
    /// The integer -1.
    MinusOne,
    /// The rational 1/2.
    Half,
    /// An integer fitting a signed byte.
    IntegerShort,
    /// A positive integer with a length-prefixed magnitude.
    IntegerPosBig,
    /// A negative integer with a length-prefixed magnitude.
    IntegerNegBig,
    /// A rational with a signed byte numerator and unsigned byte denominator.
    RationalShort,
    /// A positive rational with two length-prefixed magnitudes.
    RationalPosBig,
    /// A negative rational with two length-prefixed magnitudes.
    RationalNegBig,
    /// A little-endian `f64`.
    Float,
    /// A named mathematical constant.
    Constant,

    // === Algebra ===
    /// Variable-arity product.
    Multiplication,
    /// `base ^ exponent`.
    Power,
    /// Variable-arity sum.
    Addition,

    // === User-named ===
    /// A variable.
    UserSymbol,
    /// A named function of one argument.
    UserFunction,

    // === Projected functions ===
    /// `trig(A, k)` is `cos(A - k*pi/2)`.
    Trig,
    /// Natural exponential.
    Exponential,
    /// Natural logarithm.
    Ln,
    /// Absolute value.
    Abs,

    // === User-facing functions, removed by projection ===
    /// Sine.
    Sine,
    /// Cosine.
    Cosine,
    /// Tangent.
    Tangent,
    /// Inverse sine.
    ArcSine,
    /// Inverse cosine.
    ArcCosine,
    /// Inverse tangent.
    ArcTangent,
    /// A decimal literal: mantissa child scaled by the payload exponent.
    Decimal,
    /// `A / B`.
    Division,
    /// `A - B`.
    Subtraction,
    /// `-A`.
    Opposite,
    /// Square root.
    SquareRoot,
    /// Base-10 logarithm.
    Log,
    /// `log(A, B)`, logarithm of `A` in base `B`.
    Logarithm,

    // === Logic ===
    /// Boolean true.
    True,
    /// Boolean false.
    False,
    /// Negation.
    LogicalNot,
    /// Variable-arity conjunction.
    LogicalAnd,
    /// Variable-arity disjunction.
    LogicalOr,

    // === Containers ===
    /// A polynomial in one variable: the variable then one coefficient per
    /// exponent stored in the payload.
    Polynomial,
    /// Sorted, duplicate-free collection.
    Set,
    /// The undefined value.
    Undefined,
}

/// Named constants stored in the payload of [`Tag::Constant`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constant {
    /// Euler's number.
    E,
    /// The circle constant.
    Pi,
    /// The imaginary unit.
    I,
}

impl Constant {
    /// Decodes a payload byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::E),
            1 => Some(Self::Pi),
            2 => Some(Self::I),
            _ => None,
        }
    }

    /// Printed name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::E => "e",
            Self::Pi => "pi",
            Self::I => "i",
        }
    }
}

impl Tag {
    /// Every tag, indexed by its byte value.
    pub const ALL: [Tag; 43] = [
        Tag::Zero,
        Tag::One,
        Tag::Two,
        Tag::MinusOne,
        Tag::Half,
        Tag::IntegerShort,
        Tag::IntegerPosBig,
        Tag::IntegerNegBig,
        Tag::RationalShort,
        Tag::RationalPosBig,
        Tag::RationalNegBig,
        Tag::Float,
        Tag::Constant,
        Tag::Multiplication,
        Tag::Power,
        Tag::Addition,
        Tag::UserSymbol,
        Tag::UserFunction,
        Tag::Trig,
        Tag::Exponential,
        Tag::Ln,
        Tag::Abs,
        Tag::Sine,
        Tag::Cosine,
        Tag::Tangent,
        Tag::ArcSine,
        Tag::ArcCosine,
        Tag::ArcTangent,
        Tag::Decimal,
        Tag::Division,
        Tag::Subtraction,
        Tag::Opposite,
        Tag::SquareRoot,
        Tag::Log,
        Tag::Logarithm,
        Tag::True,
        Tag::False,
        Tag::LogicalNot,
        Tag::LogicalAnd,
        Tag::LogicalOr,
        Tag::Polynomial,
        Tag::Set,
        Tag::Undefined,
    ];

    /// Decodes a tag byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(usize::from(byte)).copied()
    }

    /// The encoded byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Any numeric leaf, constants included.
    #[must_use]
    pub const fn is_number(self) -> bool {
        self as u8 <= Tag::Constant as u8
    }

    /// Exact numbers: integers and rationals.
    #[must_use]
    pub const fn is_rational(self) -> bool {
        self as u8 <= Tag::RationalNegBig as u8
    }

    /// Exact integers.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Tag::Zero
                | Tag::One
                | Tag::Two
                | Tag::MinusOne
                | Tag::IntegerShort
                | Tag::IntegerPosBig
                | Tag::IntegerNegBig
        )
    }

    /// Nodes whose child count lives in the payload.
    #[must_use]
    pub const fn is_n_ary(self) -> bool {
        matches!(
            self,
            Tag::Addition
                | Tag::Multiplication
                | Tag::Set
                | Tag::LogicalAnd
                | Tag::LogicalOr
                | Tag::Polynomial
        )
    }

    /// Nodes carrying a name in their payload.
    #[must_use]
    pub const fn is_user_named(self) -> bool {
        matches!(self, Tag::UserSymbol | Tag::UserFunction)
    }

    /// Child count for tags whose arity does not depend on the payload.
    #[must_use]
    pub const fn fixed_arity(self) -> Option<usize> {
        match self {
            Tag::Addition
            | Tag::Multiplication
            | Tag::Set
            | Tag::LogicalAnd
            | Tag::LogicalOr
            | Tag::Polynomial => None,
            Tag::Power
            | Tag::Trig
            | Tag::Division
            | Tag::Subtraction
            | Tag::Logarithm => Some(2),
            Tag::UserFunction
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
            | Tag::Opposite
            | Tag::SquareRoot
            | Tag::Log
            | Tag::LogicalNot => Some(1),
            _ => Some(0),
        }
    }

    /// Header length for tags whose payload has a fixed size.
    ///
    /// Returns `None` for length-prefixed payloads, which must be read from
    /// the encoded bytes.
    #[must_use]
    pub const fn fixed_node_size(self) -> Option<usize> {
        match self {
            Tag::IntegerPosBig
            | Tag::IntegerNegBig
            | Tag::RationalPosBig
            | Tag::RationalNegBig
            | Tag::UserSymbol
            | Tag::UserFunction
            | Tag::Polynomial => None,
            Tag::IntegerShort
            | Tag::Constant
            | Tag::Decimal
            | Tag::Addition
            | Tag::Multiplication
            | Tag::Set
            | Tag::LogicalAnd
            | Tag::LogicalOr => Some(2),
            Tag::RationalShort => Some(3),
            Tag::Float => Some(9),
            _ => Some(1),
        }
    }

    /// Operator name used by the s-expression printer.
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Tag::Multiplication => "*",
            Tag::Power => "^",
            Tag::Addition => "+",
            Tag::Trig => "trig",
            Tag::Exponential => "exp",
            Tag::Ln => "ln",
            Tag::Abs => "abs",
            Tag::Sine => "sin",
            Tag::Cosine => "cos",
            Tag::Tangent => "tan",
            Tag::ArcSine => "asin",
            Tag::ArcCosine => "acos",
            Tag::ArcTangent => "atan",
            Tag::Decimal => "dec",
            Tag::Division => "/",
            Tag::Subtraction | Tag::Opposite => "-",
            Tag::SquareRoot => "sqrt",
            Tag::Log | Tag::Logarithm => "log",
            Tag::True => "true",
            Tag::False => "false",
            Tag::LogicalNot => "not",
            Tag::LogicalAnd => "and",
            Tag::LogicalOr => "or",
            Tag::Polynomial => "poly",
            Tag::Set => "set",
            Tag::Undefined => "undef",
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_table_matches_discriminants() {
        for (index, tag) in Tag::ALL.iter().enumerate() {
            assert_eq!(usize::from(tag.byte()), index);
            assert_eq!(Tag::from_byte(tag.byte()), Some(*tag));
        }
        assert_eq!(Tag::from_byte(200), None);
    }

    #[test]
    fn test_rank_groups() {
        assert!(Tag::Constant.is_number());
        assert!(!Tag::Float.is_rational());
        assert!(Tag::Half.is_rational() && !Tag::Half.is_integer());
        assert!(Tag::Multiplication < Tag::Power && Tag::Power < Tag::Addition);
        assert_eq!(Tag::Addition.fixed_arity(), None);
        assert_eq!(Tag::Trig.fixed_arity(), Some(2));
    }
}
