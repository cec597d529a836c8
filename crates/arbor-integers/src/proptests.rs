//! Property-based tests for exact arithmetic and the magnitude codec.

#[cfg(test)]
mod tests {
    use dashu::base::Gcd;
    use dashu::integer::UBig;
    use proptest::prelude::*;

    use crate::{Integer, Rational};

    fn small_int() -> impl Strategy<Value = i64> {
        -1000i64..1000i64
    }

    fn non_zero_int() -> impl Strategy<Value = i64> {
        prop_oneof![(-1000i64..=-1i64), (1i64..=1000i64)]
    }

    proptest! {
        #[test]
        fn integer_distributive(a in small_int(), b in small_int(), c in small_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            let c = Integer::new(c);
            prop_assert_eq!(&a * &(&b + &c), &(&a * &b) + &(&a * &c));
        }

        #[test]
        fn magnitude_codec_identity(value in any::<i64>()) {
            let n = Integer::new(value);
            let bytes = n.to_le_magnitude();
            prop_assert!(bytes.len() <= 8);
            prop_assert_eq!(Integer::from_le_magnitude(n.is_negative(), &bytes), n);
        }

        #[test]
        fn rational_always_lowest_terms(a in small_int(), b in non_zero_int()) {
            let r = Rational::from_i64(a, b);
            prop_assert!(!r.denominator().is_negative());
            let common = r.numerator().into_inner().gcd(r.denominator().into_inner());
            prop_assert_eq!(common, UBig::ONE);
        }

        #[test]
        fn rational_mul_inverse(a in non_zero_int(), b in non_zero_int()) {
            let r = Rational::from_i64(a, b);
            prop_assert_eq!(&r * &r.recip(), Rational::from(1));
        }

        #[test]
        fn integer_approximation_exact_for_small(a in small_int()) {
            #[allow(clippy::cast_precision_loss)]
            let expected = a as f64;
            prop_assert!((Integer::new(a).to_f64() - expected).abs() < f64::EPSILON);
        }
    }
}
