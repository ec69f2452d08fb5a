use std::cmp::Ordering;

use cbor_exact_numbers::{EDecimal, EFloat, ERational, ExactNumber, PrecisionContext};
use proptest::prelude::*;

fn finite_f64() -> impl Strategy<Value = f64> {
    any::<u64>()
        .prop_map(f64::from_bits)
        .prop_filter("finite", |v| v.is_finite())
}

proptest! {
    #[test]
    fn f64_survives_decimal_and_float(value in finite_f64()) {
        prop_assert_eq!(EFloat::from_f64(value).to_f64().to_bits(), value.to_bits());
        let back = EDecimal::from_f64(value).to_f64();
        prop_assert_eq!(back.to_bits(), value.to_bits());
        prop_assert_eq!(ERational::from_f64(value).to_f64().to_bits(), value.to_bits());
    }

    #[test]
    fn f32_survives_decimal(bits in any::<u32>()) {
        let value = f32::from_bits(bits);
        prop_assume!(value.is_finite());
        prop_assert_eq!(EDecimal::from_f32(value).to_f32().to_bits(), bits);
    }

    #[test]
    fn f64_to_f32_matches_native_rounding(value in finite_f64()) {
        prop_assert_eq!(EFloat::from_f64(value).to_f32().to_bits(), (value as f32).to_bits());
    }

    #[test]
    fn decimal_string_round_trip(mantissa in any::<i64>(), exponent in -400i32..400) {
        let value = EDecimal::create(mantissa, exponent);
        let parsed: EDecimal = value.to_string().parse().unwrap();
        prop_assert_eq!(parsed.mantissa(), value.mantissa());
        prop_assert_eq!(parsed.exponent(), value.exponent());
    }

    #[test]
    fn comparison_matches_native_doubles(a in finite_f64(), b in finite_f64()) {
        let expected = a.partial_cmp(&b).unwrap();
        prop_assert_eq!(EDecimal::from_f64(a).compare_to_float(&EFloat::from_f64(b)), expected);
        prop_assert_eq!(ERational::from_f64(a).compare_exact(&EDecimal::from_f64(b)), expected);
    }

    #[test]
    fn comparison_is_antisymmetric(a in any::<i64>(), ae in -50i32..50, b in any::<i64>(), be in -50i32..50) {
        let x = EDecimal::create(a, ae);
        let y = EFloat::create(b, be);
        prop_assert_eq!(x.compare_exact(&y), y.compare_exact(&x).reverse());
        prop_assert_eq!(x.compare_exact(&x), Ordering::Equal);
    }

    #[test]
    fn contextual_sum_is_correctly_rounded(a in any::<i64>(), b in any::<i64>(), ae in -20i32..20, be in -20i32..20) {
        let x = EDecimal::create(a, ae);
        let y = EDecimal::create(b, be);
        let ctx = PrecisionContext::for_precision(7);
        let rounded = x.add_with(&y, &ctx).unwrap();
        let exact = x.add(&y);
        prop_assert_eq!(exact.round_to_precision(&ctx).unwrap().compare_to(&rounded), Ordering::Equal);
    }
}
