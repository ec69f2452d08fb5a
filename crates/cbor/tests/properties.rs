use std::cmp::Ordering;

use cbor_exact::{compare, CborObject, EDecimal, ERational};
use num_bigint::BigInt;
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = CborObject> {
    prop_oneof![
        Just(CborObject::null()),
        Just(CborObject::undefined()),
        any::<bool>().prop_map(CborObject::boolean),
        any::<i64>().prop_map(CborObject::from_i64),
        any::<u64>().prop_map(CborObject::from_u64),
        any::<u64>().prop_map(|bits| CborObject::from_f64(f64::from_bits(bits))),
        ".{0,12}".prop_map(CborObject::text),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(CborObject::bytes),
        (any::<i64>(), -40i64..40).prop_map(|(m, e)| CborObject::from_edecimal(&EDecimal::create(m, e))),
        (any::<i32>(), 1i32..1000).prop_map(|(n, d)| CborObject::from_erational(&ERational::create(n, d).unwrap())),
    ]
}

fn value() -> impl Strategy<Value = CborObject> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(CborObject::array_from),
            prop::collection::vec((any::<i16>(), inner.clone()), 0..6).prop_map(|entries| {
                CborObject::map_from(entries.into_iter().map(|(k, v)| (CborObject::from(i64::from(k)), v)))
            }),
            (1u64..1000, inner).prop_map(|(tag, item)| item.with_tag(tag + 1000)),
        ]
    })
}

fn truncation_cases() -> Vec<(f64, i64)> {
    let mut cases = Vec::new();
    for bound in [i64::from(i16::MAX), i64::from(i32::MAX), i64::from(u8::MAX)] {
        for bound in [bound, -bound - 1] {
            let b = bound as f64;
            cases.push((b, bound));
            cases.push((b + 0.5f64.copysign(b), bound));
            cases.push((b + 1.0f64.copysign(b), bound + bound.signum()));
        }
    }
    cases
}

proptest! {
    #[test]
    fn encoded_values_decode_to_equal_values(value in value()) {
        let bytes = value.to_bytes().unwrap();
        let back = CborObject::decode(&bytes).unwrap();
        prop_assert_eq!(&back, &value);
        prop_assert_eq!(back.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn doubles_keep_every_bit(bits in any::<u64>()) {
        let value = CborObject::from_f64(f64::from_bits(bits));
        let back = CborObject::decode(&value.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(back.as_f64().unwrap().to_bits(), bits);
    }

    #[test]
    fn comparison_is_antisymmetric(a in value(), b in value()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
        prop_assert_eq!(compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn integers_order_like_native(a in any::<i64>(), b in any::<i64>()) {
        let x = CborObject::from_i64(a);
        let y = CborObject::from_bigint(&BigInt::from(b));
        prop_assert_eq!(compare(&x, &y), a.cmp(&b));
    }

    #[test]
    fn truncation_matches_native_casts(value in -1.0e12f64..1.0e12) {
        let object = CborObject::from_f64(value);
        let truncated = value.trunc() as i64;
        prop_assert_eq!(object.as_i64().unwrap(), truncated);
        prop_assert_eq!(object.as_i32().ok(), i32::try_from(truncated).ok());
        prop_assert_eq!(object.as_i16().ok(), i16::try_from(truncated).ok());
        prop_assert_eq!(object.as_u8().ok(), u8::try_from(truncated).ok());
        prop_assert_eq!(object.can_truncated_int_fit_in_i32(), i32::try_from(truncated).is_ok());
    }
}

#[test]
fn truncation_at_type_boundaries() {
    for (value, truncated) in truncation_cases() {
        let object = CborObject::from_f64(value);
        assert_eq!(object.as_i64().unwrap(), truncated, "{value}");
        assert_eq!(object.as_i32().ok(), i32::try_from(truncated).ok(), "{value}");
        assert_eq!(object.as_i16().ok(), i16::try_from(truncated).ok(), "{value}");
        assert_eq!(object.as_u8().ok(), u8::try_from(truncated).ok(), "{value}");
    }
    let past_i64 = CborObject::from_f64(9.3e18);
    assert!(past_i64.as_i64().is_err());
    assert!(!past_i64.can_truncated_int_fit_in_i64());
    assert_eq!(CborObject::from_f64(-0.99).as_u8().unwrap(), 0);
}
