use cbor_exact::{
    CborError, CborObject, CborType, DecodeOptions, DecodeReason, EDecimal, EFloat, ERational,
    EncodeOptions, ErrorKind,
};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use hex_literal::hex;
use num_bigint::BigInt;

/// Runs `work` on its own thread; fails unless it returns within `seconds`.
fn within<T: Send + 'static>(seconds: u64, work: impl FnOnce() -> T + Send + 'static) -> T {
    let (done, finished) = mpsc::channel();
    thread::spawn(move || {
        let _ = done.send(work());
    });
    match finished.recv_timeout(Duration::from_secs(seconds)) {
        Ok(value) => value,
        Err(mpsc::RecvTimeoutError::Timeout) => panic!("still running after {seconds}s"),
        Err(mpsc::RecvTimeoutError::Disconnected) => panic!("worker panicked"),
    }
}

fn decode_reason(bytes: &[u8]) -> DecodeReason {
    match CborObject::decode(bytes) {
        Err(CborError::Decode { reason, .. }) => reason,
        other => panic!("expected decode failure for {bytes:02x?}, got {other:?}"),
    }
}

#[test]
fn rfc8949_appendix_a_vectors_round_trip() {
    let vectors: &[&[u8]] = &[
        &hex!("00"),
        &hex!("17"),
        &hex!("1818"),
        &hex!("1903e8"),
        &hex!("1b000000e8d4a51000"),
        &hex!("1bffffffffffffffff"),
        &hex!("c249010000000000000000"),
        &hex!("3bffffffffffffffff"),
        &hex!("c349010000000000000000"),
        &hex!("3903e7"),
        &hex!("f90000"),
        &hex!("f98000"),
        &hex!("f93c00"),
        &hex!("fb3ff199999999999a"),
        &hex!("f93e00"),
        &hex!("f97bff"),
        &hex!("fa47c35000"),
        &hex!("fa7f7fffff"),
        &hex!("fb7e37e43c8800759c"),
        &hex!("f90001"),
        &hex!("f90400"),
        &hex!("f9c400"),
        &hex!("fbc010666666666666"),
        &hex!("f97c00"),
        &hex!("f97e00"),
        &hex!("f9fc00"),
        &hex!("f4"),
        &hex!("f5"),
        &hex!("f6"),
        &hex!("f7"),
        &hex!("f0"),
        &hex!("f8ff"),
        &hex!("c074323031332d30332d32315432303a30343a30305a"),
        &hex!("c11a514b67b0"),
        &hex!("d74401020304"),
        &hex!("d818456449455446"),
        &hex!("40"),
        &hex!("4401020304"),
        &hex!("60"),
        &hex!("6161"),
        &hex!("6449455446"),
        &hex!("62c3bc"),
        &hex!("63e6b0b4"),
        &hex!("64f0908591"),
        &hex!("80"),
        &hex!("83010203"),
        &hex!("8301820203820405"),
        &hex!("a0"),
        &hex!("a201020304"),
        &hex!("a26161016162820203"),
        &hex!("826161a161626163"),
    ];
    for bytes in vectors {
        let value = CborObject::decode(bytes).unwrap();
        assert_eq!(&value.to_bytes().unwrap(), bytes, "{value}");
    }
}

#[test]
fn indefinite_lengths_decode_to_definite_encodings() {
    let cases: &[(&[u8], &[u8])] = &[
        (&hex!("5f42010243030405ff"), &hex!("450102030405")),
        (&hex!("7f657374726561646d696e67ff"), &hex!("6973747265616d696e67")),
        (&hex!("9fff"), &hex!("80")),
        (&hex!("9f018202039f0405ffff"), &hex!("8301820203820405")),
        (&hex!("bf61610161629f0203ffff"), &hex!("a26161016162820203")),
        (&hex!("826161bf61626163ff"), &hex!("826161a161626163")),
    ];
    for (input, expected) in cases {
        let value = CborObject::decode(input).unwrap();
        assert_eq!(&value.to_bytes().unwrap(), expected);
    }
}

#[test]
fn malformed_input_matrix() {
    assert_eq!(decode_reason(&hex!("ff")), DecodeReason::UnexpectedBreak);
    assert_eq!(decode_reason(&hex!("19 01")), DecodeReason::TruncatedInput);
    assert_eq!(decode_reason(&hex!("")), DecodeReason::TruncatedInput);
    assert_eq!(decode_reason(&hex!("83 01 02")), DecodeReason::TruncatedInput);
    assert_eq!(decode_reason(&hex!("5a ff ff ff ff 00")), DecodeReason::TruncatedInput);
    assert_eq!(decode_reason(&hex!("1e")), DecodeReason::ReservedInitialByte(0x1e));
    assert_eq!(decode_reason(&hex!("3f")), DecodeReason::ReservedInitialByte(0x3f));
    assert_eq!(decode_reason(&hex!("81 ff")), DecodeReason::UnexpectedBreak);
    assert_eq!(decode_reason(&hex!("a1 01")), DecodeReason::TruncatedInput);

    let openers = vec![0x9f; 2000];
    let err = CborObject::decode(&openers).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.decode_reason(), Some(&DecodeReason::NestingTooDeep));

    let shallow = vec![0x9f; 300];
    let err = CborObject::decode(&shallow).unwrap_err();
    assert_eq!(err.decode_reason(), Some(&DecodeReason::TruncatedInput));
    let strict = DecodeOptions::default().with_max_depth(100);
    let err = CborObject::decode_with(&shallow, &strict).unwrap_err();
    assert_eq!(err.decode_reason(), Some(&DecodeReason::NestingTooDeep));
}

#[test]
fn error_offsets_locate_the_failure() {
    match CborObject::decode(&hex!("82 01 1c")) {
        Err(CborError::Decode { offset, reason }) => {
            assert_eq!(offset, 2);
            assert_eq!(reason, DecodeReason::ReservedInitialByte(0x1c));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn long_strings_round_trip() {
    let text: String = "aé😀".chars().cycle().take(200_000).collect();
    let value = CborObject::from(text.clone());
    let back = CborObject::decode(&value.to_bytes().unwrap()).unwrap();
    assert_eq!(back.as_str().unwrap(), text);

    let bytes: Vec<u8> = (0..=255u8).cycle().take(300_000).collect();
    let value = CborObject::from(bytes.clone());
    assert_eq!(CborObject::decode(&value.to_bytes().unwrap()).unwrap().as_bytes().unwrap(), &bytes[..]);
}

#[test]
fn deep_nesting_within_limit_round_trips() {
    let mut value = CborObject::from(0);
    for _ in 0..400 {
        value = CborObject::from(vec![value]);
    }
    let bytes = value.to_bytes().unwrap();
    assert_eq!(CborObject::decode(&bytes).unwrap(), value);
}

#[test]
fn tags_survive_round_trips() {
    let value = CborObject::from("2013-03-21T20:04:00Z").with_tag(0).with_tag(55799);
    let back = CborObject::decode(&value.to_bytes().unwrap()).unwrap();
    assert_eq!(back.tags(), &[55799, 0]);
    assert_eq!(back.most_outer_tag(), Some(55799));
    assert_eq!(back.most_inner_tag(), Some(0));
    assert_eq!(back, value);
}

#[test]
fn shared_references_keep_identity() {
    // [28([1, 2]), 29(0)]
    let value = CborObject::decode(&hex!("82 d81c 82 01 02 d81d 00")).unwrap();
    let first = value.get(0).unwrap();
    let second = value.get(1).unwrap();
    assert!(CborObject::ptr_eq(&first, &second));
    first.add(CborObject::from(3)).unwrap();
    assert_eq!(second.len().unwrap(), 3);
    assert!(!first.is_tagged());
}

#[test]
fn repeated_shared_references_are_one_object() {
    // [28([1]), 29(0), 3, 3, 29(0)]
    let value = CborObject::decode(&hex!("85 d81c 81 01 d81d 00 03 03 d81d 00")).unwrap();
    let items = value.items().unwrap();
    assert_eq!(value.to_json_string().unwrap(), "[[1],[1],3,3,[1]]");
    assert!(CborObject::ptr_eq(&items[0], &items[1]));
    assert!(CborObject::ptr_eq(&items[0], &items[4]));
    assert!(!CborObject::ptr_eq(&items[2], &items[3]));
}

#[test]
fn shared_scalar_references_resolve() {
    // [28("hello"), 29(0), 29(0)]
    let value = CborObject::decode(&hex!("83 d81c 6568656c6c6f d81d 00 d81d 00")).unwrap();
    for i in 0..3 {
        assert_eq!(value.get(i).unwrap().as_str().unwrap(), "hello");
    }
}

#[test]
fn references_reset_between_sequence_items() {
    let bytes = hex!("d81c 01 d81d 00");
    let items = CborObject::decode_sequence(&bytes);
    assert!(items.is_err());
    let ok = CborObject::decode_sequence(&hex!("82 d81c 01 d81d 00 82 d81c 02 d81d 00")).unwrap();
    assert_eq!(ok[1].get(1).unwrap(), CborObject::from(2));
}

#[test]
fn cycles_are_rejected_on_encode() {
    let outer = CborObject::new_array();
    let inner = CborObject::new_map();
    inner.set(CborObject::from("back"), outer.clone()).unwrap();
    outer.add(inner).unwrap();
    let err = outer.to_bytes().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
    assert!(outer.to_json_string().is_err());
}

#[test]
fn number_tags_decode_to_tower_values() {
    // 4([-2, 27315]) = 273.15
    let decimal = CborObject::decode(&hex!("c4 82 21 196ab3")).unwrap();
    assert_eq!(decimal.kind(), CborType::Array);
    assert!(decimal.is_number());
    assert_eq!(decimal.as_edecimal().unwrap(), "273.15".parse::<EDecimal>().unwrap());
    assert_eq!(decimal.as_f64().unwrap(), 273.15);
    assert_eq!(decimal.as_i32().unwrap(), 273);

    // 5([-1, 3]) = 1.5
    let bigfloat = CborObject::decode(&hex!("c5 82 20 03")).unwrap();
    assert_eq!(bigfloat.as_efloat().unwrap(), EFloat::create(3, -1));
    assert_eq!(bigfloat.as_f64().unwrap(), 1.5);

    // 30([1, 3])
    let third = CborObject::decode(&hex!("d81e 82 01 03")).unwrap();
    assert_eq!(third.as_erational().unwrap(), ERational::create(1, 3).unwrap());
    assert!(!third.is_integral());

    // 264([2(h'010000000000000000'), 1])
    let extended = CborObject::decode(&hex!("d90108 82 c249010000000000000000 01")).unwrap();
    assert!(extended.is_number());
    assert!(extended.as_edecimal().unwrap().exponent() > &BigInt::from(u64::MAX));
}

#[test]
fn tower_values_encode_with_number_tags() {
    let decimal = CborObject::from_edecimal(&"273.15".parse().unwrap());
    assert_eq!(decimal.to_bytes().unwrap(), hex!("c4 82 21 196ab3"));
    let huge = CborObject::from_bigint(&(BigInt::from(u64::MAX) * 2));
    assert_eq!(huge.tags(), &[2]);
    assert_eq!(CborObject::decode(&huge.to_bytes().unwrap()).unwrap().as_bigint().unwrap(), BigInt::from(u64::MAX) * 2);
    let rational = CborObject::from_erational(&ERational::create(-1, 3).unwrap());
    assert_eq!(rational.to_bytes().unwrap(), hex!("d81e 82 20 03"));
}

#[test]
fn uuid_and_hints() {
    let uuid = hex!("d825 50 000102030405060708090a0b0c0d0e0f");
    assert_eq!(CborObject::decode(&uuid).unwrap().tags(), &[37]);
    assert_eq!(decode_reason(&hex!("d825 41 00")), DecodeReason::InvalidTagPayload(37));
    assert_eq!(CborObject::decode(&hex!("d7 63 616263")).unwrap().tags(), &[23]);
}

#[test]
fn canonical_encoding_orders_nested_maps() {
    let inner = CborObject::map_from([
        (CborObject::from("b"), CborObject::from(1)),
        (CborObject::from("a"), CborObject::from(2)),
    ]);
    let outer = CborObject::map_from([
        (CborObject::from(2), inner),
        (CborObject::from(1), CborObject::null()),
    ]);
    let canonical = EncodeOptions::default().with_canonical(true);
    assert_eq!(
        outer.to_bytes_with(&canonical).unwrap(),
        hex!("a2 01 f6 02 a2 6161 02 6162 01")
    );
}

#[test]
fn stream_decoding_reads_successive_items() {
    let mut cursor = std::io::Cursor::new(hex!("01 6161 a0").to_vec());
    assert_eq!(CborObject::read_from(&mut cursor).unwrap(), CborObject::from(1));
    assert_eq!(CborObject::read_from(&mut cursor).unwrap(), CborObject::from("a"));
    assert_eq!(CborObject::read_from(&mut cursor).unwrap(), CborObject::new_map());
    assert!(CborObject::read_from(&mut cursor).is_err());
}

#[test]
fn extreme_exponents_fail_integer_conversion_quickly() {
    within(10, || {
        // 4([9223372036854775807, 1])
        let huge = CborObject::decode(&hex!("c4821b7fffffffffffffff01")).unwrap();
        assert_eq!(huge.as_i32().unwrap_err().kind(), ErrorKind::Arithmetic);
        assert_eq!(huge.as_i64().unwrap_err().kind(), ErrorKind::Arithmetic);
        assert_eq!(huge.as_bigint().unwrap_err().kind(), ErrorKind::Arithmetic);
        assert!(huge.is_integral());
        assert!(!huge.can_fit_in_i64());
        assert!(!huge.can_truncated_int_fit_in_i32());
        assert_eq!(huge.as_f64().unwrap(), f64::INFINITY);

        // 4([-9223372036854775808, 1])
        let tiny = CborObject::decode(&hex!("c4823b7fffffffffffffff01")).unwrap();
        assert_eq!(tiny.as_i64().unwrap(), 0);
        assert!(!tiny.is_integral());
        assert!(!tiny.can_fit_in_i32());
        assert!(tiny.can_truncated_int_fit_in_i64());

        // 5([9223372036854775807, 1])
        let bigfloat = CborObject::decode(&hex!("c5821b7fffffffffffffff01")).unwrap();
        assert_eq!(bigfloat.as_u64().unwrap_err().kind(), ErrorKind::Arithmetic);
        assert!(!bigfloat.can_fit_in_i32());
        assert!(!bigfloat.can_truncated_int_fit_in_i64());
    });
}

#[test]
fn fixed_width_conversions_at_the_edges() {
    // 4([1, 922337203685477580]) is i64::MAX rounded down to a multiple of 10.
    let near = CborObject::decode(&hex!("c482011b0ccccccccccccccc")).unwrap();
    assert_eq!(near.as_i64().unwrap(), 9_223_372_036_854_775_800);
    assert!(near.can_fit_in_i64());
    assert!(!near.can_fit_in_i32());
    // 5([63, -1]) is i64::MIN.
    let min = CborObject::decode(&hex!("c582183f20")).unwrap();
    assert_eq!(min.as_i64().unwrap(), i64::MIN);
    assert_eq!(min.as_u64().unwrap_err().kind(), ErrorKind::Arithmetic);
}

#[test]
fn cyclic_and_self_keyed_containers_compare() {
    within(10, || {
        let map = CborObject::new_map();
        map.set(map.clone(), CborObject::from(2)).unwrap();
        map.set(CborObject::from("k"), CborObject::from(3)).unwrap();
        map.set(map.clone(), CborObject::from(4)).unwrap();
        assert_eq!(map.len().unwrap(), 2);
        assert_eq!(map.get_key(&map).unwrap(), Some(CborObject::from(4)));
        assert_eq!(map, map.clone());

        let a = CborObject::new_array();
        a.add(a.clone()).unwrap();
        let b = CborObject::new_array();
        b.add(b.clone()).unwrap();
        assert_eq!(a, b);
        assert!(a.to_string().contains("<cycle>"));
        assert_eq!(a.to_bytes().unwrap_err().kind(), ErrorKind::Argument);
    });
}
