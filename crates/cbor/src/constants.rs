// Major types and initial-byte overlays.
pub const MAJOR_UNSIGNED: u8 = 0;
pub const MAJOR_NEGATIVE: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_TEXT: u8 = 3;
pub const MAJOR_ARRAY: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;

pub const OVERLAY_UIN: u8 = 0b000_00000;
pub const OVERLAY_NIN: u8 = 0b001_00000;
pub const OVERLAY_BIN: u8 = 0b010_00000;
pub const OVERLAY_STR: u8 = 0b011_00000;
pub const OVERLAY_ARR: u8 = 0b100_00000;
pub const OVERLAY_MAP: u8 = 0b101_00000;
pub const OVERLAY_TAG: u8 = 0b110_00000;
pub const OVERLAY_SIMPLE: u8 = 0b111_00000;

pub const MINOR_MASK: u8 = 0b000_11111;
pub const MINOR_U8: u8 = 24;
pub const MINOR_U16: u8 = 25;
pub const MINOR_U32: u8 = 26;
pub const MINOR_U64: u8 = 27;
pub const MINOR_INDEFINITE: u8 = 31;

pub const BREAK: u8 = 0xff;

// Simple values.
pub const SIMPLE_FALSE: u8 = 20;
pub const SIMPLE_TRUE: u8 = 21;
pub const SIMPLE_NULL: u8 = 22;
pub const SIMPLE_UNDEFINED: u8 = 23;

pub const FLOAT_HALF: u8 = 0xf9;
pub const FLOAT_SINGLE: u8 = 0xfa;
pub const FLOAT_DOUBLE: u8 = 0xfb;

// Tags with built-in semantics.
pub const TAG_POSITIVE_BIGNUM: u64 = 2;
pub const TAG_NEGATIVE_BIGNUM: u64 = 3;
pub const TAG_DECIMAL_FRACTION: u64 = 4;
pub const TAG_BIGFLOAT: u64 = 5;
pub const TAG_EXPECT_BASE64URL: u64 = 21;
pub const TAG_EXPECT_BASE64: u64 = 22;
pub const TAG_EXPECT_BASE16: u64 = 23;
pub const TAG_STRING_REF: u64 = 25;
pub const TAG_SHAREABLE: u64 = 28;
pub const TAG_SHARED_REF: u64 = 29;
pub const TAG_RATIONAL: u64 = 30;
pub const TAG_UUID: u64 = 37;
pub const TAG_STRING_REF_NAMESPACE: u64 = 256;
pub const TAG_EXTENDED_DECIMAL: u64 = 264;
pub const TAG_EXTENDED_BIGFLOAT: u64 = 265;

pub const BUILT_IN_TAGS: [u64; 15] = [
    TAG_POSITIVE_BIGNUM,
    TAG_NEGATIVE_BIGNUM,
    TAG_DECIMAL_FRACTION,
    TAG_BIGFLOAT,
    TAG_EXPECT_BASE64URL,
    TAG_EXPECT_BASE64,
    TAG_EXPECT_BASE16,
    TAG_STRING_REF,
    TAG_SHAREABLE,
    TAG_SHARED_REF,
    TAG_RATIONAL,
    TAG_UUID,
    TAG_STRING_REF_NAMESPACE,
    TAG_EXTENDED_DECIMAL,
    TAG_EXTENDED_BIGFLOAT,
];

/// Minimum length a string must have to enter a string-reference table that
/// already holds `index` entries.
pub fn string_ref_threshold(index: usize) -> usize {
    if index < 24 {
        3
    } else if index < 0x100 {
        4
    } else if index < 0x1_0000 {
        5
    } else if (index as u64) < 0x1_0000_0000 {
        7
    } else {
        11
    }
}

/// Binary16 bits to `f64`, keeping NaN payloads.
pub fn half_to_f64(bits: u16) -> f64 {
    let negative = bits & 0x8000 != 0;
    let exponent = u64::from((bits >> 10) & 0x1f);
    let fraction = u64::from(bits & 0x3ff);
    let magnitude = match exponent {
        0 => fraction as f64 * f64::powi(2.0, -24),
        0x1f => f64::from_bits((0x7ff << 52) | (fraction << 42)),
        _ => f64::from_bits(((exponent + 1023 - 15) << 52) | (fraction << 42)),
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Binary32 bits to `f64`, keeping NaN payloads.
pub fn single_to_f64(bits: u32) -> f64 {
    let value = f32::from_bits(bits);
    if !value.is_nan() {
        return f64::from(value);
    }
    let sign = u64::from(bits >> 31) << 63;
    f64::from_bits(sign | (0x7ff << 52) | (u64::from(bits & 0x7f_ffff) << 29))
}

/// Binary16 bits holding exactly `value`, if any.
pub fn f64_to_half_exact(value: f64) -> Option<u16> {
    let bits = value.to_bits();
    let sign = ((bits >> 63) as u16) << 15;
    let exponent = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1 << 52) - 1);
    if exponent == 0x7ff {
        if fraction & ((1 << 42) - 1) != 0 {
            return None;
        }
        return Some(sign | 0x7c00 | (fraction >> 42) as u16);
    }
    if exponent == 0 {
        return (fraction == 0).then_some(sign);
    }
    let unbiased = exponent - 1023;
    if unbiased > 15 {
        return None;
    }
    if unbiased >= -14 {
        if fraction & ((1 << 42) - 1) != 0 {
            return None;
        }
        return Some(sign | (((unbiased + 15) as u16) << 10) | (fraction >> 42) as u16);
    }
    if unbiased < -24 {
        return None;
    }
    let full = fraction | (1 << 52);
    let shift = 28 - unbiased;
    if full & ((1 << shift) - 1) != 0 {
        return None;
    }
    Some(sign | (full >> shift) as u16)
}

/// Binary32 bits holding exactly `value`, if any.
pub fn f64_to_single_exact(value: f64) -> Option<u32> {
    if value.is_nan() {
        let bits = value.to_bits();
        let fraction = bits & ((1 << 52) - 1);
        if fraction & ((1 << 29) - 1) != 0 {
            return None;
        }
        let sign = ((bits >> 63) as u32) << 31;
        return Some(sign | 0x7f80_0000 | (fraction >> 29) as u32);
    }
    let narrowed = value as f32;
    (f64::from(narrowed).to_bits() == value.to_bits()).then(|| narrowed.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_conversions_are_exact() {
        for (bits, value) in [
            (0x0000u16, 0.0),
            (0x3c00, 1.0),
            (0xc000, -2.0),
            (0x7bff, 65504.0),
            (0x0001, 5.960464477539063e-8),
            (0x0400, 6.103515625e-5),
            (0x3555, 0.333251953125),
        ] {
            assert_eq!(half_to_f64(bits), value, "{bits:#06x}");
            assert_eq!(f64_to_half_exact(value), Some(bits), "{value}");
        }
        assert_eq!(f64_to_half_exact(-0.0), Some(0x8000));
        assert_eq!(f64_to_half_exact(f64::INFINITY), Some(0x7c00));
        assert_eq!(f64_to_half_exact(f64::NAN), Some(0x7e00));
        assert_eq!(f64_to_half_exact(65520.0), None);
        assert_eq!(f64_to_half_exact(0.1), None);
        assert_eq!(f64_to_half_exact(2.9802322387695312e-8), None);
    }

    #[test]
    fn half_nan_payload_survives() {
        let value = half_to_f64(0x7c01);
        assert!(value.is_nan());
        assert_eq!(f64_to_half_exact(value), Some(0x7c01));
    }

    #[test]
    fn single_conversions() {
        assert_eq!(f64_to_single_exact(100000.0), Some(100000.0f32.to_bits()));
        assert_eq!(f64_to_single_exact(0.1), None);
        assert_eq!(f64_to_single_exact(1e300), None);
        let snan = single_to_f64(0x7f80_0001);
        assert!(snan.is_nan());
        assert_eq!(f64_to_single_exact(snan), Some(0x7f80_0001));
    }

    #[test]
    fn string_ref_thresholds() {
        assert_eq!(string_ref_threshold(0), 3);
        assert_eq!(string_ref_threshold(23), 3);
        assert_eq!(string_ref_threshold(24), 4);
        assert_eq!(string_ref_threshold(255), 4);
        assert_eq!(string_ref_threshold(256), 5);
        assert_eq!(string_ref_threshold(65536), 7);
    }
}
