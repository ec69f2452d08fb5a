//! IEEE 754 binary interchange formats: bit-exact decomposition and
//! composition of already-rounded values.

use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};

use crate::digits::Radix;
use crate::exact::{convert, View};
use crate::scaled::Scaled;
use crate::{NumberKind, PrecisionContext};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout {
    fraction_bits: u32,
    exponent_bits: u32,
}

pub(crate) const BINARY16: Layout = Layout {
    fraction_bits: 10,
    exponent_bits: 5,
};

pub(crate) const BINARY32: Layout = Layout {
    fraction_bits: 23,
    exponent_bits: 8,
};

pub(crate) const BINARY64: Layout = Layout {
    fraction_bits: 52,
    exponent_bits: 11,
};

impl Layout {
    fn exponent_mask(self) -> u64 {
        (1 << self.exponent_bits) - 1
    }

    fn fraction_mask(self) -> u64 {
        (1 << self.fraction_bits) - 1
    }

    fn quiet_bit(self) -> u64 {
        1 << (self.fraction_bits - 1)
    }

    fn bias(self) -> i64 {
        (1 << (self.exponent_bits - 1)) - 1
    }

    fn sign_shift(self) -> u32 {
        self.fraction_bits + self.exponent_bits
    }
}

/// Splits raw format bits into an exact binary value.
pub(crate) fn decompose(bits: u64, layout: Layout) -> Scaled {
    let negative = (bits >> layout.sign_shift()) & 1 == 1;
    let biased = (bits >> layout.fraction_bits) & layout.exponent_mask();
    let fraction = bits & layout.fraction_mask();
    if biased == layout.exponent_mask() {
        if fraction == 0 {
            return Scaled::infinity(Radix::Binary, negative);
        }
        let kind = if fraction & layout.quiet_bit() != 0 {
            NumberKind::QuietNaN
        } else {
            NumberKind::SignalingNaN
        };
        let payload = BigUint::from(fraction & (layout.quiet_bit() - 1));
        return Scaled::special(Radix::Binary, kind, negative, payload);
    }
    let offset = layout.bias() + i64::from(layout.fraction_bits);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, 1 - offset)
    } else {
        (fraction | (1 << layout.fraction_bits), biased as i64 - offset)
    };
    Scaled::finite(
        Radix::Binary,
        negative,
        BigUint::from(mantissa),
        BigInt::from(exponent),
    )
}

/// Packs a binary value that already fits `layout` (as produced by rounding
/// under the matching [`PrecisionContext`]) into format bits.
pub(crate) fn compose(value: &Scaled, layout: Layout) -> u64 {
    let sign = u64::from(value.negative) << layout.sign_shift();
    let all_ones = layout.exponent_mask() << layout.fraction_bits;
    match value.kind {
        NumberKind::Infinity => sign | all_ones,
        NumberKind::QuietNaN => {
            let payload = value.mantissa.to_u64().unwrap_or(0) & (layout.quiet_bit() - 1);
            sign | all_ones | layout.quiet_bit() | payload
        }
        NumberKind::SignalingNaN => {
            let payload = value.mantissa.to_u64().unwrap_or(0) & (layout.quiet_bit() - 1);
            sign | all_ones | payload.max(1)
        }
        NumberKind::Finite => {
            if value.mantissa.is_zero() {
                return sign;
            }
            let mantissa = value.mantissa.to_u64().unwrap_or(0);
            let exponent = value.exponent.to_i64().unwrap_or(0);
            let width = i64::from(64 - mantissa.leading_zeros());
            let e_min = 1 - layout.bias();
            let fraction_bits = i64::from(layout.fraction_bits);
            if exponent + width - 1 >= e_min {
                let shift = fraction_bits + 1 - width;
                let (mantissa, exponent) = if shift >= 0 {
                    (mantissa << shift, exponent - shift)
                } else {
                    (mantissa >> -shift, exponent - shift)
                };
                let biased = (exponent + layout.bias() + fraction_bits) as u64;
                sign | (biased << layout.fraction_bits) | (mantissa & layout.fraction_mask())
            } else {
                let etiny = e_min - fraction_bits;
                sign | (mantissa << (exponent - etiny))
            }
        }
    }
}

/// Nearest `f64`, ties to even, rounded once.
pub(crate) fn to_f64(view: &View<'_>) -> f64 {
    let (value, _) = convert(view, Radix::Binary, &PrecisionContext::binary64());
    f64::from_bits(compose(&value, BINARY64))
}

/// Nearest `f32`, ties to even, rounded once.
pub(crate) fn to_f32(view: &View<'_>) -> f32 {
    let (value, _) = convert(view, Radix::Binary, &PrecisionContext::binary32());
    f32::from_bits(compose(&value, BINARY32) as u32)
}

/// Nearest binary16 bit pattern, ties to even.
pub(crate) fn to_f16_bits(view: &View<'_>) -> u16 {
    let (value, _) = convert(view, Radix::Binary, &PrecisionContext::binary16());
    compose(&value, BINARY16) as u16
}

pub(crate) fn from_f64(value: f64) -> Scaled {
    decompose(value.to_bits(), BINARY64)
}

pub(crate) fn from_f32(value: f32) -> Scaled {
    decompose(u64::from(value.to_bits()), BINARY32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_normal_and_subnormal() {
        let one = from_f64(1.0);
        assert_eq!(one.mantissa, BigUint::from(1u64 << 52));
        assert_eq!(one.exponent, BigInt::from(-52));

        let tiny = from_f64(f64::from_bits(1));
        assert_eq!(tiny.mantissa, BigUint::from(1u32));
        assert_eq!(tiny.exponent, BigInt::from(-1074));
    }

    #[test]
    fn compose_inverts_decompose() {
        for bits in [
            0u64,
            1,
            0x8000_0000_0000_0000,
            0x3ff0_0000_0000_0000,
            0x000f_ffff_ffff_ffff,
            0x7fef_ffff_ffff_ffff,
            0x7ff0_0000_0000_0000,
            0x7ff8_0000_0000_0000,
            0x7ff0_0000_0000_0001,
        ] {
            assert_eq!(compose(&decompose(bits, BINARY64), BINARY64), bits, "{bits:#x}");
        }
    }

    #[test]
    fn compose_normalizes_short_mantissas() {
        let eight = Scaled::finite(Radix::Binary, false, BigUint::from(1u32), BigInt::from(3));
        assert_eq!(f64::from_bits(compose(&eight, BINARY64)), 8.0);
    }

    #[test]
    fn half_precision_boundaries() {
        let max = Scaled::finite(Radix::Binary, false, BigUint::from(2047u32), BigInt::from(5));
        assert_eq!(compose(&max, BINARY16), 0x7bff);
        let smallest = Scaled::finite(Radix::Binary, false, BigUint::from(1u32), BigInt::from(-24));
        assert_eq!(compose(&smallest, BINARY16), 0x0001);
    }

    #[test]
    fn single_precision_nan_kinds() {
        let snan = from_f32(f32::from_bits(0x7fa0_0000));
        assert_eq!(snan.kind, NumberKind::SignalingNaN);
        let qnan = from_f32(f32::NAN);
        assert_eq!(qnan.kind, NumberKind::QuietNaN);
    }
}
