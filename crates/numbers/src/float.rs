use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};

use crate::digits::Radix;
use crate::exact::{convert, Sealed};
use crate::scaled::{self, Scaled};
use crate::{ieee, EDecimal, NumericError, PrecisionContext};

/// Arbitrary-precision binary floating-point number:
/// `mantissa × 2^exponent`, or an infinity or NaN.
#[derive(Debug, Clone)]
pub struct EFloat(pub(crate) Scaled);

scaled_number!(EFloat, Radix::Binary);

impl EFloat {
    /// Bit-exact decomposition, including NaN payloads and `-0.0`.
    pub fn from_f64(value: f64) -> Self {
        EFloat(ieee::from_f64(value))
    }

    pub fn from_f32(value: f32) -> Self {
        EFloat(ieee::from_f32(value))
    }

    /// Exact decimal value; every binary fraction terminates in base ten.
    pub fn to_edecimal(&self) -> EDecimal {
        let (value, _) = convert(&self.view(), Radix::Decimal, &PrecisionContext::unlimited());
        EDecimal(value)
    }

    pub fn to_edecimal_with(&self, ctx: &PrecisionContext) -> Result<EDecimal, NumericError> {
        scaled::finish(convert(&self.view(), Radix::Decimal, ctx), ctx).map(EDecimal)
    }

    /// Decimal rounded to `digits` significant digits. The power of two is
    /// built by square-and-multiply at a guarded working precision, so the
    /// cost follows the bit length of the exponent rather than its value.
    /// The result is within one unit in the last place.
    pub fn to_edecimal_rounded(&self, digits: u64) -> EDecimal {
        let ctx = PrecisionContext::for_precision(digits.max(1));
        if !self.is_finite() || self.is_zero() {
            let (value, _) = convert(&self.view(), Radix::Decimal, &ctx);
            return EDecimal(value);
        }
        // 2^-k is 5^k × 10^-k.
        let k = self.0.exponent.magnitude();
        // Each squaring doubles the relative error, so the guard digits
        // track the exponent's bit length: log10(2) < 0.31.
        let working = PrecisionContext::for_precision(digits.max(1) + k.bits() * 31 / 100 + 6);
        let (base, shift) = if self.0.exponent.is_negative() {
            (5u32, -BigInt::from(k.clone()))
        } else {
            (2u32, BigInt::zero())
        };
        let base = Scaled::from_bigint(Radix::Decimal, &BigInt::from(base));
        let mut power = Scaled::from_bigint(Radix::Decimal, &BigInt::one());
        for bit in (0..k.bits()).rev() {
            power = scaled::multiply(&power, &power, &working).0;
            if k.bit(bit) {
                power = scaled::multiply(&power, &base, &working).0;
            }
        }
        power.exponent += shift;
        let mantissa = Scaled::finite(Radix::Decimal, self.0.negative, self.0.mantissa.clone(), BigInt::zero());
        EDecimal(scaled::multiply(&mantissa, &power, &ctx).0)
    }

    /// Exact decimal while the binary exponent is within
    /// ±[`EXACT_DECIMAL_EXPONENT_LIMIT`], otherwise rounded to 34
    /// significant digits.
    pub fn to_edecimal_bounded(&self) -> EDecimal {
        if self.0.exponent.magnitude() <= &BigUint::from(EXACT_DECIMAL_EXPONENT_LIMIT) {
            self.to_edecimal()
        } else {
            self.to_edecimal_rounded(34)
        }
    }

    /// Shortest-digits rendering is not attempted; this is the exact decimal.
    pub fn to_plain_string(&self) -> String {
        self.to_edecimal().to_plain_string()
    }
}

/// Largest binary exponent magnitude expanded exactly by
/// [`EFloat::to_edecimal_bounded`] and `Display`.
pub const EXACT_DECIMAL_EXPONENT_LIMIT: u64 = 1 << 16;

impl fmt::Display for EFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_edecimal_bounded(), f)
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::*;
    use crate::Flags;

    #[test]
    fn decomposition_is_bit_exact() {
        for value in [0.0, -0.0, 1.0, -2.5, 0.1, f64::MAX, f64::MIN_POSITIVE, 5e-324] {
            let back = EFloat::from_f64(value).to_f64();
            assert_eq!(back.to_bits(), value.to_bits(), "{value}");
        }
        assert!(EFloat::from_f64(f64::NAN).is_quiet_nan());
        assert!(EFloat::from_f64(f64::NEG_INFINITY).is_negative_infinity());
    }

    #[test]
    fn narrowing_rounds_once() {
        // 1 + 2^-24 + 2^-60 rounds up to 1 + 2^-23 in binary32; rounding
        // through binary64 first would land on the tie and round to 1.
        let value = EFloat::create(
            (num_bigint::BigInt::from(1) << 60) + (num_bigint::BigInt::from(1) << 36) + 1,
            -60,
        );
        assert_eq!(value.to_f32(), 1.0 + f32::EPSILON);
        assert_eq!(value.to_f64() as f32, 1.0);
    }

    #[test]
    fn cross_radix_comparison() {
        let tenth = EDecimal::from_f64(0.1);
        assert_eq!(EFloat::from_f64(0.1).compare_to_decimal(&tenth), Ordering::Equal);
        let exact_tenth: EDecimal = "0.1".parse().unwrap();
        assert_eq!(EFloat::from_f64(0.1).compare_to_decimal(&exact_tenth), Ordering::Greater);
    }

    #[test]
    fn to_decimal_with_context() {
        let ctx = PrecisionContext::for_precision(5).with_blank_flags();
        let v = EFloat::from_f64(1.0 / 3.0).to_edecimal_with(&ctx).unwrap();
        assert_eq!(v.to_string(), "0.33333");
        assert!(ctx.flags().contains(Flags::INEXACT));
    }

    #[test]
    fn displays_exact_decimal() {
        assert_eq!(EFloat::from_f64(0.25).to_string(), "0.25");
        assert_eq!(EFloat::create(3, 4).to_string(), "48");
    }

    #[test]
    fn rounded_decimal_for_small_exponents() {
        assert_eq!(EFloat::create(1, 10).to_edecimal_rounded(3).to_string(), "1.02E+3");
        assert_eq!(EFloat::create(-1, -3).to_edecimal_rounded(2).to_string(), "-0.12");
        assert_eq!(EFloat::create(3, 0).to_edecimal_rounded(5).to_string(), "3");
        assert!(EFloat::negative_infinity().to_edecimal_rounded(5).is_negative_infinity());
    }

    #[test]
    fn extreme_exponents_render_rounded() {
        let big = EFloat::create(1, i32::MAX);
        assert_eq!(
            big.to_edecimal_rounded(20).to_string(),
            "8.8080652584198167660E+646456992"
        );
        let small = EFloat::create(1, -(1i64 << 31));
        assert_eq!(
            small.to_edecimal_rounded(20).to_string(),
            "5.6766155260037313438E-646456994"
        );
        assert_eq!(
            EFloat::create(1, 70_000).to_string(),
            "1.258045876778845534779785395607505E+21072"
        );
        assert_eq!(EFloat::create(1, 100).to_string(), "1267650600228229401496703205376");
    }
}
