//! Exact comparison and conversion across the decimal, binary and rational
//! representations.
//!
//! Magnitudes are first bracketed by integer logarithm bounds derived from
//! bit/digit counts and exponents. Only when the brackets overlap are both
//! values materialized as fractions and cross-multiplied, so comparing
//! `1E+1000000000` with `0.5` never builds a billion-digit integer.

use std::cmp::Ordering;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::digits::{digit_count, Discard, Radix};
use crate::scaled::{self, round, round_fraction, round_parts, Outcome, Scaled};
use crate::{ERational, Flags, NumberKind, PrecisionContext};

// log2(10) = 3.32192809..., log10(2) = 0.30102999...
const LOG2_10_LOW: i64 = 332_192;
const LOG2_10_HIGH: i64 = 332_193;
const LOG10_2_LOW: i64 = 30_102;
const LOG10_2_HIGH: i64 = 30_103;
const LOG_SCALE: i64 = 100_000;

/// Magnitude of a number as either representation.
pub enum Magnitude<'a> {
    Scaled(&'a Scaled),
    Ratio {
        numerator: &'a BigUint,
        denominator: &'a BigUint,
    },
}

pub struct View<'a> {
    pub(crate) kind: NumberKind,
    pub(crate) negative: bool,
    pub(crate) magnitude: Magnitude<'a>,
}

pub trait Sealed {
    fn view(&self) -> View<'_>;
}

/// Numbers that can be compared exactly with each other regardless of
/// representation.
pub trait ExactNumber: Sealed {
    fn number_kind(&self) -> NumberKind {
        self.view().kind
    }

    /// Exact numeric order; NaN sorts above `+Infinity` and all NaNs are
    /// equal.
    fn compare_exact<T: ExactNumber + ?Sized>(&self, other: &T) -> Ordering {
        compare(&self.view(), &other.view())
    }

    /// `true` if both values denote the same number (NaN equals nothing).
    fn equals_exact<T: ExactNumber + ?Sized>(&self, other: &T) -> bool {
        let (a, b) = (self.view(), other.view());
        !is_nan(a.kind) && !is_nan(b.kind) && compare(&a, &b) == Ordering::Equal
    }

    fn to_exact_rational(&self) -> ERational {
        ERational::from_view(&self.view())
    }
}

fn is_nan(kind: NumberKind) -> bool {
    matches!(kind, NumberKind::QuietNaN | NumberKind::SignalingNaN)
}

impl Magnitude<'_> {
    fn is_zero(&self) -> bool {
        match self {
            Magnitude::Scaled(s) => s.mantissa.is_zero(),
            Magnitude::Ratio { numerator, .. } => numerator.is_zero(),
        }
    }

    pub(crate) fn fraction(&self) -> (BigUint, BigUint) {
        match self {
            Magnitude::Scaled(s) => s.to_fraction(),
            Magnitude::Ratio {
                numerator,
                denominator,
            } => ((*numerator).clone(), (*denominator).clone()),
        }
    }

    /// `(lo, hi)` with `2^lo <= |x| < 2^hi`; nonzero magnitudes only.
    fn log2_bounds(&self) -> (BigInt, BigInt) {
        match self {
            Magnitude::Scaled(s) => {
                let bits = BigInt::from(s.mantissa.bits());
                match s.radix {
                    Radix::Binary => (&s.exponent + &bits - 1, &s.exponent + bits),
                    Radix::Decimal => {
                        let (lo, hi) = times_log2_10(&s.exponent);
                        (&bits - 1 + lo, bits + hi)
                    }
                }
            }
            Magnitude::Ratio {
                numerator,
                denominator,
            } => {
                let diff = BigInt::from(numerator.bits()) - BigInt::from(denominator.bits());
                (&diff - 1, diff + 1)
            }
        }
    }

    /// `(lo, hi)` with `10^lo <= |x| < 10^hi`; nonzero magnitudes only.
    fn log10_bounds(&self) -> (BigInt, BigInt) {
        if let Magnitude::Scaled(s) = self {
            if s.radix == Radix::Decimal {
                let digits = BigInt::from(digit_count(&s.mantissa, Radix::Decimal));
                return (&s.exponent + &digits - 1, &s.exponent + digits);
            }
        }
        let (lo, hi) = self.log2_bounds();
        let scale = BigInt::from(LOG_SCALE);
        let lo_factor = if lo.is_negative() {
            LOG10_2_HIGH
        } else {
            LOG10_2_LOW
        };
        let hi_factor = if hi.is_negative() {
            LOG10_2_LOW
        } else {
            LOG10_2_HIGH
        };
        (
            (lo * lo_factor).div_floor(&scale),
            (hi * hi_factor).div_ceil(&scale),
        )
    }

    fn log_bounds(&self, radix: Radix) -> (BigInt, BigInt) {
        match radix {
            Radix::Binary => self.log2_bounds(),
            Radix::Decimal => self.log10_bounds(),
        }
    }
}

/// Integer bracket around `e * log2(10)`.
fn times_log2_10(e: &BigInt) -> (BigInt, BigInt) {
    let scale = BigInt::from(LOG_SCALE);
    let (lo_factor, hi_factor) = if e.is_negative() {
        (LOG2_10_HIGH, LOG2_10_LOW)
    } else {
        (LOG2_10_LOW, LOG2_10_HIGH)
    };
    (
        (e * lo_factor).div_floor(&scale),
        (e * hi_factor).div_ceil(&scale),
    )
}

fn compare_magnitude(a: &Magnitude<'_>, b: &Magnitude<'_>) -> Ordering {
    if let (Magnitude::Scaled(x), Magnitude::Scaled(y)) = (a, b) {
        if x.radix == y.radix {
            return scaled::compare_magnitude(x, y);
        }
    }
    let (a_lo, a_hi) = a.log2_bounds();
    let (b_lo, b_hi) = b.log2_bounds();
    if a_hi <= b_lo {
        return Ordering::Less;
    }
    if b_hi <= a_lo {
        return Ordering::Greater;
    }
    let (an, ad) = a.fraction();
    let (bn, bd) = b.fraction();
    (an * bd).cmp(&(bn * ad))
}

pub(crate) fn compare(a: &View<'_>, b: &View<'_>) -> Ordering {
    match (is_nan(a.kind), is_nan(b.kind)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    let rank = |v: &View<'_>| -> i32 {
        let sign = if v.negative { -1 } else { 1 };
        if v.kind == NumberKind::Infinity {
            2 * sign
        } else if v.magnitude.is_zero() {
            0
        } else {
            sign
        }
    };
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb || ra.abs() != 1 {
        return ra.cmp(&rb);
    }
    let magnitude = compare_magnitude(&a.magnitude, &b.magnitude);
    if a.negative {
        magnitude.reverse()
    } else {
        magnitude
    }
}

/// Rounds a finite nonzero value that provably lies outside `ctx`'s exponent
/// range without materializing it: above `e_max` it is replaced by a value
/// that overflows the same way, below the subnormal range by a value that
/// rounds the same way.
fn beyond_range(view: &View<'_>, radix: Radix, ctx: &PrecisionContext) -> Option<Outcome> {
    if !ctx.has_exponent_range() {
        return None;
    }
    let (lo, hi) = view.magnitude.log_bounds(radix);
    if let Some(e_max) = ctx.e_max() {
        if lo > e_max + 1 {
            let stand_in = e_max + 2;
            return Some(round_parts(radix, view.negative, BigUint::one(), stand_in, Discard::Zero, ctx));
        }
    }
    if let Some(etiny) = ctx.etiny() {
        if hi < etiny {
            let stand_in = etiny - 2;
            return Some(round_parts(radix, view.negative, BigUint::one(), stand_in, Discard::Zero, ctx));
        }
    }
    None
}

/// Converts any number to `radix`, rounding once under `ctx`.
pub(crate) fn convert(view: &View<'_>, radix: Radix, ctx: &PrecisionContext) -> Outcome {
    match view.kind {
        NumberKind::QuietNaN | NumberKind::SignalingNaN => {
            let payload = match &view.magnitude {
                Magnitude::Scaled(s) => s.mantissa.clone(),
                Magnitude::Ratio { .. } => BigUint::zero(),
            };
            let nan = Scaled::special(radix, view.kind, view.negative, payload);
            (nan, Flags::empty())
        }
        NumberKind::Infinity => (Scaled::infinity(radix, view.negative), Flags::empty()),
        NumberKind::Finite => {
            if view.magnitude.is_zero() {
                let exponent = match &view.magnitude {
                    Magnitude::Scaled(s) if s.radix == radix => s.exponent.clone(),
                    _ => BigInt::zero(),
                };
                return round_parts(radix, view.negative, BigUint::zero(), exponent, Discard::Zero, ctx);
            }
            if let Some(outcome) = beyond_range(view, radix, ctx) {
                return outcome;
            }
            match &view.magnitude {
                Magnitude::Scaled(s) if s.radix == radix => round(s, ctx),
                Magnitude::Scaled(s) if !s.exponent.is_negative() => {
                    let (integer, _) = s.to_fraction();
                    round_parts(radix, view.negative, integer, BigInt::zero(), Discard::Zero, ctx)
                }
                magnitude => {
                    let (num, den) = magnitude.fraction();
                    let zero = BigInt::zero();
                    round_fraction(radix, view.negative, &num, &den, BigInt::zero(), Some(&zero), ctx)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled(radix: Radix, m: u64, e: i64) -> Scaled {
        Scaled::finite(radix, false, BigUint::from(m), BigInt::from(e))
    }

    fn view(s: &Scaled) -> View<'_> {
        View {
            kind: s.kind,
            negative: s.negative,
            magnitude: Magnitude::Scaled(s),
        }
    }

    #[test]
    fn log_bounds_bracket_the_value() {
        let d = scaled(Radix::Decimal, 5, -1);
        let (lo, hi) = Magnitude::Scaled(&d).log2_bounds();
        assert!(lo <= BigInt::from(-1));
        assert!(hi >= BigInt::zero());

        let f = scaled(Radix::Binary, 3, 10);
        let (lo, hi) = Magnitude::Scaled(&f).log10_bounds();
        assert!(lo <= BigInt::from(3));
        assert!(hi >= BigInt::from(4));
    }

    #[test]
    fn half_in_both_radixes_is_equal() {
        let d = scaled(Radix::Decimal, 5, -1);
        let f = scaled(Radix::Binary, 1, -1);
        assert_eq!(compare(&view(&d), &view(&f)), Ordering::Equal);
    }

    #[test]
    fn huge_exponents_compare_without_materializing() {
        let d = scaled(Radix::Decimal, 1, 1_000_000_000);
        let f = scaled(Radix::Binary, 1, 1_000_000_000);
        assert_eq!(compare(&view(&d), &view(&f)), Ordering::Greater);
        let tiny = scaled(Radix::Decimal, 1, -1_000_000_000);
        assert_eq!(compare(&view(&tiny), &view(&f)), Ordering::Less);
    }

    #[test]
    fn conversion_guard_overflows_to_infinity() {
        let d = scaled(Radix::Decimal, 1, 1_000_000_000);
        let (v, flags) = convert(&view(&d), Radix::Binary, &PrecisionContext::binary64());
        assert!(v.is_infinite());
        assert!(flags.contains(Flags::OVERFLOW));

        let tiny = scaled(Radix::Decimal, 1, -1_000_000_000);
        let (v, flags) = convert(&view(&tiny), Radix::Binary, &PrecisionContext::binary64());
        assert!(v.is_zero());
        assert!(flags.contains(Flags::UNDERFLOW));
    }
}
