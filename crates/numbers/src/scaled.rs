//! Radix-parameterized `mantissa × radix^exponent` core shared by
//! [`EDecimal`](crate::EDecimal) and [`EFloat`](crate::EFloat).
//!
//! Every operation computes an exact (or exact-plus-sticky) intermediate and
//! rounds it exactly once in [`round_parts`], so results never suffer double
//! rounding.

use std::cmp::Ordering;

use num_bigint::{BigInt, BigUint};
use num_integer::{Integer, Roots};
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::digits::{digit_count, pow, scale_up, shift_amount, split, strip_zeros, Discard, Radix};
use crate::{Flags, NumberKind, NumericError, PrecisionContext, Rounding};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scaled {
    pub(crate) radix: Radix,
    pub(crate) negative: bool,
    /// Coefficient for finite values, diagnostic payload for NaNs.
    pub(crate) mantissa: BigUint,
    pub(crate) exponent: BigInt,
    pub(crate) kind: NumberKind,
}

pub(crate) type Outcome = (Scaled, Flags);

impl Scaled {
    pub(crate) fn finite(radix: Radix, negative: bool, mantissa: BigUint, exponent: BigInt) -> Self {
        Self {
            radix,
            negative,
            mantissa,
            exponent,
            kind: NumberKind::Finite,
        }
    }

    pub(crate) fn zero(radix: Radix, negative: bool) -> Self {
        Self::finite(radix, negative, BigUint::zero(), BigInt::zero())
    }

    pub(crate) fn special(radix: Radix, kind: NumberKind, negative: bool, payload: BigUint) -> Self {
        Self {
            radix,
            negative,
            mantissa: payload,
            exponent: BigInt::zero(),
            kind,
        }
    }

    pub(crate) fn infinity(radix: Radix, negative: bool) -> Self {
        Self::special(radix, NumberKind::Infinity, negative, BigUint::zero())
    }

    pub(crate) fn nan(radix: Radix) -> Self {
        Self::special(radix, NumberKind::QuietNaN, false, BigUint::zero())
    }

    pub(crate) fn from_bigint(radix: Radix, value: &BigInt) -> Self {
        Self::finite(radix, value.is_negative(), value.magnitude().clone(), BigInt::zero())
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.kind == NumberKind::Finite
    }

    pub(crate) fn is_nan(&self) -> bool {
        matches!(self.kind, NumberKind::QuietNaN | NumberKind::SignalingNaN)
    }

    pub(crate) fn is_infinite(&self) -> bool {
        self.kind == NumberKind::Infinity
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.is_finite() && self.mantissa.is_zero()
    }

    pub(crate) fn signum(&self) -> i32 {
        if self.is_nan() || self.is_zero() {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
    }

    /// Exponent of the most significant digit.
    pub(crate) fn adjusted_exponent(&self) -> BigInt {
        &self.exponent + BigInt::from(digit_count(&self.mantissa, self.radix) - 1)
    }

    pub(crate) fn negated(&self) -> Self {
        Self {
            negative: !self.negative,
            ..self.clone()
        }
    }

    pub(crate) fn absolute(&self) -> Self {
        Self {
            negative: false,
            ..self.clone()
        }
    }

    fn quieted(&self) -> Self {
        Self {
            kind: NumberKind::QuietNaN,
            ..self.clone()
        }
    }

    pub(crate) fn is_integer(&self) -> bool {
        if !self.is_finite() {
            return false;
        }
        if !self.exponent.is_negative() || self.mantissa.is_zero() {
            return true;
        }
        let places = shift_amount(&-&self.exponent);
        if places >= digit_count(&self.mantissa, self.radix) {
            return false;
        }
        (&self.mantissa % pow(self.radix, places)).is_zero()
    }

    /// Removes trailing zeros; zero becomes exponent 0.
    pub(crate) fn reduced(&self) -> Self {
        if !self.is_finite() {
            return self.clone();
        }
        if self.mantissa.is_zero() {
            return Self::zero(self.radix, self.negative);
        }
        let mut mantissa = self.mantissa.clone();
        let mut exponent = self.exponent.clone();
        strip_zeros(&mut mantissa, &mut exponent, self.radix, None);
        Self::finite(self.radix, self.negative, mantissa, exponent)
    }

    /// Exact `(numerator, denominator)` of the magnitude; finite values only.
    pub(crate) fn to_fraction(&self) -> (BigUint, BigUint) {
        if self.exponent.is_negative() {
            (
                self.mantissa.clone(),
                pow(self.radix, shift_amount(&-&self.exponent)),
            )
        } else {
            (
                scale_up(&self.mantissa, self.radix, shift_amount(&self.exponent)),
                BigUint::one(),
            )
        }
    }
}

fn rounds_away(rounding: Rounding, negative: bool, kept: &BigUint, radix: Radix, discard: Discard) -> bool {
    match rounding {
        Rounding::None | Rounding::Down => false,
        Rounding::Up => true,
        Rounding::Ceiling => !negative,
        Rounding::Floor => negative,
        Rounding::HalfUp => discard != Discard::BelowHalf,
        Rounding::HalfDown => discard == Discard::AboveHalf,
        Rounding::HalfEven => {
            discard == Discard::AboveHalf || (discard == Discard::Half && kept.is_odd())
        }
        Rounding::ZeroFiveUp => {
            let last = (kept % radix.base()).to_u32().unwrap_or(1);
            last == 0 || (radix == Radix::Decimal && last == 5)
        }
        Rounding::Odd => kept.is_even(),
    }
}

fn overflow_goes_to_largest(rounding: Rounding, negative: bool) -> bool {
    match rounding {
        Rounding::Down | Rounding::ZeroFiveUp | Rounding::Odd => true,
        Rounding::Ceiling => negative,
        Rounding::Floor => !negative,
        _ => false,
    }
}

/// Rounds `±mantissa × radix^exponent` (plus whatever `prior` says lies below
/// the last digit) to `ctx`.
pub(crate) fn round_parts(
    radix: Radix,
    negative: bool,
    mantissa: BigUint,
    exponent: BigInt,
    prior: Discard,
    ctx: &PrecisionContext,
) -> Outcome {
    let precision = ctx.precision();
    let mut flags = Flags::empty();
    let was_zero = mantissa.is_zero() && prior.is_zero();

    let mut shift = BigInt::zero();
    let digits = digit_count(&mantissa, radix);
    if precision > 0 && digits > precision {
        shift = BigInt::from(digits - precision);
    }
    if let Some(etiny) = ctx.etiny() {
        let needed = etiny - &exponent;
        if needed > shift {
            shift = needed;
        }
    }

    let mut exponent = exponent;
    let (mut kept, discard) = if shift.is_positive() {
        let parts = split(&mantissa, radix, shift_amount(&shift), prior);
        exponent += &shift;
        if was_zero {
            flags |= Flags::CLAMPED;
        } else {
            flags |= Flags::ROUNDED;
        }
        parts
    } else {
        (mantissa, prior)
    };

    if !discard.is_zero() {
        flags |= Flags::INEXACT | Flags::ROUNDED;
        if ctx.rounding() == Rounding::None {
            return (Scaled::nan(radix), flags | Flags::INVALID);
        }
        if rounds_away(ctx.rounding(), negative, &kept, radix, discard) {
            kept += 1u32;
            if precision > 0 && digit_count(&kept, radix) > precision {
                kept /= radix.base();
                exponent += 1;
            }
        }
    }

    if let Some(e_min) = ctx.e_min() {
        if kept.is_zero() {
            if flags.contains(Flags::INEXACT) {
                flags |= Flags::UNDERFLOW | Flags::SUBNORMAL;
            }
        } else {
            let adjusted = &exponent + BigInt::from(digit_count(&kept, radix) - 1);
            if &adjusted < e_min {
                flags |= Flags::SUBNORMAL;
                if flags.contains(Flags::INEXACT) {
                    flags |= Flags::UNDERFLOW;
                }
            }
        }
    }

    if let Some(e_max) = ctx.e_max() {
        if !kept.is_zero() {
            let adjusted = &exponent + BigInt::from(digit_count(&kept, radix) - 1);
            if &adjusted > e_max {
                flags |= Flags::OVERFLOW | Flags::INEXACT | Flags::ROUNDED;
                if ctx.rounding() == Rounding::None {
                    return (Scaled::nan(radix), flags | Flags::INVALID);
                }
                if precision > 0 && overflow_goes_to_largest(ctx.rounding(), negative) {
                    kept = pow(radix, precision) - 1u32;
                    exponent = e_max - BigInt::from(precision - 1);
                } else {
                    return (Scaled::infinity(radix, negative), flags);
                }
            }
        } else if &exponent > e_max {
            exponent = e_max.clone();
            flags |= Flags::CLAMPED;
        }
        if ctx.clamp_normal_exponents() && precision > 0 {
            let top = e_max - BigInt::from(precision - 1);
            if exponent > top {
                if !kept.is_zero() {
                    kept = scale_up(&kept, radix, shift_amount(&(&exponent - &top)));
                }
                exponent = top;
                flags |= Flags::CLAMPED;
            }
        }
    }

    (Scaled::finite(radix, negative, kept, exponent), flags)
}

/// Applies `ctx` to an already-built value.
pub(crate) fn round(value: &Scaled, ctx: &PrecisionContext) -> Outcome {
    match value.kind {
        NumberKind::Finite => round_parts(
            value.radix,
            value.negative,
            value.mantissa.clone(),
            value.exponent.clone(),
            Discard::Zero,
            ctx,
        ),
        NumberKind::SignalingNaN => (value.quieted(), Flags::INVALID),
        _ => (value.clone(), Flags::empty()),
    }
}

pub(crate) fn finish(outcome: Outcome, ctx: &PrecisionContext) -> Result<Scaled, NumericError> {
    let (value, flags) = outcome;
    ctx.signal(flags)?;
    Ok(value)
}

fn propagate_nan(a: &Scaled, b: Option<&Scaled>) -> Option<Outcome> {
    let operands = [Some(a), b];
    for x in operands.iter().flatten() {
        if x.kind == NumberKind::SignalingNaN {
            return Some((x.quieted(), Flags::INVALID));
        }
    }
    for x in operands.iter().flatten() {
        if x.kind == NumberKind::QuietNaN {
            return Some(((*x).clone(), Flags::empty()));
        }
    }
    None
}

fn invalid(radix: Radix) -> Outcome {
    (Scaled::nan(radix), Flags::INVALID)
}

pub(crate) fn add(a: &Scaled, b: &Scaled, subtract: bool, ctx: &PrecisionContext) -> Outcome {
    let radix = a.radix;
    if let Some(nan) = propagate_nan(a, Some(b)) {
        return nan;
    }
    let b_negative = b.negative ^ subtract;
    match (a.is_infinite(), b.is_infinite()) {
        (true, true) if a.negative != b_negative => return invalid(radix),
        (true, _) => return (Scaled::infinity(radix, a.negative), Flags::empty()),
        (false, true) => return (Scaled::infinity(radix, b_negative), Flags::empty()),
        _ => {}
    }

    let floor = ctx.rounding() == Rounding::Floor;
    if a.mantissa.is_zero() && b.mantissa.is_zero() {
        let negative = if a.negative == b_negative {
            a.negative
        } else {
            floor
        };
        let exponent = (&a.exponent).min(&b.exponent).clone();
        return round_parts(radix, negative, BigUint::zero(), exponent, Discard::Zero, ctx);
    }

    let mut x = (a.negative, a.mantissa.clone(), a.exponent.clone());
    let mut y = (b_negative, b.mantissa.clone(), b.exponent.clone());

    // An operand lying wholly below the rounding position only contributes
    // its sign and non-zeroness; swap it for a one-digit stand-in.
    let precision = ctx.precision();
    if precision > 0 && !x.1.is_zero() && !y.1.is_zero() {
        let adj_x = &x.2 + BigInt::from(digit_count(&x.1, radix) - 1);
        let adj_y = &y.2 + BigInt::from(digit_count(&y.1, radix) - 1);
        let (big, small, adj_big, adj_small) = if adj_x >= adj_y {
            (&x, &mut y, adj_x, adj_y)
        } else {
            (&y, &mut x, adj_y, adj_x)
        };
        let limit = (&big.2).min(&(&adj_big - BigInt::from(precision))).clone();
        let stand_in = &limit - 3;
        if adj_small <= &limit - 2 && small.2 < stand_in {
            small.1 = BigUint::one();
            small.2 = stand_in;
        }
    }

    let exponent = (&x.2).min(&y.2).clone();
    let mx = scale_up(&x.1, radix, shift_amount(&(&x.2 - &exponent)));
    let my = scale_up(&y.1, radix, shift_amount(&(&y.2 - &exponent)));
    let (negative, mantissa) = if x.0 == y.0 {
        (x.0, mx + my)
    } else {
        match mx.cmp(&my) {
            Ordering::Greater => (x.0, mx - my),
            Ordering::Less => (y.0, my - mx),
            Ordering::Equal => (floor, BigUint::zero()),
        }
    };
    round_parts(radix, negative, mantissa, exponent, Discard::Zero, ctx)
}

pub(crate) fn multiply(a: &Scaled, b: &Scaled, ctx: &PrecisionContext) -> Outcome {
    let radix = a.radix;
    if let Some(nan) = propagate_nan(a, Some(b)) {
        return nan;
    }
    let negative = a.negative ^ b.negative;
    if a.is_infinite() || b.is_infinite() {
        if a.is_zero() || b.is_zero() {
            return invalid(radix);
        }
        return (Scaled::infinity(radix, negative), Flags::empty());
    }
    round_parts(
        radix,
        negative,
        &a.mantissa * &b.mantissa,
        &a.exponent + &b.exponent,
        Discard::Zero,
        ctx,
    )
}

pub(crate) fn divide(a: &Scaled, b: &Scaled, ctx: &PrecisionContext) -> Outcome {
    let radix = a.radix;
    if let Some(nan) = propagate_nan(a, Some(b)) {
        return nan;
    }
    let negative = a.negative ^ b.negative;
    match (a.is_infinite(), b.is_infinite()) {
        (true, true) => return invalid(radix),
        (true, false) => return (Scaled::infinity(radix, negative), Flags::empty()),
        (false, true) => {
            let exponent = ctx.etiny().unwrap_or_default();
            return round_parts(radix, negative, BigUint::zero(), exponent, Discard::Zero, ctx);
        }
        _ => {}
    }
    if b.mantissa.is_zero() {
        if a.mantissa.is_zero() {
            return invalid(radix);
        }
        return (Scaled::infinity(radix, negative), Flags::DIVIDE_BY_ZERO);
    }
    let ideal = &a.exponent - &b.exponent;
    if a.mantissa.is_zero() {
        return round_parts(radix, negative, BigUint::zero(), ideal, Discard::Zero, ctx);
    }
    round_fraction(
        radix,
        negative,
        &a.mantissa,
        &b.mantissa,
        ideal.clone(),
        Some(&ideal),
        ctx,
    )
}

/// Splits `den` into `radix^k · rest`; returns `(numerator scaled so that the
/// value is mantissa × radix^-k, k)` if the fraction terminates.
fn exact_fraction(radix: Radix, num: &BigUint, den: &BigUint) -> Option<(BigUint, u64)> {
    let g = num.gcd(den);
    let n = num / &g;
    let mut d = den / &g;
    let twos = d.trailing_zeros().unwrap_or(0);
    d >>= twos;
    match radix {
        Radix::Binary => d.is_one().then_some((n, twos)),
        Radix::Decimal => {
            let five = BigUint::from(5u32);
            let mut fives = 0u64;
            loop {
                let (q, r) = d.div_rem(&five);
                if !r.is_zero() {
                    break;
                }
                d = q;
                fives += 1;
            }
            if !d.is_one() {
                return None;
            }
            let k = twos.max(fives);
            let mut mantissa = n << (k - twos);
            if k > fives {
                mantissa *= five.pow(u32::try_from(k - fives).unwrap_or(u32::MAX));
            }
            Some((mantissa, k))
        }
    }
}

/// Rounds `±(num / den) × radix^base_exponent` to `ctx`. With unlimited
/// precision the quotient must terminate, otherwise the result is NaN with
/// `Invalid`. Exact results lose trailing zeros down to `ideal`.
pub(crate) fn round_fraction(
    radix: Radix,
    negative: bool,
    num: &BigUint,
    den: &BigUint,
    base_exponent: BigInt,
    ideal: Option<&BigInt>,
    ctx: &PrecisionContext,
) -> Outcome {
    if num.is_zero() {
        let exponent = ideal.cloned().unwrap_or(base_exponent);
        return round_parts(radix, negative, BigUint::zero(), exponent, Discard::Zero, ctx);
    }
    let precision = ctx.precision();
    let (value, flags) = if precision == 0 {
        let Some((mut mantissa, k)) = exact_fraction(radix, num, den) else {
            return invalid(radix);
        };
        let mut exponent = base_exponent - BigInt::from(k);
        strip_zeros(&mut mantissa, &mut exponent, radix, ideal);
        round_parts(radix, negative, mantissa, exponent, Discard::Zero, ctx)
    } else {
        // Scale so the integer quotient has at least precision + 1 digits;
        // the remainder then only matters as a sticky bit.
        let estimate = digit_count(num, radix) as i128 - digit_count(den, radix) as i128;
        let scale = precision as i128 + 2 - estimate;
        let (n, d) = if scale >= 0 {
            (scale_up(num, radix, scale as u64), den.clone())
        } else {
            (num.clone(), scale_up(den, radix, (-scale) as u64))
        };
        let (q, r) = n.div_rem(&d);
        let exponent = base_exponent - BigInt::from(scale);
        round_parts(radix, negative, q, exponent, Discard::sticky(!r.is_zero()), ctx)
    };
    tidy_exact(value, flags, ideal, ctx)
}

/// Strips trailing zeros from an exact finite result toward `ideal`; only
/// padding digits were dropped, so the result is not reported as rounded.
fn tidy_exact(mut value: Scaled, flags: Flags, ideal: Option<&BigInt>, ctx: &PrecisionContext) -> Outcome {
    if !value.is_finite() || flags.intersects(Flags::INEXACT | Flags::CLAMPED) {
        return (value, flags);
    }
    let Some(ideal) = ideal else {
        return (value, flags);
    };
    let mut limit = ideal.clone();
    if ctx.clamp_normal_exponents() && ctx.precision() > 0 {
        if let Some(e_max) = ctx.e_max() {
            let top = e_max - BigInt::from(ctx.precision() - 1);
            limit = limit.min(top);
        }
    }
    let radix = value.radix;
    strip_zeros(&mut value.mantissa, &mut value.exponent, radix, Some(&limit));
    (value, flags.without(Flags::ROUNDED))
}

pub(crate) fn sqrt(a: &Scaled, ctx: &PrecisionContext) -> Outcome {
    let radix = a.radix;
    if let Some(nan) = propagate_nan(a, None) {
        return nan;
    }
    if a.is_infinite() {
        if a.negative {
            return invalid(radix);
        }
        return (a.clone(), Flags::empty());
    }
    let ideal = a.exponent.div_floor(&BigInt::from(2));
    if a.mantissa.is_zero() {
        return round_parts(radix, a.negative, BigUint::zero(), ideal, Discard::Zero, ctx);
    }
    if a.negative {
        return invalid(radix);
    }
    let precision = ctx.precision();
    let (mut m, mut e) = (a.mantissa.clone(), a.exponent.clone());
    if precision > 0 {
        let digits = digit_count(&m, radix);
        let wanted = 2 * precision + 3;
        if digits < wanted {
            let t = wanted - digits;
            m = scale_up(&m, radix, t);
            e -= BigInt::from(t);
        }
    }
    if e.is_odd() {
        m = scale_up(&m, radix, 1);
        e -= 1;
    }
    let root = Roots::sqrt(&m);
    let exact = &root * &root == m;
    if precision == 0 && !exact {
        return invalid(radix);
    }
    let half = e / 2;
    let (value, flags) = round_parts(radix, false, root, half, Discard::sticky(!exact), ctx);
    tidy_exact(value, flags, Some(&ideal), ctx)
}

pub(crate) fn remainder(a: &Scaled, b: &Scaled, ctx: &PrecisionContext) -> Outcome {
    let radix = a.radix;
    if let Some(nan) = propagate_nan(a, Some(b)) {
        return nan;
    }
    if a.is_infinite() || b.is_zero() {
        return invalid(radix);
    }
    if b.is_infinite() || a.is_zero() || a.adjusted_exponent() < b.adjusted_exponent() {
        return round(a, ctx);
    }
    let exponent = (&a.exponent).min(&b.exponent).clone();
    let ma = scale_up(&a.mantissa, radix, shift_amount(&(&a.exponent - &exponent)));
    let mb = scale_up(&b.mantissa, radix, shift_amount(&(&b.exponent - &exponent)));
    round_parts(radix, a.negative, ma % mb, exponent, Discard::Zero, ctx)
}

/// Re-expresses a finite value at `target` exponent, rounding with `rounding`.
fn rescale(a: &Scaled, target: &BigInt, rounding: Rounding) -> (BigUint, Discard) {
    if target >= &a.exponent {
        let shift = shift_amount(&(target - &a.exponent));
        let (mut kept, discard) = split(&a.mantissa, a.radix, shift, Discard::Zero);
        if !discard.is_zero() && rounds_away(rounding, a.negative, &kept, a.radix, discard) {
            kept += 1u32;
        }
        (kept, discard)
    } else {
        let shift = shift_amount(&(&a.exponent - target));
        (scale_up(&a.mantissa, a.radix, shift), Discard::Zero)
    }
}

pub(crate) fn quantize(a: &Scaled, target: &BigInt, ctx: &PrecisionContext) -> Outcome {
    let radix = a.radix;
    if let Some(nan) = propagate_nan(a, None) {
        return nan;
    }
    if a.is_infinite() {
        return invalid(radix);
    }
    if let Some(etiny) = ctx.etiny() {
        if target < &etiny {
            return invalid(radix);
        }
    }
    let (kept, discard) = rescale(a, target, ctx.rounding());
    let mut flags = Flags::empty();
    if !discard.is_zero() {
        if ctx.rounding() == Rounding::None {
            return invalid(radix);
        }
        flags |= Flags::INEXACT | Flags::ROUNDED;
    }
    let digits = digit_count(&kept, radix);
    if ctx.precision() > 0 && digits > ctx.precision() {
        return invalid(radix);
    }
    if let Some(e_max) = ctx.e_max() {
        if !kept.is_zero() && &(target + BigInt::from(digits - 1)) > e_max {
            return invalid(radix);
        }
    }
    (Scaled::finite(radix, a.negative, kept, target.clone()), flags)
}

pub(crate) fn round_to_integral(a: &Scaled, ctx: &PrecisionContext) -> Outcome {
    if !a.is_finite() {
        return propagate_nan(a, None).unwrap_or_else(|| (a.clone(), Flags::empty()));
    }
    if !a.exponent.is_negative() {
        return (a.clone(), Flags::empty());
    }
    let (kept, discard) = rescale(a, &BigInt::zero(), ctx.rounding());
    if discard.is_zero() {
        return (Scaled::finite(a.radix, a.negative, kept, BigInt::zero()), Flags::empty());
    }
    if ctx.rounding() == Rounding::None {
        return invalid(a.radix);
    }
    (
        Scaled::finite(a.radix, a.negative, kept, BigInt::zero()),
        Flags::INEXACT | Flags::ROUNDED,
    )
}

/// Largest integer magnitude, in bits, the integer conversions materialize.
pub(crate) const MAX_INTEGER_BITS: u64 = 1 << 20;

/// Integer part, truncated toward zero, and whether nothing was dropped.
/// `None` for NaN, infinity and magnitudes of `max_bits` bits or more; the
/// size check runs on the exponent before any power is built.
pub(crate) fn truncate(a: &Scaled, max_bits: u64) -> Option<(BigInt, bool)> {
    if !a.is_finite() {
        return None;
    }
    if a.mantissa.is_zero() {
        return Some((BigInt::zero(), true));
    }
    let adjusted = a.adjusted_exponent();
    if adjusted.is_negative() {
        return Some((BigInt::zero(), false));
    }
    // radix^adjusted <= |a|, and 10^n >= 2^(3n).
    let bits_per_digit = match a.radix {
        Radix::Binary => 1u32,
        Radix::Decimal => 3,
    };
    if adjusted * bits_per_digit >= BigInt::from(max_bits) {
        return None;
    }
    let (kept, discard) = if a.exponent.is_negative() {
        rescale(a, &BigInt::zero(), Rounding::Down)
    } else {
        (
            scale_up(&a.mantissa, a.radix, shift_amount(&a.exponent)),
            Discard::Zero,
        )
    };
    if kept.bits() >= max_bits {
        return None;
    }
    let value = BigInt::from(kept);
    let value = if a.negative { -value } else { value };
    Some((value, discard.is_zero()))
}

/// Numeric comparison of two values of the same radix; NaN sorts above
/// everything and all NaNs are equal.
pub(crate) fn compare(a: &Scaled, b: &Scaled) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    let rank = |x: &Scaled| -> i32 {
        if x.is_infinite() {
            if x.negative {
                -2
            } else {
                2
            }
        } else {
            x.signum()
        }
    };
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb || ra.abs() != 1 {
        return ra.cmp(&rb);
    }
    let magnitude = compare_magnitude(a, b);
    if a.negative {
        magnitude.reverse()
    } else {
        magnitude
    }
}

/// Compares `|a|` and `|b|` for nonzero finite values of one radix.
pub(crate) fn compare_magnitude(a: &Scaled, b: &Scaled) -> Ordering {
    let by_adjusted = a.adjusted_exponent().cmp(&b.adjusted_exponent());
    if by_adjusted != Ordering::Equal {
        return by_adjusted;
    }
    let exponent = (&a.exponent).min(&b.exponent).clone();
    let ma = scale_up(&a.mantissa, a.radix, shift_amount(&(&a.exponent - &exponent)));
    let mb = scale_up(&b.mantissa, b.radix, shift_amount(&(&b.exponent - &exponent)));
    ma.cmp(&mb)
}
