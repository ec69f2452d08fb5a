//! Radix digit counting, powers and discarded-digit classification.

use std::cmp::Ordering;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

/// The radix of a scaled number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Radix {
    Binary,
    Decimal,
}

impl Radix {
    pub(crate) fn base(self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Decimal => 10,
        }
    }
}

const LOG10_2: f64 = std::f64::consts::LOG10_2;

/// Number of radix digits in `n`; zero has one digit.
pub(crate) fn digit_count(n: &BigUint, radix: Radix) -> u64 {
    if n.is_zero() {
        return 1;
    }
    let bits = n.bits();
    match radix {
        Radix::Binary => bits,
        Radix::Decimal => {
            // 2^(bits-1) <= n < 2^bits, so the count is one of two values.
            let low = ((bits - 1) as f64 * LOG10_2).floor() as u64 + 1;
            if *n >= pow(Radix::Decimal, low) {
                low + 1
            } else {
                low
            }
        }
    }
}

/// `radix^n`.
pub(crate) fn pow(radix: Radix, n: u64) -> BigUint {
    match radix {
        Radix::Binary => BigUint::one() << n,
        Radix::Decimal => {
            let exp = u32::try_from(n).unwrap_or(u32::MAX);
            BigUint::from(10u32).pow(exp)
        }
    }
}

/// `n * radix^k`.
pub(crate) fn scale_up(n: &BigUint, radix: Radix, k: u64) -> BigUint {
    if k == 0 || n.is_zero() {
        return n.clone();
    }
    match radix {
        Radix::Binary => n << k,
        Radix::Decimal => n * pow(Radix::Decimal, k),
    }
}

/// Converts a non-negative exponent difference into a shift count.
pub(crate) fn shift_amount(n: &BigInt) -> u64 {
    n.to_u64().unwrap_or(u64::MAX)
}

/// Removes trailing zero digits while `exponent < limit`.
pub(crate) fn strip_zeros(
    mantissa: &mut BigUint,
    exponent: &mut BigInt,
    radix: Radix,
    limit: Option<&BigInt>,
) {
    if mantissa.is_zero() {
        return;
    }
    let base = BigUint::from(radix.base());
    loop {
        if let Some(limit) = limit {
            if &*exponent >= limit {
                return;
            }
        }
        let (q, r) = mantissa.div_rem(&base);
        if !r.is_zero() {
            return;
        }
        *mantissa = q;
        *exponent += 1;
    }
}

/// The part of a value dropped by rounding, relative to half a unit in the
/// last kept place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Discard {
    Zero,
    BelowHalf,
    Half,
    AboveHalf,
}

impl Discard {
    pub(crate) fn is_zero(self) -> bool {
        self == Discard::Zero
    }

    /// A nonzero remainder below the last computed digit.
    pub(crate) fn sticky(nonzero: bool) -> Self {
        if nonzero {
            Discard::BelowHalf
        } else {
            Discard::Zero
        }
    }
}

/// Drops the lowest `shift` digits of `n`. `prior` describes what was already
/// discarded below `n`'s last digit.
pub(crate) fn split(n: &BigUint, radix: Radix, shift: u64, prior: Discard) -> (BigUint, Discard) {
    if shift == 0 {
        return (n.clone(), prior);
    }
    let digits = digit_count(n, radix);
    if shift > digits {
        // Everything goes, and it is less than half of the new unit.
        let nonzero = !n.is_zero() || !prior.is_zero();
        return (BigUint::zero(), Discard::sticky(nonzero));
    }
    let divisor = pow(radix, shift);
    let (q, r) = n.div_rem(&divisor);
    let discard = if r.is_zero() {
        Discard::sticky(!prior.is_zero())
    } else {
        match (&r << 1u32).cmp(&divisor) {
            Ordering::Less => Discard::BelowHalf,
            Ordering::Equal if prior.is_zero() => Discard::Half,
            _ => Discard::AboveHalf,
        }
    };
    (q, discard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_digit_count() {
        assert_eq!(digit_count(&BigUint::zero(), Radix::Decimal), 1);
        assert_eq!(digit_count(&BigUint::from(9u32), Radix::Decimal), 1);
        assert_eq!(digit_count(&BigUint::from(10u32), Radix::Decimal), 2);
        assert_eq!(digit_count(&BigUint::from(999u32), Radix::Decimal), 3);
        assert_eq!(digit_count(&BigUint::from(1000u32), Radix::Decimal), 4);
        assert_eq!(digit_count(&pow(Radix::Decimal, 40), Radix::Decimal), 41);
        assert_eq!(
            digit_count(&(pow(Radix::Decimal, 40) - 1u32), Radix::Decimal),
            40
        );
    }

    #[test]
    fn binary_digit_count() {
        assert_eq!(digit_count(&BigUint::from(1u32), Radix::Binary), 1);
        assert_eq!(digit_count(&BigUint::from(8u32), Radix::Binary), 4);
    }

    #[test]
    fn split_classifies_remainder() {
        let n = BigUint::from(12345u32);
        assert_eq!(
            split(&n, Radix::Decimal, 2, Discard::Zero),
            (BigUint::from(123u32), Discard::BelowHalf)
        );
        let n = BigUint::from(12350u32);
        assert_eq!(
            split(&n, Radix::Decimal, 2, Discard::Zero),
            (BigUint::from(123u32), Discard::Half)
        );
        assert_eq!(
            split(&n, Radix::Decimal, 2, Discard::BelowHalf),
            (BigUint::from(123u32), Discard::AboveHalf)
        );
        let n = BigUint::from(12300u32);
        assert_eq!(
            split(&n, Radix::Decimal, 2, Discard::BelowHalf),
            (BigUint::from(123u32), Discard::BelowHalf)
        );
    }

    #[test]
    fn split_beyond_all_digits() {
        let n = BigUint::from(99u32);
        assert_eq!(
            split(&n, Radix::Decimal, 5, Discard::Zero),
            (BigUint::zero(), Discard::BelowHalf)
        );
        assert_eq!(
            split(&BigUint::zero(), Radix::Decimal, 5, Discard::Zero),
            (BigUint::zero(), Discard::Zero)
        );
    }

    #[test]
    fn strip_zeros_respects_limit() {
        let mut m = BigUint::from(120000u32);
        let mut e = BigInt::from(-3);
        strip_zeros(&mut m, &mut e, Radix::Decimal, Some(&BigInt::zero()));
        assert_eq!(m, BigUint::from(120u32));
        assert_eq!(e, BigInt::zero());
    }
}
