//! Rounding and precision policy passed to arithmetic operations.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use num_bigint::BigInt;

use crate::NumericError;

/// How a result is rounded when it has more digits than the context allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rounding {
    /// Rounding is not allowed; an inexact result is an invalid operation.
    None,
    /// Away from zero.
    Up,
    /// Toward zero (truncation).
    Down,
    /// Toward positive infinity.
    Ceiling,
    /// Toward negative infinity.
    Floor,
    /// To nearest, ties away from zero.
    HalfUp,
    /// To nearest, ties toward zero.
    HalfDown,
    /// To nearest, ties to an even last digit.
    #[default]
    HalfEven,
    /// Toward zero, unless the last kept digit is 0 (or 5 in radix 10).
    ZeroFiveUp,
    /// Toward zero, then force the last digit odd if anything was discarded.
    Odd,
}

/// Arithmetic conditions raised by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u32);

impl Flags {
    pub const INEXACT: Flags = Flags(1);
    pub const ROUNDED: Flags = Flags(1 << 1);
    pub const SUBNORMAL: Flags = Flags(1 << 2);
    pub const UNDERFLOW: Flags = Flags(1 << 3);
    pub const OVERFLOW: Flags = Flags(1 << 4);
    pub const CLAMPED: Flags = Flags(1 << 5);
    pub const INVALID: Flags = Flags(1 << 6);
    pub const DIVIDE_BY_ZERO: Flags = Flags(1 << 7);

    const NAMES: [(Flags, &'static str); 8] = [
        (Flags::INEXACT, "Inexact"),
        (Flags::ROUNDED, "Rounded"),
        (Flags::SUBNORMAL, "Subnormal"),
        (Flags::UNDERFLOW, "Underflow"),
        (Flags::OVERFLOW, "Overflow"),
        (Flags::CLAMPED, "Clamped"),
        (Flags::INVALID, "Invalid"),
        (Flags::DIVIDE_BY_ZERO, "DivideByZero"),
    ];

    pub const fn empty() -> Self {
        Flags(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Flags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if every flag in `other` is set.
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if any flag in `other` is set.
    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn without(self, other: Flags) -> Self {
        Flags(self.0 & !other.0)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Flags {
    type Output = Flags;

    fn bitand(self, rhs: Flags) -> Flags {
        Flags(self.0 & rhs.0)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (flag, name) in Flags::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Immutable rounding/precision policy.
///
/// `precision == 0` means unlimited. Exponent limits apply to the adjusted
/// exponent (the exponent of the most significant digit), as in IEEE 754 and
/// the General Decimal Arithmetic specification. A context optionally carries
/// a shared flag sink that accumulates the conditions raised by every
/// operation run under it; `with_*` methods return copies.
#[derive(Debug, Clone)]
pub struct PrecisionContext {
    precision: u64,
    rounding: Rounding,
    e_min: Option<BigInt>,
    e_max: Option<BigInt>,
    clamp_normal_exponents: bool,
    traps: Flags,
    flags: Option<Arc<AtomicU32>>,
}

impl Default for PrecisionContext {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl PrecisionContext {
    /// Unlimited precision and exponent range, rounding half-even.
    pub fn unlimited() -> Self {
        Self {
            precision: 0,
            rounding: Rounding::HalfEven,
            e_min: None,
            e_max: None,
            clamp_normal_exponents: false,
            traps: Flags::empty(),
            flags: None,
        }
    }

    pub fn for_precision(precision: u64) -> Self {
        Self::unlimited().with_precision(precision)
    }

    pub fn for_precision_and_rounding(precision: u64, rounding: Rounding) -> Self {
        Self::unlimited()
            .with_precision(precision)
            .with_rounding(rounding)
    }

    pub fn for_rounding(rounding: Rounding) -> Self {
        Self::unlimited().with_rounding(rounding)
    }

    fn ieee(precision: u64, e_min: i64, e_max: i64) -> Self {
        Self::for_precision(precision).with_exponent_range(e_min, e_max)
    }

    /// IEEE 754 binary16.
    pub fn binary16() -> Self {
        Self::ieee(11, -14, 15)
    }

    /// IEEE 754 binary32.
    pub fn binary32() -> Self {
        Self::ieee(24, -126, 127)
    }

    /// IEEE 754 binary64.
    pub fn binary64() -> Self {
        Self::ieee(53, -1022, 1023)
    }

    /// IEEE 754 decimal32.
    pub fn decimal32() -> Self {
        Self::ieee(7, -95, 96).with_clamp_normal_exponents(true)
    }

    /// IEEE 754 decimal64.
    pub fn decimal64() -> Self {
        Self::ieee(16, -383, 384).with_clamp_normal_exponents(true)
    }

    /// IEEE 754 decimal128.
    pub fn decimal128() -> Self {
        Self::ieee(34, -6143, 6144).with_clamp_normal_exponents(true)
    }

    pub fn precision(&self) -> u64 {
        self.precision
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    pub fn e_min(&self) -> Option<&BigInt> {
        self.e_min.as_ref()
    }

    pub fn e_max(&self) -> Option<&BigInt> {
        self.e_max.as_ref()
    }

    pub fn has_exponent_range(&self) -> bool {
        self.e_min.is_some() || self.e_max.is_some()
    }

    pub fn clamp_normal_exponents(&self) -> bool {
        self.clamp_normal_exponents
    }

    pub fn traps(&self) -> Flags {
        self.traps
    }

    pub fn has_flags(&self) -> bool {
        self.flags.is_some()
    }

    /// Conditions accumulated so far, or empty if the context has no sink.
    pub fn flags(&self) -> Flags {
        self.flags
            .as_ref()
            .map(|sink| Flags::from_bits(sink.load(Ordering::Relaxed)))
            .unwrap_or_default()
    }

    pub fn with_precision(&self, precision: u64) -> Self {
        Self {
            precision,
            ..self.clone()
        }
    }

    pub fn with_rounding(&self, rounding: Rounding) -> Self {
        Self {
            rounding,
            ..self.clone()
        }
    }

    pub fn with_exponent_range(&self, e_min: impl Into<BigInt>, e_max: impl Into<BigInt>) -> Self {
        Self {
            e_min: Some(e_min.into()),
            e_max: Some(e_max.into()),
            ..self.clone()
        }
    }

    pub fn with_unlimited_exponents(&self) -> Self {
        Self {
            e_min: None,
            e_max: None,
            ..self.clone()
        }
    }

    pub fn with_clamp_normal_exponents(&self, clamp: bool) -> Self {
        Self {
            clamp_normal_exponents: clamp,
            ..self.clone()
        }
    }

    /// Conditions in `traps` turn the operation into an error.
    pub fn with_traps(&self, traps: Flags) -> Self {
        Self {
            traps,
            ..self.clone()
        }
    }

    /// Attaches a fresh, empty flag sink.
    pub fn with_blank_flags(&self) -> Self {
        Self {
            flags: Some(Arc::new(AtomicU32::new(0))),
            ..self.clone()
        }
    }

    pub fn with_no_flags(&self) -> Self {
        Self {
            flags: None,
            ..self.clone()
        }
    }

    /// Smallest exponent a result may carry.
    pub(crate) fn etiny(&self) -> Option<BigInt> {
        self.e_min.as_ref().map(|e_min| {
            if self.precision > 0 {
                e_min - BigInt::from(self.precision - 1)
            } else {
                e_min.clone()
            }
        })
    }

    /// Records `raised` in the sink and fails if any of it is trapped.
    pub(crate) fn signal(&self, raised: Flags) -> Result<(), NumericError> {
        if raised.is_empty() {
            return Ok(());
        }
        if let Some(sink) = &self.flags {
            sink.fetch_or(raised.bits(), Ordering::Relaxed);
        }
        if raised.intersects(self.traps) {
            return Err(NumericError::Trapped { flags: raised });
        }
        Ok(())
    }
}
