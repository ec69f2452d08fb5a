//! Numeric view over CBOR items: plain integers, doubles and the number
//! tags (bignums, decimal fractions, bigfloats, rationals).

use std::cmp::Ordering;

use cbor_exact_numbers::{
    EDecimal, EFloat, ERational, ExactNumber, Flags, NumberKind, PrecisionContext,
};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::constants::*;
use crate::error::CborError;
use crate::object::{read, CborObject, Item};

/// A CBOR number in its most specific representation.
#[derive(Debug, Clone, PartialEq)]
pub enum CborNumber {
    Integer(i64),
    BigInteger(BigInt),
    Double(f64),
    Decimal(EDecimal),
    Float(EFloat),
    Rational(ERational),
}

enum Tower {
    Decimal(EDecimal),
    Float(EFloat),
    Rational(ERational),
}

pub(crate) fn is_number_tag(tag: u64) -> bool {
    matches!(
        tag,
        TAG_POSITIVE_BIGNUM
            | TAG_NEGATIVE_BIGNUM
            | TAG_DECIMAL_FRACTION
            | TAG_BIGFLOAT
            | TAG_RATIONAL
            | TAG_EXTENDED_DECIMAL
            | TAG_EXTENDED_BIGFLOAT
    )
}

fn plain_integer(item: &Item) -> Option<BigInt> {
    match item {
        Item::UInt(value) => Some(BigInt::from(*value)),
        Item::NInt(value) => Some(-BigInt::from(*value) - BigInt::one()),
        _ => None,
    }
}

/// A plain integer or a tag 2/3 bignum.
fn integer(object: &CborObject) -> Option<BigInt> {
    match object.tags.as_slice() {
        [] => plain_integer(&object.item),
        [tag] => match interpret(*tag, &object.item)? {
            CborNumber::BigInteger(value) => Some(value),
            CborNumber::Integer(value) => Some(BigInt::from(value)),
            _ => None,
        },
        _ => None,
    }
}

fn pair(item: &Item) -> Option<(CborObject, CborObject)> {
    let Item::Array(items) = item else {
        return None;
    };
    match read(items).as_slice() {
        [first, second] => Some((first.clone(), second.clone())),
        _ => None,
    }
}

/// The number denoted by `tag` applied to an untagged `item`, or `None` when
/// the payload does not fit the tag.
pub(crate) fn interpret(tag: u64, item: &Item) -> Option<CborNumber> {
    match tag {
        TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM => {
            let Item::Bytes(bytes) = item else {
                return None;
            };
            let magnitude = BigInt::from(BigUint::from_bytes_be(bytes));
            let value = if tag == TAG_POSITIVE_BIGNUM {
                magnitude
            } else {
                -magnitude - BigInt::one()
            };
            Some(CborNumber::from_bigint(value))
        }
        TAG_DECIMAL_FRACTION | TAG_BIGFLOAT | TAG_EXTENDED_DECIMAL | TAG_EXTENDED_BIGFLOAT => {
            let (exponent, mantissa) = pair(item)?;
            let exponent = if matches!(tag, TAG_DECIMAL_FRACTION | TAG_BIGFLOAT) {
                if exponent.is_tagged() {
                    return None;
                }
                plain_integer(&exponent.item)?
            } else {
                integer(&exponent)?
            };
            let mantissa = integer(&mantissa)?;
            Some(if matches!(tag, TAG_DECIMAL_FRACTION | TAG_EXTENDED_DECIMAL) {
                CborNumber::Decimal(EDecimal::create(mantissa, exponent))
            } else {
                CborNumber::Float(EFloat::create(mantissa, exponent))
            })
        }
        TAG_RATIONAL => {
            let (numerator, denominator) = pair(item)?;
            let numerator = integer(&numerator)?;
            let denominator = integer(&denominator)?;
            if !denominator.is_positive() {
                return None;
            }
            ERational::create(numerator, denominator)
                .ok()
                .map(CborNumber::Rational)
        }
        _ => None,
    }
}

impl CborNumber {
    /// The number an item denotes. The innermost tag decides: a number tag
    /// interprets its payload, any other tag leaves plain integers and
    /// doubles numeric.
    pub fn from_object(object: &CborObject) -> Option<Self> {
        match object.most_inner_tag() {
            Some(tag) if is_number_tag(tag) => interpret(tag, &object.item),
            _ => match &object.item {
                Item::Double(value) => Some(Self::Double(*value)),
                item => plain_integer(item).map(Self::from_bigint),
            },
        }
    }

    /// `Integer` when the value fits an `i64`.
    pub fn from_bigint(value: BigInt) -> Self {
        match value.to_i64() {
            Some(small) => Self::Integer(small),
            None => Self::BigInteger(value),
        }
    }

    pub fn to_cbor(&self) -> CborObject {
        match self {
            Self::Integer(value) => CborObject::from_i64(*value),
            Self::BigInteger(value) => CborObject::from_bigint(value),
            Self::Double(value) => CborObject::from_f64(*value),
            Self::Decimal(value) => CborObject::from_edecimal(value),
            Self::Float(value) => CborObject::from_efloat(value),
            Self::Rational(value) => CborObject::from_erational(value),
        }
    }

    fn tower(&self) -> Tower {
        match self {
            Self::Integer(value) => Tower::Decimal(EDecimal::from_i64(*value)),
            Self::BigInteger(value) => Tower::Decimal(EDecimal::from_bigint(value)),
            Self::Double(value) => Tower::Float(EFloat::from_f64(*value)),
            Self::Decimal(value) => Tower::Decimal(value.clone()),
            Self::Float(value) => Tower::Float(value.clone()),
            Self::Rational(value) => Tower::Rational(value.clone()),
        }
    }

    pub fn kind(&self) -> NumberKind {
        match self.tower() {
            Tower::Decimal(value) => value.number_kind(),
            Tower::Float(value) => value.number_kind(),
            Tower::Rational(value) => value.number_kind(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.kind() == NumberKind::Finite
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.kind(), NumberKind::QuietNaN | NumberKind::SignalingNaN)
    }

    pub fn is_infinity(&self) -> bool {
        self.kind() == NumberKind::Infinity
    }

    pub fn is_positive_infinity(&self) -> bool {
        self.is_infinity() && !self.is_negative()
    }

    pub fn is_negative_infinity(&self) -> bool {
        self.is_infinity() && self.is_negative()
    }

    /// Sign bit, so `-0.0` is negative.
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Integer(value) => *value < 0,
            Self::BigInteger(value) => value.is_negative(),
            Self::Double(value) => value.is_sign_negative(),
            Self::Decimal(value) => value.is_negative(),
            Self::Float(value) => value.is_negative(),
            Self::Rational(value) => value.is_negative(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Integer(value) => *value == 0,
            Self::BigInteger(value) => value.is_zero(),
            Self::Double(value) => *value == 0.0,
            Self::Decimal(value) => value.is_zero(),
            Self::Float(value) => value.is_zero(),
            Self::Rational(value) => value.is_zero(),
        }
    }

    /// Finite with no fractional part.
    pub fn is_integer(&self) -> bool {
        match self {
            Self::Integer(_) | Self::BigInteger(_) => true,
            Self::Double(value) => value.is_finite() && value.fract() == 0.0,
            Self::Decimal(value) => value.is_finite() && value.is_integer(),
            Self::Float(value) => value.is_finite() && value.is_integer(),
            Self::Rational(value) => value.is_finite() && value.is_integer(),
        }
    }

    pub fn signum(&self) -> i32 {
        if self.is_nan() || self.is_zero() {
            0
        } else if self.is_negative() {
            -1
        } else {
            1
        }
    }

    /// Exact numeric order across representations; NaN sorts above
    /// `+Infinity` and all NaNs are equal.
    pub fn compare_to(&self, other: &CborNumber) -> Ordering {
        fn against<T: ExactNumber>(value: &T, other: &Tower) -> Ordering {
            match other {
                Tower::Decimal(other) => value.compare_exact(other),
                Tower::Float(other) => value.compare_exact(other),
                Tower::Rational(other) => value.compare_exact(other),
            }
        }
        if let (Self::Integer(a), Self::Integer(b)) = (self, other) {
            return a.cmp(b);
        }
        let other = other.tower();
        match self.tower() {
            Tower::Decimal(value) => against(&value, &other),
            Tower::Float(value) => against(&value, &other),
            Tower::Rational(value) => against(&value, &other),
        }
    }

    /// Tie-break between numerically equal values.
    pub(crate) fn representation_rank(&self) -> u8 {
        match self {
            Self::Integer(_) => 0,
            Self::BigInteger(_) => 1,
            Self::Double(_) => 2,
            Self::Decimal(_) => 3,
            Self::Float(_) => 4,
            Self::Rational(_) => 5,
        }
    }

    /// Exact decimal. Rationals that do not terminate in base 10 round to
    /// decimal128, as do bigfloats whose binary exponent passes
    /// [`EXACT_DECIMAL_EXPONENT_LIMIT`](cbor_exact_numbers::EXACT_DECIMAL_EXPONENT_LIMIT).
    pub fn to_edecimal(&self) -> Result<EDecimal, CborError> {
        Ok(match self {
            Self::Integer(value) => EDecimal::from_i64(*value),
            Self::BigInteger(value) => EDecimal::from_bigint(value),
            Self::Double(value) => EDecimal::from_f64(*value),
            Self::Decimal(value) => value.clone(),
            Self::Float(value) => value.to_edecimal_bounded(),
            Self::Rational(value) => {
                value.to_edecimal_exact_if_possible(&PrecisionContext::decimal128())?
            }
        })
    }

    /// Exact binary float where the value terminates in base 2, otherwise
    /// rounded to 53 significant bits with an unbounded exponent.
    pub fn to_efloat(&self) -> Result<EFloat, CborError> {
        let nearest = || PrecisionContext::binary64().with_unlimited_exponents();
        Ok(match self {
            Self::Integer(value) => EFloat::from_i64(*value),
            Self::BigInteger(value) => EFloat::from_bigint(value),
            Self::Double(value) => EFloat::from_f64(*value),
            Self::Float(value) => value.clone(),
            Self::Decimal(value) => {
                let ctx = PrecisionContext::unlimited().with_blank_flags();
                let exact = value.to_efloat(&ctx)?;
                if ctx.flags().contains(Flags::INVALID) {
                    value.to_efloat(&nearest())?
                } else {
                    exact
                }
            }
            Self::Rational(value) => {
                let ctx = PrecisionContext::unlimited().with_blank_flags();
                let exact = value.to_efloat(&ctx)?;
                if ctx.flags().contains(Flags::INVALID) {
                    value.to_efloat(&nearest())?
                } else {
                    exact
                }
            }
        })
    }

    pub fn to_erational(&self) -> ERational {
        match self.tower() {
            Tower::Decimal(value) => value.to_erational(),
            Tower::Float(value) => value.to_erational(),
            Tower::Rational(value) => value,
        }
    }

    /// Nearest double, ties to even.
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Double(value) => *value,
            Self::Integer(value) => EDecimal::from_i64(*value).to_f64(),
            Self::BigInteger(value) => EDecimal::from_bigint(value).to_f64(),
            Self::Decimal(value) => value.to_f64(),
            Self::Float(value) => value.to_f64(),
            Self::Rational(value) => value.to_f64(),
        }
    }

    /// Nearest single, ties to even, rounded once from the exact value.
    pub fn to_f32(&self) -> f32 {
        match self.tower() {
            Tower::Decimal(value) => value.to_f32(),
            Tower::Float(value) => value.to_f32(),
            Tower::Rational(value) => value.to_f32(),
        }
    }

    /// Integer part, truncated toward zero.
    pub fn to_bigint_truncated(&self) -> Result<BigInt, CborError> {
        if !self.is_finite() {
            return Err(CborError::arithmetic(format!(
                "{} has no integer value",
                self.describe()
            )));
        }
        let truncated = match self {
            Self::Integer(value) => Ok(BigInt::from(*value)),
            Self::BigInteger(value) => Ok(value.clone()),
            Self::Double(value) => EFloat::from_f64(*value).to_bigint_truncated(),
            Self::Decimal(value) => value.to_bigint_truncated(),
            Self::Float(value) => value.to_bigint_truncated(),
            Self::Rational(value) => value.to_bigint_truncated(),
        };
        truncated.map_err(CborError::from)
    }

    /// Integer part when it is finite and needs fewer than `max_bits` bits.
    /// Extreme exponents are rejected without building the integer.
    pub fn to_bigint_truncated_within(&self, max_bits: u64) -> Option<BigInt> {
        let value = match self {
            Self::Integer(value) => BigInt::from(*value),
            Self::BigInteger(value) => value.clone(),
            Self::Double(value) => return EFloat::from_f64(*value).to_bigint_truncated_within(max_bits),
            Self::Decimal(value) => return value.to_bigint_truncated_within(max_bits),
            Self::Float(value) => return value.to_bigint_truncated_within(max_bits),
            Self::Rational(value) => return value.to_bigint_truncated_within(max_bits),
        };
        (value.bits() < max_bits).then_some(value)
    }

    /// Integer value; fails for fractional, infinite and NaN values.
    pub fn to_bigint_exact(&self) -> Result<BigInt, CborError> {
        if !self.is_integer() {
            return Err(CborError::arithmetic(format!(
                "{} is not an integer",
                self.describe()
            )));
        }
        self.to_bigint_truncated()
    }

    fn describe(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::BigInteger(value) => value.to_string(),
            Self::Double(value) => value.to_string(),
            Self::Decimal(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Rational(value) => value.to_string(),
        }
    }
}
