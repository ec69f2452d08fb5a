//! Typed views of a [`CborObject`]: numbers, booleans, strings.

use cbor_exact_numbers::{EDecimal, EFloat, ERational};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::constants::*;
use crate::error::CborError;
use crate::number::CborNumber;
use crate::object::{CborObject, Item};

/// Magnitude bits a fixed-width target can take; `u64::MAX` needs 64.
const FIXED_WIDTH_BITS: u64 = 65;

impl CborObject {
    /// The number this item denotes, if it is numeric.
    pub fn as_number(&self) -> Result<CborNumber, CborError> {
        CborNumber::from_object(self)
            .ok_or_else(|| CborError::state(format!("{:?} is not a number", self.kind())))
    }

    pub fn is_number(&self) -> bool {
        CborNumber::from_object(self).is_some()
    }

    fn number_matches(&self, predicate: impl FnOnce(&CborNumber) -> bool) -> bool {
        CborNumber::from_object(self).is_some_and(|number| predicate(&number))
    }

    pub fn is_integral(&self) -> bool {
        self.number_matches(CborNumber::is_integer)
    }

    pub fn is_finite(&self) -> bool {
        self.number_matches(CborNumber::is_finite)
    }

    pub fn is_nan(&self) -> bool {
        self.number_matches(CborNumber::is_nan)
    }

    pub fn is_infinity(&self) -> bool {
        self.number_matches(CborNumber::is_infinity)
    }

    pub fn is_positive_infinity(&self) -> bool {
        self.number_matches(CborNumber::is_positive_infinity)
    }

    pub fn is_negative_infinity(&self) -> bool {
        self.number_matches(CborNumber::is_negative_infinity)
    }

    pub fn is_negative(&self) -> bool {
        self.number_matches(CborNumber::is_negative)
    }

    pub fn is_zero(&self) -> bool {
        self.number_matches(CborNumber::is_zero)
    }

    /// Truncates toward zero, then bounds-checks into `T`.
    fn truncated<T: TryFrom<BigInt>>(&self, target: &str) -> Result<T, CborError> {
        let number = self.as_number()?;
        if let CborNumber::Integer(value) = number {
            return T::try_from(BigInt::from(value))
                .map_err(|_| CborError::arithmetic(format!("{value} out of range for {target}")));
        }
        let truncated = number.to_bigint_truncated_within(FIXED_WIDTH_BITS).ok_or_else(|| {
            CborError::arithmetic(format!("non-finite or oversized value out of range for {target}"))
        })?;
        let message = format!("{truncated} out of range for {target}");
        T::try_from(truncated).map_err(|_| CborError::arithmetic(message))
    }

    pub fn as_i64(&self) -> Result<i64, CborError> {
        self.truncated("i64")
    }

    pub fn as_i32(&self) -> Result<i32, CborError> {
        self.truncated("i32")
    }

    pub fn as_i16(&self) -> Result<i16, CborError> {
        self.truncated("i16")
    }

    pub fn as_u8(&self) -> Result<u8, CborError> {
        self.truncated("u8")
    }

    pub fn as_u64(&self) -> Result<u64, CborError> {
        self.truncated("u64")
    }

    /// Integer value; `Arithmetic` for fractional, infinite and NaN values.
    pub fn as_bigint(&self) -> Result<BigInt, CborError> {
        self.as_number()?.to_bigint_exact()
    }

    /// Nearest double, ties to even.
    pub fn as_f64(&self) -> Result<f64, CborError> {
        Ok(self.as_number()?.to_f64())
    }

    /// Nearest single, rounded once from the exact value.
    pub fn as_f32(&self) -> Result<f32, CborError> {
        Ok(self.as_number()?.to_f32())
    }

    pub fn as_edecimal(&self) -> Result<EDecimal, CborError> {
        self.as_number()?.to_edecimal()
    }

    pub fn as_efloat(&self) -> Result<EFloat, CborError> {
        self.as_number()?.to_efloat()
    }

    pub fn as_erational(&self) -> Result<ERational, CborError> {
        Ok(self.as_number()?.to_erational())
    }

    /// `false` only for false, null and undefined.
    pub fn as_bool(&self) -> bool {
        !matches!(self.item, Item::False | Item::Null | Item::Undefined)
    }

    pub fn as_str(&self) -> Result<&str, CborError> {
        match &self.item {
            Item::Text(text) => Ok(text),
            _ => Err(CborError::state(format!("{:?} is not a text string", self.kind()))),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], CborError> {
        match &self.item {
            Item::Bytes(bytes) => Ok(bytes),
            _ => Err(CborError::state(format!("{:?} is not a byte string", self.kind()))),
        }
    }

    /// Simple value number, including 20 to 23 for false, true, null and
    /// undefined.
    pub fn simple_value(&self) -> Result<u8, CborError> {
        match self.item {
            Item::Simple(value) => Ok(value),
            Item::False => Ok(SIMPLE_FALSE),
            Item::True => Ok(SIMPLE_TRUE),
            Item::Null => Ok(SIMPLE_NULL),
            Item::Undefined => Ok(SIMPLE_UNDEFINED),
            _ => Err(CborError::state(format!("{:?} is not a simple value", self.kind()))),
        }
    }

    /// `true` when converting to `f64` and back loses nothing. NaN and the
    /// infinities fit.
    pub fn can_fit_in_f64(&self) -> bool {
        self.number_matches(|number| match number {
            CborNumber::Double(_) => true,
            number if !number.is_finite() => true,
            number => CborNumber::Double(number.to_f64()).compare_to(number).is_eq(),
        })
    }

    /// `true` when converting to `f32` and back loses nothing.
    pub fn can_fit_in_f32(&self) -> bool {
        self.number_matches(|number| {
            if !number.is_finite() {
                return true;
            }
            let narrowed = number.to_f32();
            narrowed.is_finite()
                && CborNumber::Double(f64::from(narrowed))
                    .compare_to(number)
                    .is_eq()
        })
    }

    fn integral_fits(&self, fits: impl FnOnce(&BigInt) -> bool) -> bool {
        self.number_matches(|number| number.is_integer() && Self::bounded_fits(number, fits))
    }

    fn truncation_fits(&self, fits: impl FnOnce(&BigInt) -> bool) -> bool {
        self.number_matches(|number| Self::bounded_fits(number, fits))
    }

    fn bounded_fits(number: &CborNumber, fits: impl FnOnce(&BigInt) -> bool) -> bool {
        number
            .to_bigint_truncated_within(FIXED_WIDTH_BITS)
            .is_some_and(|value| fits(&value))
    }

    /// Integral and within `i32`.
    pub fn can_fit_in_i32(&self) -> bool {
        self.integral_fits(|value| value.to_i32().is_some())
    }

    /// Integral and within `i64`.
    pub fn can_fit_in_i64(&self) -> bool {
        self.integral_fits(|value| value.to_i64().is_some())
    }

    /// Finite and within `i32` after truncation toward zero.
    pub fn can_truncated_int_fit_in_i32(&self) -> bool {
        self.truncation_fits(|value| value.to_i32().is_some())
    }

    /// Finite and within `i64` after truncation toward zero.
    pub fn can_truncated_int_fit_in_i64(&self) -> bool {
        self.truncation_fits(|value| value.to_i64().is_some())
    }
}
