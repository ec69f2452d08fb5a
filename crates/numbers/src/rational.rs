use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::digits::Radix;
use crate::exact::{self, convert, Magnitude, Sealed, View};
use crate::scaled;
use crate::{ieee, EDecimal, EFloat, ExactNumber, Flags, NumberKind, NumericError, PrecisionContext};

/// Exact ratio of two arbitrary-precision integers, or an infinity or NaN.
///
/// Values need not be in lowest terms; arithmetic results are reduced.
#[derive(Debug, Clone)]
pub struct ERational {
    negative: bool,
    numerator: BigUint,
    denominator: BigUint,
    kind: NumberKind,
}

impl ERational {
    fn finite(negative: bool, numerator: BigUint, denominator: BigUint) -> Self {
        Self {
            negative,
            numerator,
            denominator,
            kind: NumberKind::Finite,
        }
    }

    fn special(kind: NumberKind, negative: bool) -> Self {
        Self {
            negative,
            numerator: BigUint::zero(),
            denominator: BigUint::one(),
            kind,
        }
    }

    fn reduced(negative: bool, numerator: BigUint, denominator: BigUint) -> Self {
        let g = numerator.gcd(&denominator);
        if g.is_one() || g.is_zero() {
            return Self::finite(negative, numerator, denominator);
        }
        Self::finite(negative, numerator / &g, denominator / &g)
    }

    /// `numerator / denominator`; a zero denominator is an argument error.
    pub fn create(
        numerator: impl Into<BigInt>,
        denominator: impl Into<BigInt>,
    ) -> Result<Self, NumericError> {
        let (numerator, denominator) = (numerator.into(), denominator.into());
        if denominator.is_zero() {
            return Err(NumericError::Argument("zero denominator".to_string()));
        }
        let negative = numerator.is_negative() != denominator.is_negative();
        Ok(Self::finite(
            negative,
            numerator.magnitude().clone(),
            denominator.magnitude().clone(),
        ))
    }

    pub fn from_bigint(value: &BigInt) -> Self {
        Self::finite(value.is_negative(), value.magnitude().clone(), BigUint::one())
    }

    pub fn from_i64(value: i64) -> Self {
        Self::from_bigint(&BigInt::from(value))
    }

    pub fn from_edecimal(value: &EDecimal) -> Self {
        value.to_exact_rational()
    }

    pub fn from_efloat(value: &EFloat) -> Self {
        value.to_exact_rational()
    }

    /// Exact value of a double.
    pub fn from_f64(value: f64) -> Self {
        EFloat::from_f64(value).to_exact_rational()
    }

    pub(crate) fn from_view(view: &View<'_>) -> Self {
        match view.kind {
            NumberKind::Finite => {
                let (numerator, denominator) = view.magnitude.fraction();
                Self::reduced(view.negative, numerator, denominator)
            }
            kind => Self::special(kind, view.negative),
        }
    }

    pub fn zero() -> Self {
        Self::from_i64(0)
    }

    pub fn one() -> Self {
        Self::from_i64(1)
    }

    pub fn nan() -> Self {
        Self::special(NumberKind::QuietNaN, false)
    }

    pub fn signaling_nan() -> Self {
        Self::special(NumberKind::SignalingNaN, false)
    }

    pub fn infinity() -> Self {
        Self::special(NumberKind::Infinity, false)
    }

    pub fn negative_infinity() -> Self {
        Self::special(NumberKind::Infinity, true)
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn is_finite(&self) -> bool {
        self.kind == NumberKind::Finite
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.kind, NumberKind::QuietNaN | NumberKind::SignalingNaN)
    }

    pub fn is_signaling_nan(&self) -> bool {
        self.kind == NumberKind::SignalingNaN
    }

    pub fn is_infinity(&self) -> bool {
        self.kind == NumberKind::Infinity
    }

    pub fn is_positive_infinity(&self) -> bool {
        self.is_infinity() && !self.negative
    }

    pub fn is_negative_infinity(&self) -> bool {
        self.is_infinity() && self.negative
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.is_finite() && self.numerator.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.is_finite() && (&self.numerator % &self.denominator).is_zero()
    }

    pub fn signum(&self) -> i32 {
        if self.is_nan() || self.is_zero() {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
    }

    /// Signed numerator.
    pub fn numerator(&self) -> BigInt {
        let magnitude = BigInt::from(self.numerator.clone());
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    pub fn denominator(&self) -> &BigUint {
        &self.denominator
    }

    pub fn negate(&self) -> Self {
        Self {
            negative: !self.negative,
            ..self.clone()
        }
    }

    pub fn abs(&self) -> Self {
        Self {
            negative: false,
            ..self.clone()
        }
    }

    fn nan_operand(&self, other: Option<&Self>) -> Option<(Self, Flags)> {
        let operands = [Some(self), other];
        if operands.iter().flatten().any(|x| x.is_signaling_nan()) {
            return Some((Self::nan(), Flags::INVALID));
        }
        operands
            .iter()
            .flatten()
            .find(|x| x.is_nan())
            .map(|x| ((*x).clone(), Flags::empty()))
    }

    fn signed_sum(&self, other: &Self, subtract: bool) -> (Self, Flags) {
        if let Some(nan) = self.nan_operand(Some(other)) {
            return nan;
        }
        let other_negative = other.negative ^ subtract;
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) if self.negative != other_negative => return (Self::nan(), Flags::INVALID),
            (true, _) => return (self.clone(), Flags::empty()),
            (false, true) => return (Self::special(NumberKind::Infinity, other_negative), Flags::empty()),
            _ => {}
        }
        let a = &self.numerator * &other.denominator;
        let b = &other.numerator * &self.denominator;
        let denominator = &self.denominator * &other.denominator;
        let (negative, numerator) = if self.negative == other_negative {
            (self.negative, a + b)
        } else if a >= b {
            (self.negative && a != b, a - b)
        } else {
            (other_negative, b - a)
        };
        (Self::reduced(negative, numerator, denominator), Flags::empty())
    }

    fn product(&self, other: &Self) -> (Self, Flags) {
        if let Some(nan) = self.nan_operand(Some(other)) {
            return nan;
        }
        let negative = self.negative ^ other.negative;
        if self.is_infinity() || other.is_infinity() {
            if self.is_zero() || other.is_zero() {
                return (Self::nan(), Flags::INVALID);
            }
            return (Self::special(NumberKind::Infinity, negative), Flags::empty());
        }
        let numerator = &self.numerator * &other.numerator;
        let denominator = &self.denominator * &other.denominator;
        (Self::reduced(negative, numerator, denominator), Flags::empty())
    }

    fn quotient(&self, other: &Self) -> (Self, Flags) {
        if let Some(nan) = self.nan_operand(Some(other)) {
            return nan;
        }
        let negative = self.negative ^ other.negative;
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => return (Self::nan(), Flags::INVALID),
            (true, false) => return (Self::special(NumberKind::Infinity, negative), Flags::empty()),
            (false, true) => {
                return (Self::finite(negative, BigUint::zero(), BigUint::one()), Flags::empty())
            }
            _ => {}
        }
        if other.numerator.is_zero() {
            if self.numerator.is_zero() {
                return (Self::nan(), Flags::INVALID);
            }
            return (Self::special(NumberKind::Infinity, negative), Flags::DIVIDE_BY_ZERO);
        }
        let numerator = &self.numerator * &other.denominator;
        let denominator = &self.denominator * &other.numerator;
        (Self::reduced(negative, numerator, denominator), Flags::empty())
    }

    fn modulo(&self, other: &Self) -> (Self, Flags) {
        if let Some(nan) = self.nan_operand(Some(other)) {
            return nan;
        }
        if self.is_infinity() || other.is_zero() {
            return (Self::nan(), Flags::INVALID);
        }
        if other.is_infinity() {
            return (self.clone(), Flags::empty());
        }
        // a/b rem c/d = (a·d mod c·b) / (b·d), sign of the dividend.
        let a = &self.numerator * &other.denominator;
        let c = &other.numerator * &self.denominator;
        let denominator = &self.denominator * &other.denominator;
        (Self::reduced(self.negative, a % c, denominator), Flags::empty())
    }

    fn signal(outcome: (Self, Flags), ctx: &PrecisionContext) -> Result<Self, NumericError> {
        let (value, flags) = outcome;
        ctx.signal(flags)?;
        Ok(value)
    }

    pub fn add(&self, other: &Self) -> Self {
        self.signed_sum(other, false).0
    }

    pub fn subtract(&self, other: &Self) -> Self {
        self.signed_sum(other, true).0
    }

    pub fn multiply(&self, other: &Self) -> Self {
        self.product(other).0
    }

    /// Exact quotient; `x/0` is a signed infinity, `0/0` is NaN.
    pub fn divide(&self, other: &Self) -> Self {
        self.quotient(other).0
    }

    /// Remainder of truncating division; takes the sign of `self`.
    pub fn remainder(&self, other: &Self) -> Self {
        self.modulo(other).0
    }

    /// Exact sum; `ctx` only receives the conditions raised.
    pub fn add_with(&self, other: &Self, ctx: &PrecisionContext) -> Result<Self, NumericError> {
        Self::signal(self.signed_sum(other, false), ctx)
    }

    pub fn subtract_with(&self, other: &Self, ctx: &PrecisionContext) -> Result<Self, NumericError> {
        Self::signal(self.signed_sum(other, true), ctx)
    }

    pub fn multiply_with(&self, other: &Self, ctx: &PrecisionContext) -> Result<Self, NumericError> {
        Self::signal(self.product(other), ctx)
    }

    pub fn divide_with(&self, other: &Self, ctx: &PrecisionContext) -> Result<Self, NumericError> {
        Self::signal(self.quotient(other), ctx)
    }

    pub fn remainder_with(&self, other: &Self, ctx: &PrecisionContext) -> Result<Self, NumericError> {
        Self::signal(self.modulo(other), ctx)
    }

    pub fn compare_to(&self, other: &Self) -> Ordering {
        self.compare_exact(other)
    }

    pub fn compare_to_decimal(&self, other: &EDecimal) -> Ordering {
        self.compare_exact(other)
    }

    pub fn compare_to_float(&self, other: &EFloat) -> Ordering {
        self.compare_exact(other)
    }

    /// Nearest decimal under `ctx`. With unlimited precision a
    /// non-terminating value is NaN with `Invalid`.
    pub fn to_edecimal(&self, ctx: &PrecisionContext) -> Result<EDecimal, NumericError> {
        scaled::finish(convert(&self.view(), Radix::Decimal, ctx), ctx).map(EDecimal)
    }

    /// Exact decimal when the expansion terminates, otherwise rounded under
    /// `ctx`.
    pub fn to_edecimal_exact_if_possible(&self, ctx: &PrecisionContext) -> Result<EDecimal, NumericError> {
        let (exact, flags) = convert(&self.view(), Radix::Decimal, &PrecisionContext::unlimited());
        if flags.is_empty() {
            return Ok(EDecimal(exact));
        }
        self.to_edecimal(ctx)
    }

    pub fn to_efloat(&self, ctx: &PrecisionContext) -> Result<EFloat, NumericError> {
        scaled::finish(convert(&self.view(), Radix::Binary, ctx), ctx).map(EFloat)
    }

    pub fn to_f64(&self) -> f64 {
        ieee::to_f64(&self.view())
    }

    pub fn to_f32(&self) -> f32 {
        ieee::to_f32(&self.view())
    }

    /// Integer part, truncated toward zero.
    pub fn to_bigint_truncated(&self) -> Result<BigInt, NumericError> {
        self.to_bigint_truncated_within(scaled::MAX_INTEGER_BITS)
            .ok_or_else(|| NumericError::Overflow(format!("{self} has no integer value in range")))
    }

    /// Integer part, or `None` when it is not finite or needs `max_bits`
    /// bits or more.
    pub fn to_bigint_truncated_within(&self, max_bits: u64) -> Option<BigInt> {
        if !self.is_finite() {
            return None;
        }
        // The quotient has at least this many bits.
        if self.numerator.bits().saturating_sub(self.denominator.bits()) >= max_bits {
            return None;
        }
        let magnitude = &self.numerator / &self.denominator;
        if magnitude.bits() >= max_bits {
            return None;
        }
        let magnitude = BigInt::from(magnitude);
        Some(if self.negative { -magnitude } else { magnitude })
    }

    pub fn to_bigint_exact(&self) -> Result<BigInt, NumericError> {
        if self.is_finite() && !self.is_integer() {
            return Err(NumericError::Argument(format!("{self} is not an integer")));
        }
        self.to_bigint_truncated()
    }
}

impl Sealed for ERational {
    fn view(&self) -> View<'_> {
        View {
            kind: self.kind,
            negative: self.negative,
            magnitude: Magnitude::Ratio {
                numerator: &self.numerator,
                denominator: &self.denominator,
            },
        }
    }
}

impl ExactNumber for ERational {
    fn to_exact_rational(&self) -> ERational {
        self.clone()
    }
}

impl PartialEq for ERational {
    fn eq(&self, other: &Self) -> bool {
        self.equals_exact(other)
    }
}

impl PartialOrd for ERational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            None
        } else {
            Some(exact::compare(&self.view(), &other.view()))
        }
    }
}

impl From<i64> for ERational {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<BigInt> for ERational {
    fn from(value: BigInt) -> Self {
        Self::from_bigint(&value)
    }
}

impl fmt::Display for ERational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        match self.kind {
            NumberKind::Finite => write!(f, "{sign}{}/{}", self.numerator, self.denominator),
            NumberKind::Infinity => write!(f, "{sign}Infinity"),
            NumberKind::QuietNaN => write!(f, "{sign}NaN"),
            NumberKind::SignalingNaN => write!(f, "{sign}sNaN"),
        }
    }
}

impl FromStr for ERational {
    type Err = NumericError;

    /// `n/d`, a bare integer, `Infinity`, or `NaN`, with an optional sign.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || NumericError::Parse(s.to_string());
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let lower = body.to_ascii_lowercase();
        let special = match lower.as_str() {
            "infinity" | "inf" => Some(NumberKind::Infinity),
            "nan" => Some(NumberKind::QuietNaN),
            "snan" => Some(NumberKind::SignalingNaN),
            _ => None,
        };
        if let Some(kind) = special {
            return Ok(Self::special(kind, negative));
        }
        let digits = |part: &str| -> Result<BigUint, NumericError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(syntax());
            }
            BigUint::parse_bytes(part.as_bytes(), 10).ok_or_else(syntax)
        };
        let (numerator, denominator) = match body.split_once('/') {
            Some((n, d)) => (digits(n)?, digits(d)?),
            None => (digits(body)?, BigUint::one()),
        };
        if denominator.is_zero() {
            return Err(NumericError::Argument("zero denominator".to_string()));
        }
        Ok(Self::finite(negative, numerator, denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(s: &str) -> ERational {
        s.parse().unwrap()
    }

    #[test]
    fn create_rejects_zero_denominator() {
        assert!(matches!(ERational::create(1, 0), Err(NumericError::Argument(_))));
        let v = ERational::create(2, -4).unwrap();
        assert!(v.is_negative());
        assert_eq!(v.numerator(), BigInt::from(-2));
    }

    #[test]
    fn exact_arithmetic() {
        assert_eq!(r("1/3").add(&r("1/6")).to_string(), "1/2");
        assert_eq!(r("1/3").subtract(&r("1/2")).to_string(), "-1/6");
        assert_eq!(r("2/3").multiply(&r("3/4")).to_string(), "1/2");
        assert_eq!(r("1/2").divide(&r("1/4")).to_string(), "2/1");
        assert_eq!(r("-7/2").remainder(&r("1")).to_string(), "-1/2");
        assert_eq!(r("1/2").subtract(&r("1/2")).to_string(), "0/1");
    }

    #[test]
    fn division_by_zero() {
        let ctx = PrecisionContext::unlimited().with_blank_flags();
        assert!(r("-1").divide_with(&r("0"), &ctx).unwrap().is_negative_infinity());
        assert!(ctx.flags().contains(Flags::DIVIDE_BY_ZERO));
        assert!(r("0").divide(&r("0")).is_nan());
        assert!(r("1").remainder(&r("0")).is_nan());
    }

    #[test]
    fn unreduced_values_compare_equal() {
        assert_eq!(ERational::create(2, 4).unwrap(), r("1/2"));
        assert_eq!(r("1/2").compare_to_decimal(&"0.5".parse().unwrap()), Ordering::Equal);
        assert_eq!(r("1/3").compare_to_decimal(&"0.3333".parse().unwrap()), Ordering::Greater);
    }

    #[test]
    fn decimal_conversion() {
        assert_eq!(r("1/8").to_edecimal(&PrecisionContext::unlimited()).unwrap().to_string(), "0.125");
        assert!(r("1/3").to_edecimal(&PrecisionContext::unlimited()).unwrap().is_nan());
        let ctx = PrecisionContext::for_precision(4);
        assert_eq!(r("1/3").to_edecimal_exact_if_possible(&ctx).unwrap().to_string(), "0.3333");
        assert_eq!(r("1/4").to_edecimal_exact_if_possible(&ctx).unwrap().to_string(), "0.25");
    }

    #[test]
    fn float_conversion() {
        assert_eq!(r("1/3").to_f64(), 1.0 / 3.0);
        assert_eq!(r("-1/10").to_f32(), -0.1f32);
        assert_eq!(ERational::from_f64(0.5).to_string(), "1/2");
        assert_eq!(r("7/2").to_bigint_truncated(), Ok(BigInt::from(3)));
        assert!(r("7/2").to_bigint_exact().is_err());
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(r("-3/4").to_string(), "-3/4");
        assert_eq!(r("5").to_string(), "5/1");
        assert!(r("-inf").is_negative_infinity());
        assert!("1/".parse::<ERational>().is_err());
        assert!("1.5".parse::<ERational>().is_err());
    }
}
