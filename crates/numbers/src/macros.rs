/// Public API shared by the radix newtypes over [`Scaled`](crate::scaled::Scaled).
macro_rules! scaled_number {
    ($name:ident, $radix:expr) => {
        impl $name {
            fn finish(
                outcome: $crate::scaled::Outcome,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                $crate::scaled::finish(outcome, ctx).map(Self)
            }

            /// Result of an operation under an unlimited context, which never
            /// traps.
            fn unbounded(outcome: $crate::scaled::Outcome) -> Self {
                Self(outcome.0)
            }

            pub fn zero() -> Self {
                Self($crate::scaled::Scaled::zero($radix, false))
            }

            pub fn negative_zero() -> Self {
                Self($crate::scaled::Scaled::zero($radix, true))
            }

            pub fn one() -> Self {
                Self::from_u64(1)
            }

            pub fn nan() -> Self {
                Self($crate::scaled::Scaled::nan($radix))
            }

            pub fn signaling_nan() -> Self {
                Self($crate::scaled::Scaled::special(
                    $radix,
                    $crate::NumberKind::SignalingNaN,
                    false,
                    ::num_bigint::BigUint::default(),
                ))
            }

            /// Quiet NaN carrying a diagnostic payload.
            pub fn nan_with_payload(payload: ::num_bigint::BigUint, negative: bool) -> Self {
                Self($crate::scaled::Scaled::special(
                    $radix,
                    $crate::NumberKind::QuietNaN,
                    negative,
                    payload,
                ))
            }

            pub fn infinity() -> Self {
                Self($crate::scaled::Scaled::infinity($radix, false))
            }

            pub fn negative_infinity() -> Self {
                Self($crate::scaled::Scaled::infinity($radix, true))
            }

            pub fn from_i64(value: i64) -> Self {
                Self::from_bigint(&::num_bigint::BigInt::from(value))
            }

            pub fn from_u64(value: u64) -> Self {
                Self::from_bigint(&::num_bigint::BigInt::from(value))
            }

            pub fn from_bigint(value: &::num_bigint::BigInt) -> Self {
                Self($crate::scaled::Scaled::from_bigint($radix, value))
            }

            /// `mantissa × radix^exponent`.
            pub fn create(
                mantissa: impl Into<::num_bigint::BigInt>,
                exponent: impl Into<::num_bigint::BigInt>,
            ) -> Self {
                let mantissa = mantissa.into();
                Self($crate::scaled::Scaled::finite(
                    $radix,
                    ::num_traits::Signed::is_negative(&mantissa),
                    mantissa.magnitude().clone(),
                    exponent.into(),
                ))
            }

            pub fn is_finite(&self) -> bool {
                self.0.is_finite()
            }

            pub fn is_nan(&self) -> bool {
                self.0.is_nan()
            }

            pub fn is_quiet_nan(&self) -> bool {
                self.0.kind == $crate::NumberKind::QuietNaN
            }

            pub fn is_signaling_nan(&self) -> bool {
                self.0.kind == $crate::NumberKind::SignalingNaN
            }

            pub fn is_infinity(&self) -> bool {
                self.0.is_infinite()
            }

            pub fn is_positive_infinity(&self) -> bool {
                self.0.is_infinite() && !self.0.negative
            }

            pub fn is_negative_infinity(&self) -> bool {
                self.0.is_infinite() && self.0.negative
            }

            /// Sign bit; `true` for `-0` and negative NaNs too.
            pub fn is_negative(&self) -> bool {
                self.0.negative
            }

            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }

            pub fn is_integer(&self) -> bool {
                self.0.is_integer()
            }

            /// -1, 0 or 1; 0 for zeros and NaN.
            pub fn signum(&self) -> i32 {
                self.0.signum()
            }

            pub fn kind(&self) -> $crate::NumberKind {
                self.0.kind
            }

            /// Signed coefficient (or NaN payload).
            pub fn mantissa(&self) -> ::num_bigint::BigInt {
                let magnitude = ::num_bigint::BigInt::from(self.0.mantissa.clone());
                if self.0.negative {
                    -magnitude
                } else {
                    magnitude
                }
            }

            pub fn unsigned_mantissa(&self) -> &::num_bigint::BigUint {
                &self.0.mantissa
            }

            pub fn exponent(&self) -> &::num_bigint::BigInt {
                &self.0.exponent
            }

            pub fn negate(&self) -> Self {
                Self(self.0.negated())
            }

            pub fn abs(&self) -> Self {
                Self(self.0.absolute())
            }

            /// Exact sum.
            pub fn add(&self, other: &Self) -> Self {
                Self::unbounded($crate::scaled::add(
                    &self.0,
                    &other.0,
                    false,
                    &$crate::PrecisionContext::unlimited(),
                ))
            }

            pub fn add_with(
                &self,
                other: &Self,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                Self::finish($crate::scaled::add(&self.0, &other.0, false, ctx), ctx)
            }

            /// Exact difference.
            pub fn subtract(&self, other: &Self) -> Self {
                Self::unbounded($crate::scaled::add(
                    &self.0,
                    &other.0,
                    true,
                    &$crate::PrecisionContext::unlimited(),
                ))
            }

            pub fn subtract_with(
                &self,
                other: &Self,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                Self::finish($crate::scaled::add(&self.0, &other.0, true, ctx), ctx)
            }

            /// Exact product.
            pub fn multiply(&self, other: &Self) -> Self {
                Self::unbounded($crate::scaled::multiply(
                    &self.0,
                    &other.0,
                    &$crate::PrecisionContext::unlimited(),
                ))
            }

            pub fn multiply_with(
                &self,
                other: &Self,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                Self::finish($crate::scaled::multiply(&self.0, &other.0, ctx), ctx)
            }

            /// Exact quotient; NaN when the quotient does not terminate in
            /// this radix.
            pub fn divide(&self, other: &Self) -> Self {
                Self::unbounded($crate::scaled::divide(
                    &self.0,
                    &other.0,
                    &$crate::PrecisionContext::unlimited(),
                ))
            }

            pub fn divide_with(
                &self,
                other: &Self,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                Self::finish($crate::scaled::divide(&self.0, &other.0, ctx), ctx)
            }

            /// Remainder of truncating division; takes the sign of `self`.
            pub fn remainder(
                &self,
                other: &Self,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                Self::finish($crate::scaled::remainder(&self.0, &other.0, ctx), ctx)
            }

            pub fn sqrt_with(
                &self,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                Self::finish($crate::scaled::sqrt(&self.0, ctx), ctx)
            }

            pub fn round_to_precision(
                &self,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                Self::finish($crate::scaled::round(&self.0, ctx), ctx)
            }

            /// Re-expresses the value with the given exponent, rounding with
            /// the context's mode. NaN with `Invalid` when the result would
            /// not fit the context's precision.
            pub fn quantize(
                &self,
                exponent: impl Into<::num_bigint::BigInt>,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                Self::finish($crate::scaled::quantize(&self.0, &exponent.into(), ctx), ctx)
            }

            pub fn round_to_integral(
                &self,
                ctx: &$crate::PrecisionContext,
            ) -> Result<Self, $crate::NumericError> {
                Self::finish($crate::scaled::round_to_integral(&self.0, ctx), ctx)
            }

            /// Removes trailing zeros from the coefficient.
            pub fn reduce(&self) -> Self {
                Self(self.0.reduced())
            }

            /// Numeric order; NaN sorts above `+Infinity`.
            pub fn compare_to(&self, other: &Self) -> ::std::cmp::Ordering {
                $crate::scaled::compare(&self.0, &other.0)
            }

            pub fn compare_to_decimal(&self, other: &$crate::EDecimal) -> ::std::cmp::Ordering {
                $crate::ExactNumber::compare_exact(self, other)
            }

            pub fn compare_to_float(&self, other: &$crate::EFloat) -> ::std::cmp::Ordering {
                $crate::ExactNumber::compare_exact(self, other)
            }

            pub fn compare_to_rational(&self, other: &$crate::ERational) -> ::std::cmp::Ordering {
                $crate::ExactNumber::compare_exact(self, other)
            }

            /// Nearest `f64`, ties to even.
            pub fn to_f64(&self) -> f64 {
                $crate::ieee::to_f64(&$crate::exact::Sealed::view(self))
            }

            /// Nearest `f32`, ties to even.
            pub fn to_f32(&self) -> f32 {
                $crate::ieee::to_f32(&$crate::exact::Sealed::view(self))
            }

            /// Integer value, failing if there is a fractional part or the
            /// magnitude needs more than a million bits.
            pub fn to_bigint_exact(&self) -> Result<::num_bigint::BigInt, $crate::NumericError> {
                if self.is_finite() && !self.is_integer() {
                    return Err($crate::NumericError::Argument(format!("{} is not an integer", self)));
                }
                self.to_bigint_truncated()
            }

            /// Integer part, truncated toward zero. Fails for NaN, infinity
            /// and magnitudes past a million bits.
            pub fn to_bigint_truncated(&self) -> Result<::num_bigint::BigInt, $crate::NumericError> {
                self.to_bigint_truncated_within($crate::scaled::MAX_INTEGER_BITS)
                    .ok_or_else(|| $crate::NumericError::Overflow(format!("{} has no integer value in range", self)))
            }

            /// Integer part, or `None` when it is not finite or needs
            /// `max_bits` bits or more. Oversized values are rejected from
            /// the exponent alone.
            pub fn to_bigint_truncated_within(&self, max_bits: u64) -> Option<::num_bigint::BigInt> {
                $crate::scaled::truncate(&self.0, max_bits).map(|(value, _)| value)
            }

            pub fn to_erational(&self) -> $crate::ERational {
                $crate::ExactNumber::to_exact_rational(self)
            }
        }

        impl $crate::exact::Sealed for $name {
            fn view(&self) -> $crate::exact::View<'_> {
                $crate::exact::View {
                    kind: self.0.kind,
                    negative: self.0.negative,
                    magnitude: $crate::exact::Magnitude::Scaled(&self.0),
                }
            }
        }

        impl $crate::ExactNumber for $name {}

        impl PartialEq for $name {
            /// Numeric equality; NaN is unequal to everything.
            fn eq(&self, other: &Self) -> bool {
                !self.is_nan() && !other.is_nan() && self.compare_to(other).is_eq()
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
                if self.is_nan() || other.is_nan() {
                    None
                } else {
                    Some(self.compare_to(other))
                }
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self::from_i64(value)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self::from_u64(value)
            }
        }

        impl From<::num_bigint::BigInt> for $name {
            fn from(value: ::num_bigint::BigInt) -> Self {
                Self::from_bigint(&value)
            }
        }

        impl ::std::ops::Neg for $name {
            type Output = $name;

            fn neg(self) -> $name {
                self.negate()
            }
        }
    };
}
