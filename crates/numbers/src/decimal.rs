use std::fmt;
use std::str::FromStr;

use crate::digits::Radix;
use crate::exact::{convert, Sealed};
use crate::scaled::{self, Scaled};
use crate::{ieee, text, EFloat, NumericError, PrecisionContext};

/// Arbitrary-precision decimal floating-point number:
/// `mantissa × 10^exponent`, or an infinity or NaN.
///
/// Values are immutable. Operations without a context are exact; the
/// `*_with` variants round once under the supplied [`PrecisionContext`].
#[derive(Debug, Clone)]
pub struct EDecimal(pub(crate) Scaled);

scaled_number!(EDecimal, Radix::Decimal);

impl EDecimal {
    /// Exact decimal value of a double, e.g. `0.1` becomes
    /// `0.1000000000000000055511151231257827021181583404541015625`.
    pub fn from_f64(value: f64) -> Self {
        EFloat::from_f64(value).to_edecimal()
    }

    pub fn from_f32(value: f32) -> Self {
        EFloat::from_f32(value).to_edecimal()
    }

    /// Parses and rounds in one step.
    pub fn from_str_with(input: &str, ctx: &PrecisionContext) -> Result<Self, NumericError> {
        let parsed = text::parse_decimal(input)?;
        scaled::finish(scaled::round(&parsed, ctx), ctx).map(EDecimal)
    }

    /// Nearest binary float under `ctx`.
    pub fn to_efloat(&self, ctx: &PrecisionContext) -> Result<EFloat, NumericError> {
        scaled::finish(convert(&self.view(), Radix::Binary, ctx), ctx).map(EFloat)
    }

    /// Positional notation without an exponent.
    pub fn to_plain_string(&self) -> String {
        text::to_plain(&self.0)
    }

    /// Nearest half-precision bit pattern, ties to even.
    pub fn to_f16_bits(&self) -> u16 {
        ieee::to_f16_bits(&self.view())
    }
}

impl fmt::Display for EDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&text::to_scientific(&self.0))
    }
}

impl FromStr for EDecimal {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        text::parse_decimal(s).map(EDecimal)
    }
}
