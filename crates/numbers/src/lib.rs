//! Arbitrary-precision numeric tower: decimal ([`EDecimal`]), binary
//! ([`EFloat`]) and rational ([`ERational`]) numbers with exact comparison
//! across representations and caller-selected rounding through
//! [`PrecisionContext`].
//!
//! ```
//! use cbor_exact_numbers::{EDecimal, EFloat, ExactNumber, PrecisionContext};
//!
//! let tenth: EDecimal = "0.1".parse().unwrap();
//! assert!(EFloat::from_f64(0.1).compare_exact(&tenth).is_gt());
//!
//! let third = EDecimal::one()
//!     .divide_with(&EDecimal::from_i64(3), &PrecisionContext::decimal64())
//!     .unwrap();
//! assert_eq!(third.to_string(), "0.3333333333333333");
//! ```

#[macro_use]
mod macros;

mod context;
mod decimal;
mod digits;
mod error;
mod exact;
mod float;
mod ieee;
mod rational;
mod scaled;
mod text;

pub use context::{Flags, PrecisionContext, Rounding};
pub use decimal::EDecimal;
pub use error::NumericError;
pub use exact::ExactNumber;
pub use float::{EFloat, EXACT_DECIMAL_EXPONENT_LIMIT};
pub use rational::ERational;

/// Classification of a tower value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Finite,
    Infinity,
    QuietNaN,
    SignalingNaN,
}
