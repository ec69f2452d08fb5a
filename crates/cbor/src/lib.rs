//! CBOR (RFC 8949) value model and codec with exact numeric semantics.
//!
//! - [`CborObject`]: tagged value with shared, mutable arrays and maps.
//! - Binary codec: [`CborObject::decode`], [`CborObject::to_bytes`] and
//!   their stream and option variants, including bignums, decimal
//!   fractions, bigfloats, rationals, shared values and string references.
//! - JSON bridge: [`CborObject::from_json_str`] keeps numbers exact,
//!   [`CborObject::to_json_string`] renders them back.
//! - [`compare`]: a canonical total order across all kinds.
//! - Numbers: [`CborNumber`] and the tower re-exported from
//!   `cbor-exact-numbers`.
//!
//! ```
//! use cbor_exact::{CborObject, EDecimal};
//!
//! let value = CborObject::from_json_str("[0.1, 7]").unwrap();
//! let bytes = value.to_bytes().unwrap();
//! let back = CborObject::decode(&bytes).unwrap();
//! assert_eq!(back, value);
//! let tenth: EDecimal = "0.1".parse().unwrap();
//! assert_eq!(back.get(0).unwrap().as_edecimal().unwrap(), tenth);
//! assert_eq!(back.to_json_string().unwrap(), "[0.1,7]");
//! ```

mod accessors;
mod compare;
mod constants;
mod convert;
mod decoder;
mod encoder;
mod error;
mod json;
mod number;
mod object;
mod options;
mod registry;

pub use compare::compare;
pub use error::{CborError, DecodeReason, ErrorKind};
pub use number::CborNumber;
pub use object::{CborObject, CborType};
pub use options::{DecodeOptions, EncodeOptions, FloatWidth, JsonOptions, NumberMode};
pub use registry::{register_converter, register_tag_handler, TagHandler};

pub use cbor_exact_numbers::{
    EDecimal, EFloat, ERational, ExactNumber, Flags, NumberKind, NumericError, PrecisionContext,
    Rounding,
};
