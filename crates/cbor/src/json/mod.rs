//! JSON bridge: strict parsing into [`CborObject`] and rendering back.

mod decoder;
mod encoder;

use std::io::{Read, Write};

use tracing::debug;

use crate::error::{CborError, DecodeReason};
use crate::object::CborObject;
use crate::options::JsonOptions;

use decoder::JsonDecoder;
pub(crate) use encoder::bytes_text;
use encoder::JsonEncoder;

impl CborObject {
    /// Parses one JSON document with default options.
    ///
    /// ```
    /// use cbor_exact::CborObject;
    ///
    /// let value = CborObject::from_json_str(r#"{"price": 0.1}"#).unwrap();
    /// let price = value.get_key(&"price".into()).unwrap().unwrap();
    /// assert_eq!(price.as_edecimal().unwrap().to_string(), "0.1");
    /// ```
    pub fn from_json_str(text: &str) -> Result<CborObject, CborError> {
        Self::from_json_bytes(text.as_bytes(), &JsonOptions::default())
    }

    pub fn from_json_str_with(text: &str, options: &JsonOptions) -> Result<CborObject, CborError> {
        Self::from_json_bytes(text.as_bytes(), options)
    }

    /// Parses UTF-8 JSON bytes.
    pub fn from_json_bytes(bytes: &[u8], options: &JsonOptions) -> Result<CborObject, CborError> {
        let result = JsonDecoder::new(bytes, options).decode();
        if let Err(CborError::Decode { offset, reason }) = &result {
            debug!(offset, %reason, "json parse failed");
        }
        result
    }

    /// Reads a whole stream and parses it as one JSON document.
    pub fn read_json<R: Read>(mut reader: R, options: &JsonOptions) -> Result<CborObject, CborError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|err| CborError::decode(bytes.len(), DecodeReason::Io(err.to_string())))?;
        Self::from_json_bytes(&bytes, options)
    }

    /// Renders as JSON text.
    pub fn to_json_string(&self) -> Result<String, CborError> {
        let bytes = JsonEncoder::new().encode(self)?;
        String::from_utf8(bytes).map_err(|_| CborError::state("JSON output is not UTF-8"))
    }

    pub fn write_json<W: Write>(&self, mut out: W) -> Result<(), CborError> {
        let bytes = JsonEncoder::new().encode(self)?;
        out.write_all(&bytes)?;
        Ok(())
    }
}
