//! `JsonEncoder`: [`CborObject`] to JSON text.

use std::collections::HashSet;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use cbor_exact_buffers::Writer;
use tracing::debug;

use crate::constants::{TAG_EXPECT_BASE16, TAG_EXPECT_BASE64, TAG_EXPECT_BASE64URL};
use crate::error::CborError;
use crate::number::CborNumber;
use crate::object::{read, CborObject, Item};

const HEX: &[u8; 16] = b"0123456789abcdef";

pub(crate) struct JsonEncoder {
    pub writer: Writer,
    active: HashSet<usize>,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
            active: HashSet::new(),
        }
    }

    pub fn encode(&mut self, value: &CborObject) -> Result<Vec<u8>, CborError> {
        self.writer.reset();
        self.active.clear();
        self.write_any(value)?;
        Ok(self.writer.flush())
    }

    pub fn write_any(&mut self, value: &CborObject) -> Result<(), CborError> {
        if let Some(number) = CborNumber::from_object(value) {
            self.write_number(&number);
            return Ok(());
        }
        match &value.item {
            Item::Bytes(bytes) => self.write_bin(value.tags(), bytes),
            Item::Text(text) => self.write_str(text),
            Item::Array(_) | Item::Map(_) => self.write_container(value)?,
            Item::True => self.writer.buf(b"true"),
            Item::False => self.writer.buf(b"false"),
            _ => self.write_null(),
        }
        Ok(())
    }

    pub fn write_null(&mut self) {
        self.writer.u32(0x6e756c6c); // "null"
    }

    fn write_number(&mut self, number: &CborNumber) {
        if !number.is_finite() {
            return self.write_null();
        }
        let text = match number {
            CborNumber::Integer(value) => value.to_string(),
            CborNumber::BigInteger(value) => value.to_string(),
            CborNumber::Double(value) => shortest(*value),
            other => match other.to_edecimal() {
                Ok(decimal) if decimal.is_finite() => decimal.to_string(),
                _ => return self.write_null(),
            },
        };
        self.writer.utf8(&text);
    }

    fn write_bin(&mut self, tags: &[u64], bytes: &[u8]) {
        let text = bytes_text(tags, bytes);
        self.writer.u8(b'"');
        self.writer.utf8(&text);
        self.writer.u8(b'"');
    }

    pub fn write_str(&mut self, s: &str) {
        self.writer.ensure_capacity(s.len() + 2);
        self.writer.u8(b'"');
        let mut start = 0;
        for (i, ch) in s.char_indices() {
            let short = match ch {
                '"' => b'"',
                '\\' => b'\\',
                '\n' => b'n',
                '\r' => b'r',
                '\t' => b't',
                '\u{08}' => b'b',
                '\u{0c}' => b'f',
                '\u{00}'..='\u{1f}' | '\u{2028}' | '\u{2029}' => 0,
                _ => continue,
            };
            self.writer.utf8(&s[start..i]);
            start = i + ch.len_utf8();
            self.writer.u8(b'\\');
            if short != 0 {
                self.writer.u8(short);
                continue;
            }
            let code = ch as u32;
            self.writer.buf(b"u");
            for shift in [12, 8, 4, 0] {
                self.writer.u8(HEX[((code >> shift) & 0xf) as usize]);
            }
        }
        self.writer.utf8(&s[start..]);
        self.writer.u8(b'"');
    }

    fn write_container(&mut self, value: &CborObject) -> Result<(), CborError> {
        let Some(id) = value.container_id() else {
            return Ok(());
        };
        if !self.active.insert(id) {
            debug!(kind = ?value.kind(), "json encode found a reference cycle");
            return Err(CborError::argument("cannot encode a cyclic structure"));
        }
        let result = match &value.item {
            Item::Array(items) => {
                let items = read(items).clone();
                self.write_arr(&items)
            }
            Item::Map(entries) => {
                let entries: Vec<_> = read(entries)
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                self.write_obj(&entries)
            }
            _ => Ok(()),
        };
        self.active.remove(&id);
        result
    }

    fn write_arr(&mut self, items: &[CborObject]) -> Result<(), CborError> {
        self.writer.u8(b'[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.writer.u8(b',');
            }
            self.write_any(item)?;
        }
        self.writer.u8(b']');
        Ok(())
    }

    fn write_obj(&mut self, entries: &[(CborObject, CborObject)]) -> Result<(), CborError> {
        let mut seen = HashSet::with_capacity(entries.len());
        self.writer.u8(b'{');
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                self.writer.u8(b',');
            }
            let key = match &key.item {
                Item::Text(text) => text.clone(),
                _ => self.render_key(key)?,
            };
            if !seen.insert(key.clone()) {
                return Err(CborError::argument(format!(
                    "duplicate JSON key {key:?} after key conversion"
                )));
            }
            self.write_str(&key);
            self.writer.u8(b':');
            self.write_any(value)?;
        }
        self.writer.u8(b'}');
        Ok(())
    }

    /// JSON text of a non-string key, keeping the cycle path.
    fn render_key(&mut self, key: &CborObject) -> Result<String, CborError> {
        let outer = std::mem::replace(&mut self.writer, Writer::with_alloc_size(64));
        let result = self.write_any(key);
        let bytes = self.writer.flush();
        self.writer = outer;
        result?;
        String::from_utf8(bytes).map_err(|_| CborError::state("key rendered to invalid UTF-8"))
    }
}

/// Text form of a byte string per the outermost expected-encoding tag,
/// Base64URL without padding by default.
pub(crate) fn bytes_text(tags: &[u64], bytes: &[u8]) -> String {
    let hint = tags
        .iter()
        .copied()
        .find(|tag| matches!(*tag, TAG_EXPECT_BASE64URL | TAG_EXPECT_BASE64 | TAG_EXPECT_BASE16));
    match hint {
        Some(TAG_EXPECT_BASE64) => STANDARD.encode(bytes),
        Some(TAG_EXPECT_BASE16) => hex::encode(bytes),
        _ => URL_SAFE_NO_PAD.encode(bytes),
    }
}

/// Shortest text that parses back to `value`; integral values drop `.0`.
fn shortest(value: f64) -> String {
    let text = format!("{value:?}");
    match text.strip_suffix(".0") {
        Some(integral) => integral.to_owned(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(value: &CborObject) -> String {
        let bytes = JsonEncoder::new().encode(value).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn doubles() {
        assert_eq!(json(&CborObject::from(0.1)), "0.1");
        assert_eq!(json(&CborObject::from(2.0)), "2");
        assert_eq!(json(&CborObject::from(-0.0)), "-0");
        assert_eq!(json(&CborObject::from(1e300)), "1e300");
        assert_eq!(json(&CborObject::from(f64::NAN)), "null");
        assert_eq!(json(&CborObject::from(f64::NEG_INFINITY)), "null");
    }

    #[test]
    fn tower_numbers_render_as_numbers() {
        let decimal = CborObject::from_edecimal(&"1.25".parse().unwrap());
        assert_eq!(json(&decimal), "1.25");
        let bigfloat = CborObject::from_efloat(&cbor_exact_numbers::EFloat::create(3, -2));
        assert_eq!(json(&bigfloat), "0.75");
        let big = CborObject::from_bigint(&"18446744073709551616".parse().unwrap());
        assert_eq!(json(&big), "18446744073709551616");
        let half = CborObject::from_erational(
            &cbor_exact_numbers::ERational::create(1, 2).unwrap(),
        );
        assert_eq!(json(&half), "0.5");
    }

    #[test]
    fn byte_strings_follow_the_hint() {
        let bytes = vec![0xfb, 0xff, 0x01];
        assert_eq!(json(&CborObject::bytes(bytes.clone())), "\"-_8B\"");
        assert_eq!(json(&CborObject::bytes(bytes.clone()).with_tag(22)), "\"+/8B\"");
        assert_eq!(json(&CborObject::bytes(bytes.clone()).with_tag(23)), "\"fbff01\"");
        assert_eq!(json(&CborObject::bytes(vec![1]).with_tag(22)), "\"AQ==\"");
    }

    #[test]
    fn text_escapes() {
        let text = CborObject::from("a\"b\\c\n\u{01}\u{2028}é");
        assert_eq!(json(&text), r#""a\"b\\c\n\u0001\u2028é""#);
    }

    #[test]
    fn simple_values() {
        let array = CborObject::from(vec![
            CborObject::undefined(),
            CborObject::simple(99).unwrap(),
            CborObject::from(true),
            CborObject::null(),
        ]);
        assert_eq!(json(&array), "[null,null,true,null]");
    }

    #[test]
    fn map_keys_are_stringified() {
        let map = CborObject::new_map();
        map.set(CborObject::from(1), CborObject::from("int")).unwrap();
        map.set(CborObject::from("s"), CborObject::from(2)).unwrap();
        assert_eq!(json(&map), r#"{"1":"int","s":2}"#);

        map.set(CborObject::from("1"), CborObject::null()).unwrap();
        let err = JsonEncoder::new().encode(&map).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Argument);
    }
}
