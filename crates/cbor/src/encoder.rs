//! `CborEncoder`: [`CborObject`] to binary CBOR with minimal headers.

use std::collections::HashSet;
use std::io::Write;

use cbor_exact_buffers::Writer;
use tracing::debug;

use crate::constants::*;
use crate::error::CborError;
use crate::object::{read, CborObject, Item};
use crate::options::{EncodeOptions, FloatWidth};

pub(crate) struct CborEncoder<'o> {
    pub writer: Writer,
    options: &'o EncodeOptions,
    /// Containers on the current traversal path.
    active: HashSet<usize>,
}

impl<'o> CborEncoder<'o> {
    pub fn new(options: &'o EncodeOptions) -> Self {
        Self {
            writer: Writer::new(),
            options,
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
        for &tag in value.tags() {
            self.write_header(OVERLAY_TAG, tag);
        }
        match &value.item {
            Item::UInt(n) => self.write_header(OVERLAY_UIN, *n),
            Item::NInt(n) => self.write_header(OVERLAY_NIN, *n),
            Item::Bytes(bytes) => self.write_bin(bytes),
            Item::Text(text) => self.write_str(text),
            Item::Array(_) | Item::Map(_) => self.write_container(value)?,
            Item::Simple(n) => self.write_simple(*n),
            Item::False => self.writer.u8(OVERLAY_SIMPLE | SIMPLE_FALSE),
            Item::True => self.writer.u8(OVERLAY_SIMPLE | SIMPLE_TRUE),
            Item::Null => self.writer.u8(OVERLAY_SIMPLE | SIMPLE_NULL),
            Item::Undefined => self.writer.u8(OVERLAY_SIMPLE | SIMPLE_UNDEFINED),
            Item::Double(float) => self.write_float(*float),
        }
        Ok(())
    }

    /// Initial byte plus the shortest argument holding `value`.
    pub fn write_header(&mut self, overlay: u8, value: u64) {
        let w = &mut self.writer;
        match value {
            0..=23 => w.u8(overlay | value as u8),
            24..=0xff => {
                w.u8(overlay | MINOR_U8);
                w.u8(value as u8);
            }
            0x100..=0xffff => w.u8u16(overlay | MINOR_U16, value as u16),
            0x1_0000..=0xffff_ffff => w.u8u32(overlay | MINOR_U32, value as u32),
            _ => w.u8u64(overlay | MINOR_U64, value),
        }
    }

    pub fn write_bin(&mut self, buf: &[u8]) {
        self.write_header(OVERLAY_BIN, buf.len() as u64);
        self.writer.buf(buf);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_header(OVERLAY_STR, s.len() as u64);
        self.writer.utf8(s);
    }

    fn write_simple(&mut self, value: u8) {
        if value < 24 {
            self.writer.u8(OVERLAY_SIMPLE | value);
        } else {
            self.writer.u8(OVERLAY_SIMPLE | MINOR_U8);
            self.writer.u8(value);
        }
    }

    pub fn write_float(&mut self, float: f64) {
        if self.options.float_width == FloatWidth::Shortest {
            if let Some(bits) = f64_to_half_exact(float) {
                return self.writer.u8u16(FLOAT_HALF, bits);
            }
            if let Some(bits) = f64_to_single_exact(float) {
                return self.writer.u8u32(FLOAT_SINGLE, bits);
            }
        }
        self.writer.u8u64(FLOAT_DOUBLE, float.to_bits());
    }

    fn write_container(&mut self, value: &CborObject) -> Result<(), CborError> {
        let Some(id) = value.container_id() else {
            return Ok(());
        };
        if !self.active.insert(id) {
            debug!(kind = ?value.kind(), "cbor encode found a reference cycle");
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
        self.write_header(OVERLAY_ARR, items.len() as u64);
        for item in items {
            self.write_any(item)?;
        }
        Ok(())
    }

    fn write_obj(&mut self, entries: &[(CborObject, CborObject)]) -> Result<(), CborError> {
        self.write_header(OVERLAY_MAP, entries.len() as u64);
        if !self.options.canonical {
            for (key, value) in entries {
                self.write_any(key)?;
                self.write_any(value)?;
            }
            return Ok(());
        }
        let mut keyed = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            keyed.push((self.encode_detached(key)?, value));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in keyed {
            self.writer.buf(&key);
            self.write_any(value)?;
        }
        Ok(())
    }

    /// Encodes `value` on its own, keeping the cycle path.
    fn encode_detached(&mut self, value: &CborObject) -> Result<Vec<u8>, CborError> {
        let outer = std::mem::replace(&mut self.writer, Writer::with_alloc_size(64));
        let result = self.write_any(value);
        let bytes = self.writer.flush();
        self.writer = outer;
        result.map(|()| bytes)
    }
}

impl CborObject {
    /// Encodes with default options: shortest floats, insertion-ordered maps.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CborError> {
        self.to_bytes_with(&EncodeOptions::default())
    }

    pub fn to_bytes_with(&self, options: &EncodeOptions) -> Result<Vec<u8>, CborError> {
        CborEncoder::new(options).encode(self)
    }

    /// Encodes and writes the whole item to `out`.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<(), CborError> {
        let bytes = self.to_bytes()?;
        out.write_all(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use hex_literal::hex;

    #[test]
    fn minimal_integer_headers() {
        for (value, expected) in [
            (0i64, &hex!("00")[..]),
            (23, &hex!("17")[..]),
            (24, &hex!("1818")[..]),
            (255, &hex!("18ff")[..]),
            (256, &hex!("190100")[..]),
            (65536, &hex!("1a00010000")[..]),
            (4294967296, &hex!("1b0000000100000000")[..]),
            (-1, &hex!("20")[..]),
            (-25, &hex!("3818")[..]),
            (i64::MIN, &hex!("3b7fffffffffffffff")[..]),
        ] {
            assert_eq!(CborObject::from(value).to_bytes().unwrap(), expected, "{value}");
        }
    }

    #[test]
    fn header_widths_switch_at_boundaries() {
        let options = EncodeOptions::default();
        let mut encoder = CborEncoder::new(&options);
        for (overlay, value, expected) in [
            (OVERLAY_BIN, 23u64, &hex!("57")[..]),
            (OVERLAY_BIN, 24, &hex!("5818")[..]),
            (OVERLAY_ARR, 255, &hex!("98ff")[..]),
            (OVERLAY_ARR, 256, &hex!("990100")[..]),
            (OVERLAY_MAP, 65535, &hex!("b9ffff")[..]),
            (OVERLAY_MAP, 65536, &hex!("ba00010000")[..]),
            (OVERLAY_TAG, 0xffff_ffff, &hex!("daffffffff")[..]),
            (OVERLAY_TAG, 1 << 32, &hex!("db0000000100000000")[..]),
            (OVERLAY_UIN, u64::MAX, &hex!("1bffffffffffffffff")[..]),
        ] {
            encoder.write_header(overlay, value);
            assert_eq!(encoder.writer.flush(), expected, "{overlay:#x} {value}");
        }
    }

    #[test]
    fn floats_pick_the_shortest_exact_width() {
        assert_eq!(CborObject::from(1.5).to_bytes().unwrap(), hex!("f93e00"));
        assert_eq!(CborObject::from(100000.0).to_bytes().unwrap(), hex!("fa47c35000"));
        assert_eq!(CborObject::from(1.1).to_bytes().unwrap(), hex!("fb3ff199999999999a"));
        assert_eq!(CborObject::from(f64::NAN).to_bytes().unwrap(), hex!("f97e00"));
        assert_eq!(CborObject::from(-0.0).to_bytes().unwrap(), hex!("f98000"));
        let wide = EncodeOptions::default().with_float_width(FloatWidth::Double);
        assert_eq!(
            CborObject::from(1.5).to_bytes_with(&wide).unwrap(),
            hex!("fb3ff8000000000000")
        );
    }

    #[test]
    fn strings_tags_and_simple_values() {
        assert_eq!(CborObject::from("IETF").to_bytes().unwrap(), hex!("6449455446"));
        assert_eq!(CborObject::bytes(vec![1, 2]).to_bytes().unwrap(), hex!("420102"));
        assert_eq!(
            CborObject::from(1).with_tag(1).with_tag(55799).to_bytes().unwrap(),
            hex!("d9d9f7c101")
        );
        assert_eq!(CborObject::simple(255).unwrap().to_bytes().unwrap(), hex!("f8ff"));
        assert_eq!(CborObject::simple(16).unwrap().to_bytes().unwrap(), hex!("f0"));
        assert_eq!(CborObject::undefined().to_bytes().unwrap(), hex!("f7"));
    }

    #[test]
    fn canonical_maps_sort_by_encoded_key() {
        let map = CborObject::new_map();
        map.set(CborObject::from("aa"), CborObject::from(1)).unwrap();
        map.set(CborObject::from(100), CborObject::from(2)).unwrap();
        map.set(CborObject::from(-1), CborObject::from(3)).unwrap();
        map.set(CborObject::from(10), CborObject::from(4)).unwrap();
        assert_eq!(map.to_bytes().unwrap(), hex!("a46261610118640220030a04"));
        let canonical = EncodeOptions::default().with_canonical(true);
        assert_eq!(
            map.to_bytes_with(&canonical).unwrap(),
            hex!("a40a04186402200362616101")
        );
    }

    #[test]
    fn cycles_are_rejected() {
        let array = CborObject::new_array();
        array.add(CborObject::from(1)).unwrap();
        array.add(array.clone()).unwrap();
        let err = array.to_bytes().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);

        let map = CborObject::new_map();
        map.set(CborObject::from("self"), map.clone()).unwrap();
        assert_eq!(map.to_bytes().unwrap_err().kind(), ErrorKind::Argument);
    }

    #[test]
    fn repeated_handles_are_not_cycles() {
        let shared = CborObject::array_from(vec![CborObject::from(1)]);
        let outer = CborObject::array_from(vec![shared.clone(), shared]);
        assert_eq!(outer.to_bytes().unwrap(), hex!("82810181 01"));
    }

    #[test]
    fn write_to_streams_the_encoding() {
        let mut out = Vec::new();
        CborObject::from(vec![CborObject::from(true)]).write_to(&mut out).unwrap();
        assert_eq!(out, hex!("81f5"));
    }
}
