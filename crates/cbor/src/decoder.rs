//! `CborDecoder`: binary CBOR to [`CborObject`], with tag semantics and
//! per-call reference tables.

use std::io::Read;

use cbor_exact_buffers::{ByteSource, Reader, StreamSource};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::constants::*;
use crate::error::{CborError, DecodeReason};
use crate::number;
use crate::object::{CborObject, Item};
use crate::options::DecodeOptions;
use crate::registry;

/// Longest run of items reserved up front from a declared count.
const PREALLOCATE_LIMIT: u64 = 1024;

pub(crate) struct CborDecoder<'o, S: ByteSource> {
    src: S,
    options: &'o DecodeOptions,
    depth: usize,
    /// Tag 28 slots, `None` until the shared item is complete.
    shared: Vec<Option<CborObject>>,
    /// Tag 256 namespaces, innermost last.
    namespaces: Vec<Vec<CborObject>>,
}

impl<'o, S: ByteSource> CborDecoder<'o, S> {
    pub fn new(src: S, options: &'o DecodeOptions) -> Self {
        Self {
            src,
            options,
            depth: 0,
            shared: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    /// Drops reference tables between items of a sequence.
    fn reset_references(&mut self) {
        self.shared.clear();
        self.namespaces.clear();
        self.depth = 0;
    }

    fn at_end(&mut self) -> Result<bool, CborError> {
        Ok(self.src.at_end()?)
    }

    pub fn expect_end(&mut self) -> Result<(), CborError> {
        if self.src.at_end()? {
            Ok(())
        } else {
            Err(self.fail_here(DecodeReason::TrailingBytes))
        }
    }

    fn fail_here(&self, reason: DecodeReason) -> CborError {
        CborError::decode(self.src.position(), reason)
    }

    pub fn read_sequence(&mut self) -> Result<Vec<CborObject>, CborError> {
        let mut items = Vec::new();
        while !self.at_end()? {
            self.reset_references();
            items.push(self.read_any()?);
        }
        Ok(items)
    }

    pub fn read_any(&mut self) -> Result<CborObject, CborError> {
        let offset = self.src.position();
        let initial = self.src.read_u8()?;
        if initial == BREAK {
            return Err(CborError::decode(offset, DecodeReason::UnexpectedBreak));
        }
        self.read_item(initial, offset)
    }

    fn read_item(&mut self, initial: u8, offset: usize) -> Result<CborObject, CborError> {
        match initial >> 5 {
            MAJOR_UNSIGNED => Ok(CborObject::from_item(Item::UInt(
                self.read_argument(initial, offset)?,
            ))),
            MAJOR_NEGATIVE => Ok(CborObject::from_item(Item::NInt(
                self.read_argument(initial, offset)?,
            ))),
            MAJOR_BYTES | MAJOR_TEXT => self.read_string(initial, offset),
            MAJOR_ARRAY => self.read_arr(initial, offset),
            MAJOR_MAP => self.read_obj(initial, offset),
            MAJOR_TAG => self.read_tag(initial, offset),
            _ => self.read_simple(initial, offset),
        }
    }

    /// Header argument; `None` for an indefinite length.
    fn read_length(&mut self, initial: u8, offset: usize) -> Result<Option<u64>, CborError> {
        let minor = initial & MINOR_MASK;
        Ok(Some(match minor {
            0..=23 => u64::from(minor),
            MINOR_U8 => u64::from(self.src.read_u8()?),
            MINOR_U16 => u64::from(self.src.read_u16()?),
            MINOR_U32 => u64::from(self.src.read_u32()?),
            MINOR_U64 => self.src.read_u64()?,
            MINOR_INDEFINITE => return Ok(None),
            _ => {
                return Err(CborError::decode(
                    offset,
                    DecodeReason::ReservedInitialByte(initial),
                ))
            }
        }))
    }

    fn read_argument(&mut self, initial: u8, offset: usize) -> Result<u64, CborError> {
        self.read_length(initial, offset)?
            .ok_or_else(|| CborError::decode(offset, DecodeReason::ReservedInitialByte(initial)))
    }

    fn read_exact(&mut self, length: u64) -> Result<Vec<u8>, CborError> {
        let length = usize::try_from(length)
            .map_err(|_| self.fail_here(DecodeReason::TruncatedInput))?;
        Ok(self.src.read_bytes(length)?)
    }

    fn enter(&mut self, offset: usize) -> Result<(), CborError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(CborError::decode(offset, DecodeReason::NestingTooDeep));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn read_string(&mut self, initial: u8, offset: usize) -> Result<CborObject, CborError> {
        let major = initial >> 5;
        let Some(length) = self.read_length(initial, offset)? else {
            let mut joined = Vec::new();
            loop {
                let chunk_offset = self.src.position();
                let chunk = self.src.read_u8()?;
                if chunk == BREAK {
                    break;
                }
                if chunk >> 5 != major || chunk & MINOR_MASK == MINOR_INDEFINITE {
                    return Err(CborError::decode(chunk_offset, DecodeReason::InvalidChunk));
                }
                let length = self.read_argument(chunk, chunk_offset)?;
                joined.extend(self.read_exact(length)?);
            }
            return Self::make_string(major, joined, offset);
        };
        let object = Self::make_string(major, self.read_exact(length)?, offset)?;
        self.remember_string(&object, length, offset)?;
        Ok(object)
    }

    fn make_string(major: u8, bytes: Vec<u8>, offset: usize) -> Result<CborObject, CborError> {
        if major == MAJOR_BYTES {
            return Ok(CborObject::bytes(bytes));
        }
        String::from_utf8(bytes)
            .map(CborObject::text)
            .map_err(|_| CborError::decode(offset, DecodeReason::InvalidUtf8))
    }

    fn remember_string(
        &mut self,
        object: &CborObject,
        length: u64,
        offset: usize,
    ) -> Result<(), CborError> {
        let max = self.options.max_references;
        let Some(table) = self.namespaces.last_mut() else {
            return Ok(());
        };
        if length < string_ref_threshold(table.len()) as u64 {
            return Ok(());
        }
        if table.len() >= max {
            return Err(CborError::decode(offset, DecodeReason::TooManyReferences));
        }
        table.push(object.clone());
        Ok(())
    }

    fn read_arr(&mut self, initial: u8, offset: usize) -> Result<CborObject, CborError> {
        self.enter(offset)?;
        let mut items = Vec::new();
        match self.read_length(initial, offset)? {
            Some(count) => {
                items.reserve(count.min(PREALLOCATE_LIMIT) as usize);
                for _ in 0..count {
                    items.push(self.read_any()?);
                }
            }
            None => loop {
                let item_offset = self.src.position();
                let next = self.src.read_u8()?;
                if next == BREAK {
                    break;
                }
                items.push(self.read_item(next, item_offset)?);
            },
        }
        self.leave();
        Ok(CborObject::array_from(items))
    }

    fn read_obj(&mut self, initial: u8, offset: usize) -> Result<CborObject, CborError> {
        self.enter(offset)?;
        let mut entries = IndexMap::new();
        match self.read_length(initial, offset)? {
            Some(count) => {
                entries.reserve(count.min(PREALLOCATE_LIMIT) as usize);
                for _ in 0..count {
                    let key_offset = self.src.position();
                    let key = self.read_any()?;
                    self.read_entry(&mut entries, key, key_offset)?;
                }
            }
            None => loop {
                let key_offset = self.src.position();
                let next = self.src.read_u8()?;
                if next == BREAK {
                    break;
                }
                let key = self.read_item(next, key_offset)?;
                self.read_entry(&mut entries, key, key_offset)?;
            },
        }
        self.leave();
        Ok(CborObject::map_from_index(entries))
    }

    fn read_entry(
        &mut self,
        entries: &mut IndexMap<CborObject, CborObject>,
        key: CborObject,
        key_offset: usize,
    ) -> Result<(), CborError> {
        let value = self.read_any()?;
        if entries.insert(key, value).is_some() && !self.options.allow_duplicate_keys {
            return Err(CborError::decode(key_offset, DecodeReason::DuplicateKey));
        }
        Ok(())
    }

    fn read_tag(&mut self, initial: u8, offset: usize) -> Result<CborObject, CborError> {
        let tag = self.read_argument(initial, offset)?;
        self.enter(offset)?;
        let object = match tag {
            TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM => {
                let payload_offset = self.src.position();
                let payload = self.src.read_u8()?;
                if payload >> 5 != MAJOR_BYTES || payload & MINOR_MASK == MINOR_INDEFINITE {
                    return Err(CborError::decode(
                        payload_offset,
                        DecodeReason::InvalidTagPayload(tag),
                    ));
                }
                self.read_item(payload, payload_offset)?.with_tag(tag)
            }
            TAG_SHAREABLE if self.options.resolve_references => self.read_shareable(offset)?,
            TAG_SHARED_REF if self.options.resolve_references => {
                let index = self.read_index(tag)?;
                self.shared
                    .get(index)
                    .cloned()
                    .flatten()
                    .ok_or_else(|| CborError::decode(offset, DecodeReason::BadReference))?
            }
            TAG_STRING_REF_NAMESPACE if self.options.resolve_references => {
                self.namespaces.push(Vec::new());
                let item = self.read_any();
                self.namespaces.pop();
                item?
            }
            TAG_STRING_REF if self.options.resolve_references => {
                let index = self.read_index(tag)?;
                self.namespaces
                    .last()
                    .and_then(|table| table.get(index))
                    .cloned()
                    .ok_or_else(|| CborError::decode(offset, DecodeReason::BadReference))?
            }
            _ => {
                let inner = self.read_any()?;
                if !Self::payload_fits(tag, &inner) {
                    return Err(CborError::decode(offset, DecodeReason::InvalidTagPayload(tag)));
                }
                let object = inner.with_tag(tag);
                if let Some(handler) = registry::tag_handler(tag) {
                    trace!(tag, offset, "running cbor tag handler");
                    handler.validate(&object).map_err(|message| {
                        CborError::decode(offset, DecodeReason::RejectedByHandler { tag, message })
                    })?;
                }
                object
            }
        };
        self.leave();
        Ok(object)
    }

    fn read_shareable(&mut self, offset: usize) -> Result<CborObject, CborError> {
        if self.shared.len() >= self.options.max_references {
            return Err(CborError::decode(offset, DecodeReason::TooManyReferences));
        }
        let slot = self.shared.len();
        self.shared.push(None);
        let item = self.read_any()?;
        self.shared[slot] = Some(item.clone());
        Ok(item)
    }

    /// Untagged unsigned integer payload of a reference tag.
    fn read_index(&mut self, tag: u64) -> Result<usize, CborError> {
        let offset = self.src.position();
        let payload = self.read_any()?;
        match &payload.item {
            Item::UInt(index) if !payload.is_tagged() => {
                Ok(usize::try_from(*index).unwrap_or(usize::MAX))
            }
            _ => Err(CborError::decode(offset, DecodeReason::InvalidTagPayload(tag))),
        }
    }

    fn payload_fits(tag: u64, inner: &CborObject) -> bool {
        match tag {
            TAG_DECIMAL_FRACTION
            | TAG_BIGFLOAT
            | TAG_EXTENDED_DECIMAL
            | TAG_EXTENDED_BIGFLOAT
            | TAG_RATIONAL => !inner.is_tagged() && number::interpret(tag, &inner.item).is_some(),
            TAG_UUID => !inner.is_tagged() && matches!(&inner.item, Item::Bytes(b) if b.len() == 16),
            _ => true,
        }
    }

    fn read_simple(&mut self, initial: u8, offset: usize) -> Result<CborObject, CborError> {
        let minor = initial & MINOR_MASK;
        let item = match minor {
            SIMPLE_FALSE => Item::False,
            SIMPLE_TRUE => Item::True,
            SIMPLE_NULL => Item::Null,
            SIMPLE_UNDEFINED => Item::Undefined,
            0..=19 => Item::Simple(minor),
            MINOR_U8 => {
                let value = self.src.read_u8()?;
                if value < 32 {
                    return Err(CborError::decode(offset, DecodeReason::InvalidSimpleValue(value)));
                }
                Item::Simple(value)
            }
            MINOR_U16 => Item::Double(half_to_f64(self.src.read_u16()?)),
            MINOR_U32 => Item::Double(single_to_f64(self.src.read_u32()?)),
            MINOR_U64 => Item::Double(f64::from_bits(self.src.read_u64()?)),
            MINOR_INDEFINITE => {
                return Err(CborError::decode(offset, DecodeReason::UnexpectedBreak))
            }
            _ => {
                return Err(CborError::decode(
                    offset,
                    DecodeReason::ReservedInitialByte(initial),
                ))
            }
        };
        Ok(CborObject::from_item(item))
    }
}

fn logged<T>(result: Result<T, CborError>) -> Result<T, CborError> {
    if let Err(CborError::Decode { offset, reason }) = &result {
        debug!(offset, %reason, "cbor decode failed");
    }
    result
}

impl CborObject {
    /// Decodes exactly one item; trailing bytes are an error.
    pub fn decode(bytes: &[u8]) -> Result<CborObject, CborError> {
        Self::decode_with(bytes, &DecodeOptions::default())
    }

    pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<CborObject, CborError> {
        let mut decoder = CborDecoder::new(Reader::new(bytes), options);
        logged(decoder.read_any().and_then(|object| {
            decoder.expect_end()?;
            Ok(object)
        }))
    }

    /// Reads one item from a stream, consuming only the bytes it occupies.
    pub fn read_from<R: Read>(reader: R) -> Result<CborObject, CborError> {
        Self::read_from_with(reader, &DecodeOptions::default())
    }

    pub fn read_from_with<R: Read>(
        reader: R,
        options: &DecodeOptions,
    ) -> Result<CborObject, CborError> {
        let mut decoder = CborDecoder::new(StreamSource::new(reader), options);
        logged(decoder.read_any())
    }

    /// Decodes a CBOR sequence (RFC 8742): zero or more concatenated items,
    /// each with its own reference tables.
    pub fn decode_sequence(bytes: &[u8]) -> Result<Vec<CborObject>, CborError> {
        Self::decode_sequence_with(bytes, &DecodeOptions::default())
    }

    pub fn decode_sequence_with(
        bytes: &[u8],
        options: &DecodeOptions,
    ) -> Result<Vec<CborObject>, CborError> {
        let mut decoder = CborDecoder::new(Reader::new(bytes), options);
        logged(decoder.read_sequence())
    }
}
