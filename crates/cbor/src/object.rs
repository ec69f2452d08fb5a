//! The tagged CBOR value model.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cbor_exact_numbers::{EDecimal, EFloat, ERational};
use indexmap::map::raw_entry_v1::RawEntryMut;
use indexmap::map::RawEntryApiV1;
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive};

use crate::constants::*;
use crate::error::CborError;

pub(crate) type ArrayHandle = Arc<RwLock<Vec<CborObject>>>;
pub(crate) type MapHandle = Arc<RwLock<IndexMap<CborObject, CborObject>>>;

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn handle_id<T>(handle: &Arc<RwLock<T>>) -> usize {
    Arc::as_ptr(handle) as *const () as usize
}

#[derive(Clone)]
pub(crate) enum Item {
    UInt(u64),
    /// `-1 - n`.
    NInt(u64),
    Bytes(Vec<u8>),
    Text(String),
    Array(ArrayHandle),
    Map(MapHandle),
    Simple(u8),
    False,
    True,
    Null,
    Undefined,
    Double(f64),
}

/// Wire-level kind of a [`CborObject`], ignoring tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CborType {
    UnsignedInteger,
    NegativeInteger,
    ByteString,
    TextString,
    Array,
    Map,
    Boolean,
    /// Null, undefined and unassigned simple values.
    SimpleValue,
    FloatingPoint,
}

/// A CBOR data item with its tags, outermost first.
///
/// Arrays and maps are shared handles: cloning a container clones the
/// handle, and mutation through any clone is visible through all of them.
///
/// ```
/// use cbor_exact::CborObject;
///
/// let list = CborObject::new_array();
/// list.add(CborObject::from(1)).unwrap().add(CborObject::from("two")).unwrap();
/// let alias = list.clone();
/// alias.add(CborObject::null()).unwrap();
/// assert_eq!(list.len().unwrap(), 3);
/// assert!(CborObject::ptr_eq(&list, &alias));
/// ```
#[derive(Clone)]
pub struct CborObject {
    pub(crate) tags: Vec<u64>,
    pub(crate) item: Item,
}

impl CborObject {
    pub(crate) fn from_item(item: Item) -> Self {
        Self {
            tags: Vec::new(),
            item,
        }
    }

    pub fn null() -> Self {
        Self::from_item(Item::Null)
    }

    pub fn undefined() -> Self {
        Self::from_item(Item::Undefined)
    }

    pub fn boolean(value: bool) -> Self {
        Self::from_item(if value { Item::True } else { Item::False })
    }

    /// Simple value by number. 20 to 23 give the named values; 24 to 31 are
    /// not simple values.
    pub fn simple(value: u8) -> Result<Self, CborError> {
        let item = match value {
            SIMPLE_FALSE => Item::False,
            SIMPLE_TRUE => Item::True,
            SIMPLE_NULL => Item::Null,
            SIMPLE_UNDEFINED => Item::Undefined,
            24..=31 => {
                return Err(CborError::argument(format!("{value} is not a simple value")))
            }
            _ => Item::Simple(value),
        };
        Ok(Self::from_item(item))
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_item(Item::UInt(value))
    }

    pub fn from_i64(value: i64) -> Self {
        if value >= 0 {
            Self::from_item(Item::UInt(value as u64))
        } else {
            Self::from_item(Item::NInt((-1i64).wrapping_sub(value) as u64))
        }
    }

    pub fn from_f64(value: f64) -> Self {
        Self::from_item(Item::Double(value))
    }

    pub fn from_f32(value: f32) -> Self {
        Self::from_item(Item::Double(single_to_f64(value.to_bits())))
    }

    /// Plain integer when it fits the 64-bit argument, otherwise a tag 2/3
    /// bignum.
    pub fn from_bigint(value: &BigInt) -> Self {
        if let Some(value) = value.to_u64() {
            return Self::from_u64(value);
        }
        if value.is_negative() {
            let magnitude = -value - BigInt::one();
            match magnitude.to_u64() {
                Some(n) => Self::from_item(Item::NInt(n)),
                None => Self::bytes(magnitude.magnitude().to_bytes_be()).with_tag(TAG_NEGATIVE_BIGNUM),
            }
        } else {
            Self::bytes(value.magnitude().to_bytes_be()).with_tag(TAG_POSITIVE_BIGNUM)
        }
    }

    /// Tag 4 decimal fraction (tag 264 when the exponent needs a bignum).
    /// Non-finite values and negative zero become doubles.
    pub fn from_edecimal(value: &EDecimal) -> Self {
        if !value.is_finite() || (value.is_zero() && value.is_negative()) {
            return Self::from_f64(value.to_f64());
        }
        Self::scaled(
            TAG_DECIMAL_FRACTION,
            TAG_EXTENDED_DECIMAL,
            value.exponent(),
            &value.mantissa(),
        )
    }

    /// Tag 5 bigfloat (tag 265 when the exponent needs a bignum).
    /// Non-finite values and negative zero become doubles.
    pub fn from_efloat(value: &EFloat) -> Self {
        if !value.is_finite() || (value.is_zero() && value.is_negative()) {
            return Self::from_f64(value.to_f64());
        }
        Self::scaled(TAG_BIGFLOAT, TAG_EXTENDED_BIGFLOAT, value.exponent(), &value.mantissa())
    }

    /// Tag 30 rational; non-finite values become doubles.
    pub fn from_erational(value: &ERational) -> Self {
        if !value.is_finite() || (value.is_zero() && value.is_negative()) {
            return Self::from_f64(value.to_f64());
        }
        let denominator = BigInt::from(value.denominator().clone());
        Self::array_from(vec![
            Self::from_bigint(&value.numerator()),
            Self::from_bigint(&denominator),
        ])
        .with_tag(TAG_RATIONAL)
    }

    fn scaled(tag: u64, extended_tag: u64, exponent: &BigInt, mantissa: &BigInt) -> Self {
        let exponent = Self::from_bigint(exponent);
        let tag = if exponent.is_tagged() { extended_tag } else { tag };
        Self::array_from(vec![exponent, Self::from_bigint(mantissa)]).with_tag(tag)
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::from_item(Item::Bytes(value.into()))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::from_item(Item::Text(value.into()))
    }

    pub fn new_array() -> Self {
        Self::array_from(Vec::new())
    }

    pub fn array_from(items: Vec<CborObject>) -> Self {
        Self::from_item(Item::Array(Arc::new(RwLock::new(items))))
    }

    pub fn new_map() -> Self {
        Self::from_item(Item::Map(Arc::new(RwLock::new(IndexMap::new()))))
    }

    /// Map from pairs; a later duplicate key replaces the earlier value.
    pub fn map_from(entries: impl IntoIterator<Item = (CborObject, CborObject)>) -> Self {
        Self::from_item(Item::Map(Arc::new(RwLock::new(entries.into_iter().collect()))))
    }

    pub(crate) fn map_from_index(entries: IndexMap<CborObject, CborObject>) -> Self {
        Self::from_item(Item::Map(Arc::new(RwLock::new(entries))))
    }

    pub fn kind(&self) -> CborType {
        match self.item {
            Item::UInt(_) => CborType::UnsignedInteger,
            Item::NInt(_) => CborType::NegativeInteger,
            Item::Bytes(_) => CborType::ByteString,
            Item::Text(_) => CborType::TextString,
            Item::Array(_) => CborType::Array,
            Item::Map(_) => CborType::Map,
            Item::True | Item::False => CborType::Boolean,
            Item::Simple(_) | Item::Null | Item::Undefined => CborType::SimpleValue,
            Item::Double(_) => CborType::FloatingPoint,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.item, Item::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.item, Item::Undefined)
    }

    pub fn is_true(&self) -> bool {
        matches!(self.item, Item::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self.item, Item::False)
    }

    // Tags

    pub fn tags(&self) -> &[u64] {
        &self.tags
    }

    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn has_tag(&self, tag: u64) -> bool {
        self.tags.contains(&tag)
    }

    pub fn most_outer_tag(&self) -> Option<u64> {
        self.tags.first().copied()
    }

    pub fn most_inner_tag(&self) -> Option<u64> {
        self.tags.last().copied()
    }

    /// Adds `tag` outside any existing tags.
    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tags.insert(0, tag);
        self
    }

    /// The same item without tags; containers stay shared.
    pub fn untagged(&self) -> Self {
        Self::from_item(self.item.clone())
    }

    // Identity

    /// `true` when both values are the same array or map.
    pub fn ptr_eq(a: &CborObject, b: &CborObject) -> bool {
        match (&a.item, &b.item) {
            (Item::Array(x), Item::Array(y)) => Arc::ptr_eq(x, y),
            (Item::Map(x), Item::Map(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }

    pub(crate) fn container_id(&self) -> Option<usize> {
        match &self.item {
            Item::Array(items) => Some(handle_id(items)),
            Item::Map(entries) => Some(handle_id(entries)),
            _ => None,
        }
    }

    // Container access

    fn not_a_container(&self, operation: &str) -> CborError {
        CborError::state(format!("{operation} is not supported on {:?}", self.kind()))
    }

    /// Number of array items or map entries.
    pub fn len(&self) -> Result<usize, CborError> {
        match &self.item {
            Item::Array(items) => Ok(read(items).len()),
            Item::Map(entries) => Ok(read(entries).len()),
            _ => Err(self.not_a_container("len")),
        }
    }

    pub fn is_empty(&self) -> Result<bool, CborError> {
        self.len().map(|len| len == 0)
    }

    pub fn get(&self, index: usize) -> Result<CborObject, CborError> {
        match &self.item {
            Item::Array(items) => read(items).get(index).cloned().ok_or_else(|| {
                CborError::argument(format!("index {index} out of range"))
            }),
            _ => Err(self.not_a_container("get")),
        }
    }

    pub fn get_key(&self, key: &CborObject) -> Result<Option<CborObject>, CborError> {
        match &self.item {
            Item::Map(entries) => {
                let map = read(entries);
                let index = Equality::holding(Held::Map(handle_id(entries), &map)).find(&map, key);
                Ok(index.map(|index| map[index].clone()))
            }
            _ => Err(self.not_a_container("get_key")),
        }
    }

    pub fn contains_key(&self, key: &CborObject) -> Result<bool, CborError> {
        match &self.item {
            Item::Map(entries) => {
                let map = read(entries);
                let held = Held::Map(handle_id(entries), &map);
                Ok(Equality::holding(held).find(&map, key).is_some())
            }
            _ => Err(self.not_a_container("contains_key")),
        }
    }

    pub fn keys(&self) -> Result<Vec<CborObject>, CborError> {
        match &self.item {
            Item::Map(entries) => Ok(read(entries).keys().cloned().collect()),
            _ => Err(self.not_a_container("keys")),
        }
    }

    /// Map values, or array items.
    pub fn values(&self) -> Result<Vec<CborObject>, CborError> {
        match &self.item {
            Item::Array(items) => Ok(read(items).clone()),
            Item::Map(entries) => Ok(read(entries).values().cloned().collect()),
            _ => Err(self.not_a_container("values")),
        }
    }

    pub fn entries(&self) -> Result<Vec<(CborObject, CborObject)>, CborError> {
        match &self.item {
            Item::Map(entries) => Ok(read(entries)
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            _ => Err(self.not_a_container("entries")),
        }
    }

    /// Array items.
    pub fn items(&self) -> Result<Vec<CborObject>, CborError> {
        match &self.item {
            Item::Array(items) => Ok(read(items).clone()),
            _ => Err(self.not_a_container("items")),
        }
    }

    // Container mutation

    /// Appends to an array.
    pub fn add(&self, value: impl Into<Option<CborObject>>) -> Result<&Self, CborError> {
        let Item::Array(items) = &self.item else {
            return Err(self.not_a_container("add"));
        };
        let value = value.into().ok_or(CborError::NullArgument("value"))?;
        write(items).push(value);
        Ok(self)
    }

    /// Inserts into an array at `index` (at most the current length).
    pub fn insert(
        &self,
        index: usize,
        value: impl Into<Option<CborObject>>,
    ) -> Result<&Self, CborError> {
        let Item::Array(items) = &self.item else {
            return Err(self.not_a_container("insert"));
        };
        let value = value.into().ok_or(CborError::NullArgument("value"))?;
        let mut items = write(items);
        if index > items.len() {
            return Err(CborError::argument(format!("index {index} out of range")));
        }
        items.insert(index, value);
        Ok(self)
    }

    /// Replaces an array item.
    pub fn set_at(
        &self,
        index: usize,
        value: impl Into<Option<CborObject>>,
    ) -> Result<&Self, CborError> {
        let Item::Array(items) = &self.item else {
            return Err(self.not_a_container("set_at"));
        };
        let value = value.into().ok_or(CborError::NullArgument("value"))?;
        let mut items = write(items);
        let slot = items
            .get_mut(index)
            .ok_or_else(|| CborError::argument(format!("index {index} out of range")))?;
        *slot = value;
        Ok(self)
    }

    /// Inserts or replaces a map entry; a replaced key keeps its position.
    pub fn set(
        &self,
        key: impl Into<Option<CborObject>>,
        value: impl Into<Option<CborObject>>,
    ) -> Result<&Self, CborError> {
        let Item::Map(entries) = &self.item else {
            return Err(self.not_a_container("set"));
        };
        let key = key.into().ok_or(CborError::NullArgument("key"))?;
        let value = value.into().ok_or(CborError::NullArgument("value"))?;
        let mut map = write(entries);
        let found = Equality::holding(Held::Map(handle_id(entries), &map)).find(&map, &key);
        if let Some(index) = found {
            map[index] = value;
            return Ok(self);
        }
        // Key equality was settled above; append without comparing again.
        let hash = map.hasher().hash_one(&key);
        if let RawEntryMut::Vacant(slot) = map.raw_entry_mut_v1().from_hash(hash, |_| false) {
            slot.insert(key, value);
        }
        Ok(self)
    }

    /// Removes a map key, or the first equal array item. Returns whether
    /// anything was removed.
    pub fn remove(&self, key: &CborObject) -> Result<bool, CborError> {
        match &self.item {
            Item::Map(entries) => {
                let mut map = write(entries);
                let found = Equality::holding(Held::Map(handle_id(entries), &map)).find(&map, key);
                Ok(found.and_then(|index| map.shift_remove_index(index)).is_some())
            }
            Item::Array(handle) => {
                let mut items = write(handle);
                let found = {
                    let mut equality = Equality::holding(Held::Array(handle_id(handle), &items));
                    items.iter().position(|item| equality.objects(item, key))
                };
                match found {
                    Some(index) => {
                        items.remove(index);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            _ => Err(self.not_a_container("remove")),
        }
    }

    pub fn remove_at(&self, index: usize) -> Result<CborObject, CborError> {
        let Item::Array(items) = &self.item else {
            return Err(self.not_a_container("remove_at"));
        };
        let mut items = write(items);
        if index >= items.len() {
            return Err(CborError::argument(format!("index {index} out of range")));
        }
        Ok(items.remove(index))
    }

    pub fn clear(&self) -> Result<(), CborError> {
        match &self.item {
            Item::Array(items) => write(items).clear(),
            Item::Map(entries) => write(entries).clear(),
            _ => return Err(self.not_a_container("clear")),
        }
        Ok(())
    }

    // Diagnostic notation

    fn write_diagnostic(&self, f: &mut fmt::Formatter<'_>, path: &mut Vec<usize>) -> fmt::Result {
        for tag in &self.tags {
            write!(f, "{tag}(")?;
        }
        if let Some(id) = self.container_id() {
            if path.contains(&id) {
                f.write_str("<cycle>")?;
                return self.close_tags(f);
            }
            path.push(id);
        }
        match &self.item {
            Item::UInt(value) => write!(f, "{value}")?,
            Item::NInt(value) => write!(f, "{}", -1 - i128::from(*value))?,
            Item::Bytes(bytes) => write!(f, "h'{}'", hex::encode(bytes))?,
            Item::Text(text) => write!(f, "{text:?}")?,
            Item::Array(items) => {
                f.write_str("[")?;
                for (i, item) in read(items).iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.write_diagnostic(f, path)?;
                }
                f.write_str("]")?;
            }
            Item::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in read(entries).iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    key.write_diagnostic(f, path)?;
                    f.write_str(": ")?;
                    value.write_diagnostic(f, path)?;
                }
                f.write_str("}")?;
            }
            Item::Simple(value) => write!(f, "simple({value})")?,
            Item::False => f.write_str("false")?,
            Item::True => f.write_str("true")?,
            Item::Null => f.write_str("null")?,
            Item::Undefined => f.write_str("undefined")?,
            Item::Double(value) if value.is_nan() => f.write_str("NaN")?,
            Item::Double(value) if value.is_infinite() => {
                f.write_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })?
            }
            Item::Double(value) => write!(f, "{value:?}")?,
        }
        if self.container_id().is_some() {
            path.pop();
        }
        self.close_tags(f)
    }

    fn close_tags(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in &self.tags {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Structural equality: tags included, doubles by bit pattern, maps
/// regardless of entry order. Cyclic graphs compare without looping.
impl PartialEq for CborObject {
    fn eq(&self, other: &Self) -> bool {
        Equality::new().objects(self, other)
    }
}

impl Eq for CborObject {}

impl Item {
    fn scalar_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Item::UInt(a), Item::UInt(b)) | (Item::NInt(a), Item::NInt(b)) => a == b,
            (Item::Bytes(a), Item::Bytes(b)) => a == b,
            (Item::Text(a), Item::Text(b)) => a == b,
            (Item::Simple(a), Item::Simple(b)) => a == b,
            (Item::Double(a), Item::Double(b)) => a.to_bits() == b.to_bits(),
            (Item::False, Item::False)
            | (Item::True, Item::True)
            | (Item::Null, Item::Null)
            | (Item::Undefined, Item::Undefined) => true,
            _ => false,
        }
    }
}

type Entries = IndexMap<CborObject, CborObject>;

/// A container whose lock the caller already holds.
#[derive(Clone, Copy)]
enum Held<'h> {
    Array(usize, &'h [CborObject]),
    Map(usize, &'h Entries),
}

/// Structural comparison over graphs that may share or cycle. A container
/// pair met again on the current path counts as equal; the held container
/// is read through its guard instead of being locked again.
struct Equality<'h> {
    held: Option<Held<'h>>,
    active: HashSet<(usize, usize)>,
}

impl<'h> Equality<'h> {
    fn new() -> Self {
        Self {
            held: None,
            active: HashSet::new(),
        }
    }

    fn holding(held: Held<'h>) -> Self {
        Self {
            held: Some(held),
            active: HashSet::new(),
        }
    }

    fn objects(&mut self, a: &CborObject, b: &CborObject) -> bool {
        a.tags == b.tags && self.items(&a.item, &b.item)
    }

    fn items(&mut self, a: &Item, b: &Item) -> bool {
        let pair = match (a, b) {
            (Item::Array(x), Item::Array(y)) if Arc::ptr_eq(x, y) => return true,
            (Item::Map(x), Item::Map(y)) if Arc::ptr_eq(x, y) => return true,
            (Item::Array(x), Item::Array(y)) => (handle_id(x), handle_id(y)),
            (Item::Map(x), Item::Map(y)) => (handle_id(x), handle_id(y)),
            _ => return a.scalar_eq(b),
        };
        if !self.active.insert(pair) {
            return true;
        }
        let equal = match (a, b) {
            (Item::Array(x), Item::Array(y)) => {
                let (x, y) = (self.array(x), self.array(y));
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| self.objects(p, q))
            }
            (Item::Map(x), Item::Map(y)) => {
                let (x, y) = (self.map(x), self.map(y));
                self.maps(&x, &y)
            }
            _ => false,
        };
        self.active.remove(&pair);
        equal
    }

    fn maps(&mut self, a: &Entries, b: &Entries) -> bool {
        a.len() == b.len()
            && a.iter().all(|(key, value)| match self.find(b, key) {
                Some(index) => self.objects(value, &b[index]),
                None => false,
            })
    }

    /// Index of the entry in `map` whose key equals `key`.
    fn find(&mut self, map: &Entries, key: &CborObject) -> Option<usize> {
        let hash = map.hasher().hash_one(key);
        map.raw_entry_v1()
            .from_hash_full(hash, |candidate| self.objects(candidate, key))
            .map(|(index, _, _)| index)
    }

    fn array(&self, handle: &ArrayHandle) -> Cow<'h, [CborObject]> {
        match self.held {
            Some(Held::Array(id, items)) if id == handle_id(handle) => Cow::Borrowed(items),
            _ => Cow::Owned(read(handle).clone()),
        }
    }

    fn map(&self, handle: &MapHandle) -> Cow<'h, Entries> {
        match self.held {
            Some(Held::Map(id, entries)) if id == handle_id(handle) => Cow::Borrowed(entries),
            _ => Cow::Owned(read(handle).clone()),
        }
    }
}

/// Containers hash by kind only; their contents can change while they sit
/// in a map.
impl Hash for CborObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tags.hash(state);
        std::mem::discriminant(&self.item).hash(state);
        match &self.item {
            Item::UInt(value) | Item::NInt(value) => value.hash(state),
            Item::Bytes(bytes) => bytes.hash(state),
            Item::Text(text) => text.hash(state),
            Item::Simple(value) => value.hash(state),
            Item::Double(value) => value.to_bits().hash(state),
            Item::Array(_)
            | Item::Map(_)
            | Item::False
            | Item::True
            | Item::Null
            | Item::Undefined => {}
        }
    }
}

impl fmt::Display for CborObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_diagnostic(f, &mut Vec::new())
    }
}

impl fmt::Debug for CborObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_diagnostic(f, &mut Vec::new())
    }
}

impl Default for CborObject {
    fn default() -> Self {
        Self::null()
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for CborObject {
            fn from(value: $t) -> Self {
                Self::from_i64(i64::from(value))
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for CborObject {
            fn from(value: $t) -> Self {
                Self::from_u64(u64::from(value))
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64);
from_unsigned!(u8, u16, u32, u64);

impl From<bool> for CborObject {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl From<f64> for CborObject {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<f32> for CborObject {
    fn from(value: f32) -> Self {
        Self::from_f32(value)
    }
}

impl From<&str> for CborObject {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for CborObject {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<&[u8]> for CborObject {
    fn from(value: &[u8]) -> Self {
        Self::bytes(value)
    }
}

impl From<Vec<u8>> for CborObject {
    fn from(value: Vec<u8>) -> Self {
        Self::bytes(value)
    }
}

impl From<Vec<CborObject>> for CborObject {
    fn from(items: Vec<CborObject>) -> Self {
        Self::array_from(items)
    }
}

impl From<BigInt> for CborObject {
    fn from(value: BigInt) -> Self {
        Self::from_bigint(&value)
    }
}

impl From<&BigInt> for CborObject {
    fn from(value: &BigInt) -> Self {
        Self::from_bigint(value)
    }
}

impl From<EDecimal> for CborObject {
    fn from(value: EDecimal) -> Self {
        Self::from_edecimal(&value)
    }
}

impl From<EFloat> for CborObject {
    fn from(value: EFloat) -> Self {
        Self::from_efloat(&value)
    }
}

impl From<ERational> for CborObject {
    fn from(value: ERational) -> Self {
        Self::from_erational(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_pick_the_wire_kind() {
        assert_eq!(CborObject::from(5).kind(), CborType::UnsignedInteger);
        assert_eq!(CborObject::from(-1).kind(), CborType::NegativeInteger);
        assert!(matches!(CborObject::from_i64(i64::MIN).item, Item::NInt(n) if n == i64::MAX as u64));

        let big = BigInt::from(u64::MAX) + 1;
        let object = CborObject::from_bigint(&big);
        assert_eq!(object.tags(), &[TAG_POSITIVE_BIGNUM]);
        assert!(matches!(&object.item, Item::Bytes(b) if b == &[1, 0, 0, 0, 0, 0, 0, 0, 0]));

        let min = -BigInt::from(u64::MAX) - 1;
        assert!(matches!(CborObject::from_bigint(&min).item, Item::NInt(u64::MAX)));
        let below = min - 1;
        assert_eq!(CborObject::from_bigint(&below).tags(), &[TAG_NEGATIVE_BIGNUM]);
    }

    #[test]
    fn simple_values() {
        assert!(CborObject::simple(22).unwrap().is_null());
        assert!(CborObject::simple(21).unwrap().is_true());
        assert_eq!(CborObject::simple(16).unwrap().kind(), CborType::SimpleValue);
        assert!(CborObject::simple(24).is_err());
    }

    #[test]
    fn tags_are_outermost_first() {
        let object = CborObject::from(1).with_tag(7).with_tag(9);
        assert_eq!(object.tags(), &[9, 7]);
        assert_eq!(object.most_outer_tag(), Some(9));
        assert_eq!(object.most_inner_tag(), Some(7));
        assert!(!object.untagged().is_tagged());
        assert_ne!(object, CborObject::from(1));
    }

    #[test]
    fn doubles_compare_by_bits() {
        assert_eq!(CborObject::from(f64::NAN), CborObject::from(f64::NAN));
        assert_ne!(CborObject::from(0.0), CborObject::from(-0.0));
        assert_ne!(CborObject::from(1.0), CborObject::from(1));
    }

    #[test]
    fn map_keys_use_structural_equality() {
        let map = CborObject::new_map();
        map.set(CborObject::from(vec![CborObject::from(1)]), CborObject::from("a"))
            .unwrap();
        let lookup = CborObject::from(vec![CborObject::from(1)]);
        assert_eq!(map.get_key(&lookup).unwrap(), Some(CborObject::from("a")));
        map.set(lookup, CborObject::from("b")).unwrap();
        assert_eq!(map.len().unwrap(), 1);
    }

    #[test]
    fn self_keyed_maps_stay_usable() {
        let map = CborObject::new_map();
        map.set(map.clone(), CborObject::from(1)).unwrap();
        map.set(CborObject::new_map(), CborObject::from(2)).unwrap();
        map.set(map.clone(), CborObject::from(3)).unwrap();
        assert_eq!(map.len().unwrap(), 2);
        assert_eq!(map.get_key(&map).unwrap(), Some(CborObject::from(3)));
        assert!(map.contains_key(&CborObject::new_map()).unwrap());
        assert!(map.remove(&map.clone()).unwrap());
        assert_eq!(map.keys().unwrap(), vec![CborObject::new_map()]);

        let array = CborObject::new_array();
        array.add(array.clone()).unwrap();
        assert!(array.remove(&array.clone()).unwrap());
        assert!(array.is_empty().unwrap());
    }

    #[test]
    fn cyclic_graphs_compare_structurally() {
        let a = CborObject::new_array();
        a.add(a.clone()).unwrap();
        let b = CborObject::new_array();
        b.add(b.clone()).unwrap();
        assert_eq!(a, b);

        let c = CborObject::new_array();
        c.add(c.clone()).unwrap();
        c.add(CborObject::from(1)).unwrap();
        assert_ne!(a, c);

        let m = CborObject::new_map();
        m.set(CborObject::from("self"), m.clone()).unwrap();
        let n = CborObject::new_map();
        n.set(CborObject::from("self"), n.clone()).unwrap();
        assert_eq!(m, n);
        n.set(CborObject::from("extra"), CborObject::null()).unwrap();
        assert_ne!(m, n);
    }

    #[test]
    fn map_equality_ignores_order() {
        let a = CborObject::map_from([
            (CborObject::from("x"), CborObject::from(1)),
            (CborObject::from("y"), CborObject::from(2)),
        ]);
        let b = CborObject::map_from([
            (CborObject::from("y"), CborObject::from(2)),
            (CborObject::from("x"), CborObject::from(1)),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn mutators_check_kind_then_argument() {
        let text = CborObject::from("x");
        assert!(matches!(text.add(CborObject::null()), Err(CborError::InvalidState(_))));
        let array = CborObject::new_array();
        assert_eq!(array.add(None::<CborObject>), Err(CborError::NullArgument("value")));
        array.add(CborObject::null()).unwrap();
        assert!(array.get(0).unwrap().is_null());
        assert!(array.insert(5, CborObject::null()).is_err());
        array.insert(0, CborObject::from(1)).unwrap();
        array.set_at(1, CborObject::from(2)).unwrap();
        assert_eq!(array.remove_at(0).unwrap(), CborObject::from(1));
        assert!(array.remove(&CborObject::from(2)).unwrap());
        assert!(array.is_empty().unwrap());

        let map = CborObject::new_map();
        assert_eq!(map.set(None::<CborObject>, CborObject::null()), Err(CborError::NullArgument("key")));
        assert!(map.get(0).is_err());
    }

    #[test]
    fn diagnostic_notation() {
        let object = CborObject::from(vec![
            CborObject::from(-10),
            CborObject::bytes(vec![1, 2]),
            CborObject::from("a").with_tag(21),
            CborObject::map_from([(CborObject::from(1), CborObject::from(1.5))]),
            CborObject::undefined(),
        ]);
        assert_eq!(
            object.to_string(),
            r#"[-10, h'0102', 21("a"), {1: 1.5}, undefined]"#
        );

        let cyclic = CborObject::new_array();
        cyclic.add(cyclic.clone()).unwrap();
        assert_eq!(cyclic.to_string(), "[<cycle>]");
    }
}
