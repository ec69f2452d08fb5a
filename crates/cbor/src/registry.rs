//! Process-wide extension points: converters from native Rust values and
//! validators for application tags.
//!
//! Both tables are append-only. A type or tag can be registered once, and
//! types and tags the crate already handles cannot be registered at all.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use cbor_exact_numbers::{EDecimal, EFloat, ERational};
use num_bigint::BigInt;
use tracing::debug;

use crate::constants::BUILT_IN_TAGS;
use crate::error::CborError;
use crate::object::{read, write, CborObject};

/// Validates items decoded with a given tag.
///
/// ```
/// use cbor_exact::{register_tag_handler, CborObject, TagHandler};
///
/// struct EpochSeconds;
///
/// impl TagHandler for EpochSeconds {
///     fn validate(&self, item: &CborObject) -> Result<(), String> {
///         if item.untagged().is_number() {
///             Ok(())
///         } else {
///             Err("expected a number".to_string())
///         }
///     }
/// }
///
/// register_tag_handler(1001, EpochSeconds).unwrap();
/// assert!(CborObject::decode(&[0xd9, 0x03, 0xe9, 0x01]).is_ok());
/// assert!(CborObject::decode(&[0xd9, 0x03, 0xe9, 0x61, 0x78]).is_err());
/// ```
pub trait TagHandler: Send + Sync {
    /// Called with the decoded item, the handler's tag outermost. An `Err`
    /// fails the decode with its message.
    fn validate(&self, item: &CborObject) -> Result<(), String>;
}

type Converter = Arc<dyn Fn(&dyn Any) -> Option<CborObject> + Send + Sync>;

fn converters() -> &'static RwLock<HashMap<TypeId, Converter>> {
    static CONVERTERS: OnceLock<RwLock<HashMap<TypeId, Converter>>> = OnceLock::new();
    CONVERTERS.get_or_init(|| RwLock::new(HashMap::new()))
}

fn tag_handlers() -> &'static RwLock<HashMap<u64, Arc<dyn TagHandler>>> {
    static HANDLERS: OnceLock<RwLock<HashMap<u64, Arc<dyn TagHandler>>>> = OnceLock::new();
    HANDLERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Converts the natively supported types, or `None`.
fn convert_native(value: &dyn Any) -> Option<CborObject> {
    macro_rules! try_types {
        ($($t:ty),*) => {
            $(if let Some(v) = value.downcast_ref::<$t>() {
                return Some(CborObject::from(v.clone()));
            })*
        };
    }
    try_types!(
        bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, Vec<u8>, BigInt,
        EDecimal, EFloat, ERational, Vec<CborObject>
    );
    if let Some(v) = value.downcast_ref::<&'static str>() {
        return Some(CborObject::text(*v));
    }
    if let Some(v) = value.downcast_ref::<CborObject>() {
        return Some(v.clone());
    }
    if value.is::<()>() {
        return Some(CborObject::null());
    }
    None
}

fn is_native(type_id: TypeId) -> bool {
    [
        TypeId::of::<bool>(),
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
        TypeId::of::<String>(),
        TypeId::of::<&'static str>(),
        TypeId::of::<Vec<u8>>(),
        TypeId::of::<BigInt>(),
        TypeId::of::<EDecimal>(),
        TypeId::of::<EFloat>(),
        TypeId::of::<ERational>(),
        TypeId::of::<Vec<CborObject>>(),
        TypeId::of::<CborObject>(),
        TypeId::of::<()>(),
    ]
    .contains(&type_id)
}

/// Registers how values of `T` become CBOR in [`CborObject::from_native`].
pub fn register_converter<T, F>(hook: F) -> Result<(), CborError>
where
    T: Any,
    F: Fn(&T) -> CborObject + Send + Sync + 'static,
{
    let type_id = TypeId::of::<T>();
    let type_name = std::any::type_name::<T>();
    if is_native(type_id) {
        return Err(CborError::argument(format!(
            "{type_name} is converted natively"
        )));
    }
    let mut table = write(converters());
    if table.contains_key(&type_id) {
        return Err(CborError::argument(format!(
            "a converter for {type_name} is already registered"
        )));
    }
    let converter: Converter =
        Arc::new(move |value: &dyn Any| value.downcast_ref::<T>().map(&hook));
    table.insert(type_id, converter);
    debug!(type_name, "registered cbor converter");
    Ok(())
}

/// Registers a validator for decoded items carrying `tag`.
pub fn register_tag_handler(tag: u64, handler: impl TagHandler + 'static) -> Result<(), CborError> {
    if BUILT_IN_TAGS.contains(&tag) {
        return Err(CborError::argument(format!("tag {tag} has built-in semantics")));
    }
    let mut table = write(tag_handlers());
    if table.contains_key(&tag) {
        return Err(CborError::argument(format!(
            "a handler for tag {tag} is already registered"
        )));
    }
    table.insert(tag, Arc::new(handler));
    debug!(tag, "registered cbor tag handler");
    Ok(())
}

pub(crate) fn tag_handler(tag: u64) -> Option<Arc<dyn TagHandler>> {
    read(tag_handlers()).get(&tag).cloned()
}

impl CborObject {
    /// Converts a native value: the crate's own numeric and string types,
    /// primitives, `Vec<u8>` as a byte string, `()` as null, then any type
    /// with a registered converter.
    pub fn from_native(value: &dyn Any) -> Result<CborObject, CborError> {
        if let Some(object) = convert_native(value) {
            return Ok(object);
        }
        let converter = read(converters()).get(&value.type_id()).cloned();
        converter
            .and_then(|convert| convert(value))
            .ok_or_else(|| CborError::argument("no converter registered for this type"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Celsius(f64);

    struct Unregistered;

    struct Rejecting;

    impl TagHandler for Rejecting {
        fn validate(&self, _item: &CborObject) -> Result<(), String> {
            Err("always".to_string())
        }
    }

    #[test]
    fn native_values_convert_without_registration() {
        assert_eq!(CborObject::from_native(&7u16).unwrap(), CborObject::from(7));
        assert_eq!(
            CborObject::from_native(&"hi").unwrap(),
            CborObject::from("hi")
        );
        assert!(CborObject::from_native(&()).unwrap().is_null());
        assert!(CborObject::from_native(&Unregistered).is_err());
    }

    #[test]
    fn converters_register_once() {
        register_converter(|c: &Celsius| CborObject::from(c.0).with_tag(1010)).unwrap();
        let object = CborObject::from_native(&Celsius(21.5)).unwrap();
        assert_eq!(object.tags(), &[1010]);
        assert!(register_converter(|c: &Celsius| CborObject::from(c.0)).is_err());
        assert!(register_converter(|v: &u32| CborObject::from(*v)).is_err());
    }

    #[test]
    fn built_in_tags_cannot_be_claimed() {
        assert!(register_tag_handler(2, Rejecting).is_err());
        assert!(register_tag_handler(28, Rejecting).is_err());
        register_tag_handler(4040, Rejecting).unwrap();
        assert!(register_tag_handler(4040, Rejecting).is_err());
        assert!(tag_handler(4040).is_some());
    }
}
