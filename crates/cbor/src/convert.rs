//! Conversions between [`CborObject`] and [`serde_json::Value`].

use std::collections::HashSet;

use num_traits::ToPrimitive;
use serde_json::{Map, Number, Value};

use crate::error::CborError;
use crate::json::bytes_text;
use crate::number::CborNumber;
use crate::object::{read, CborObject, Item};

impl From<&Value> for CborObject {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CborObject::null(),
            Value::Bool(b) => CborObject::boolean(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CborObject::from_i64(i)
                } else if let Some(u) = n.as_u64() {
                    CborObject::from_u64(u)
                } else {
                    CborObject::from_f64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => CborObject::text(s.clone()),
            Value::Array(items) => CborObject::array_from(items.iter().map(CborObject::from).collect()),
            Value::Object(map) => CborObject::map_from(
                map.iter()
                    .map(|(k, v)| (CborObject::text(k.clone()), CborObject::from(v))),
            ),
        }
    }
}

impl From<Value> for CborObject {
    fn from(value: Value) -> Self {
        CborObject::from(&value)
    }
}

fn number_to_json(number: &CborNumber) -> Value {
    let number = match number {
        CborNumber::Integer(i) => Some(Number::from(*i)),
        CborNumber::BigInteger(big) => match big.to_u64() {
            Some(u) => Some(Number::from(u)),
            None => Number::from_f64(number.to_f64()),
        },
        other => Number::from_f64(other.to_f64()),
    };
    number.map_or(Value::Null, Value::Number)
}

fn to_json_value(value: &CborObject, active: &mut HashSet<usize>) -> Result<Value, CborError> {
    if let Some(number) = CborNumber::from_object(value) {
        return Ok(number_to_json(&number));
    }
    let id = value.container_id();
    if let Some(id) = id {
        if !active.insert(id) {
            return Err(CborError::argument("cannot convert a cyclic structure"));
        }
    }
    let converted = match &value.item {
        Item::Bytes(bytes) => Value::String(bytes_text(value.tags(), bytes)),
        Item::Text(text) => Value::String(text.clone()),
        Item::True => Value::Bool(true),
        Item::False => Value::Bool(false),
        Item::Array(items) => {
            let items = read(items).clone();
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                out.push(to_json_value(item, active)?);
            }
            Value::Array(out)
        }
        Item::Map(entries) => {
            let entries: Vec<_> = read(entries)
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let mut out = Map::new();
            for (key, value) in &entries {
                let key = match &key.item {
                    Item::Text(text) => text.clone(),
                    _ => key.to_json_string()?,
                };
                if out.contains_key(&key) {
                    return Err(CborError::argument(format!(
                        "duplicate JSON key {key:?} after key conversion"
                    )));
                }
                out.insert(key, to_json_value(value, active)?);
            }
            Value::Object(out)
        }
        _ => Value::Null,
    };
    if let Some(id) = id {
        active.remove(&id);
    }
    Ok(converted)
}

impl CborObject {
    /// Converts to a `serde_json::Value` with the same rules as
    /// [`CborObject::to_json_string`]; tower numbers become the nearest
    /// double.
    pub fn to_serde_json(&self) -> Result<Value, CborError> {
        to_json_value(self, &mut HashSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_serde_value() {
        let value = json!({"a": [1, -2, 2.5, null, true], "b": "text", "big": u64::MAX});
        let object = CborObject::from(&value);
        let a = object.get_key(&CborObject::from("a")).unwrap().unwrap();
        assert_eq!(a.get(1).unwrap(), CborObject::from(-2));
        assert_eq!(a.get(2).unwrap(), CborObject::from(2.5));
        let big = object.get_key(&CborObject::from("big")).unwrap().unwrap();
        assert_eq!(big.as_u64().unwrap(), u64::MAX);
    }

    #[test]
    fn to_serde_value() {
        let value = json!({"list": [1, "two", false, null], "n": -7});
        assert_eq!(CborObject::from(&value).to_serde_json().unwrap(), value);

        let decimal = CborObject::from_edecimal(&"1.5".parse().unwrap());
        assert_eq!(decimal.to_serde_json().unwrap(), json!(1.5));
        assert_eq!(CborObject::from(f64::NAN).to_serde_json().unwrap(), Value::Null);
        assert_eq!(
            CborObject::bytes(vec![0xde, 0xad]).with_tag(23).to_serde_json().unwrap(),
            json!("dead")
        );
    }

    #[test]
    fn cycles_fail() {
        let array = CborObject::new_array();
        array.add(array.clone()).unwrap();
        assert!(array.to_serde_json().is_err());
    }
}
