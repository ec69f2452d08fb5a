//! Canonical total order over [`CborObject`] values.
//!
//! Values are grouped into buckets (undefined, null, false, true, numbers,
//! other simple values, byte strings, text strings, arrays, maps). Numbers
//! compare by exact value whatever their representation; ties are broken by
//! representation and then by tag list.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::number::CborNumber;
use crate::object::{read, CborObject, Item};

fn bucket(value: &CborObject, number: Option<&CborNumber>) -> u8 {
    if number.is_some() {
        return 4;
    }
    match value.item {
        Item::Undefined => 0,
        Item::Null => 1,
        Item::False => 2,
        Item::True => 3,
        Item::UInt(_) | Item::NInt(_) | Item::Double(_) => 4,
        Item::Simple(_) => 5,
        Item::Bytes(_) => 6,
        Item::Text(_) => 7,
        Item::Array(_) => 8,
        Item::Map(_) => 9,
    }
}

/// Canonical order, usable with `sort_by`.
///
/// ```
/// use cbor_exact::{compare, CborObject};
///
/// let mut values = vec![
///     CborObject::from("a"),
///     CborObject::from(2.5),
///     CborObject::null(),
///     CborObject::from(2),
/// ];
/// values.sort_by(compare);
/// assert_eq!(values[0], CborObject::null());
/// assert_eq!(values[1], CborObject::from(2));
/// ```
pub fn compare(a: &CborObject, b: &CborObject) -> Ordering {
    Walk::default().compare(a, b)
}

/// Container pairs on the current path; one met again orders as equal.
#[derive(Default)]
struct Walk {
    active: HashSet<(usize, usize)>,
}

impl Walk {
    fn compare(&mut self, a: &CborObject, b: &CborObject) -> Ordering {
        if CborObject::ptr_eq(a, b) && a.tags == b.tags {
            return Ordering::Equal;
        }
        let number_a = CborNumber::from_object(a);
        let number_b = CborNumber::from_object(b);
        let rank = bucket(a, number_a.as_ref()).cmp(&bucket(b, number_b.as_ref()));
        if rank.is_ne() {
            return rank;
        }
        let body = match (&number_a, &number_b) {
            (Some(x), Some(y)) => x
                .compare_to(y)
                .then_with(|| x.representation_rank().cmp(&y.representation_rank())),
            _ => self.containers(a, b),
        };
        body.then_with(|| a.tags.cmp(&b.tags))
    }

    fn containers(&mut self, a: &CborObject, b: &CborObject) -> Ordering {
        let pair = match (a.container_id(), b.container_id()) {
            (Some(x), Some(y)) => (x, y),
            _ => return compare_scalars(a, b),
        };
        if !self.active.insert(pair) {
            return Ordering::Equal;
        }
        let order = match (&a.item, &b.item) {
            (Item::Array(x), Item::Array(y)) => {
                let x = read(x).clone();
                let y = read(y).clone();
                self.sequences(&x, &y).unwrap_or_else(|| x.len().cmp(&y.len()))
            }
            (Item::Map(_), Item::Map(_)) => {
                let x = self.sorted_entries(a);
                let y = self.sorted_entries(b);
                x.len().cmp(&y.len()).then_with(|| {
                    x.iter()
                        .zip(y.iter())
                        .map(|((kx, vx), (ky, vy))| {
                            self.compare(kx, ky).then_with(|| self.compare(vx, vy))
                        })
                        .find(|order| order.is_ne())
                        .unwrap_or(Ordering::Equal)
                })
            }
            _ => Ordering::Equal,
        };
        self.active.remove(&pair);
        order
    }

    /// First unequal position of two item lists.
    fn sequences(&mut self, x: &[CborObject], y: &[CborObject]) -> Option<Ordering> {
        x.iter()
            .zip(y.iter())
            .map(|(p, q)| self.compare(p, q))
            .find(|order| order.is_ne())
    }

    fn sorted_entries(&mut self, value: &CborObject) -> Vec<(CborObject, CborObject)> {
        let Item::Map(entries) = &value.item else {
            return Vec::new();
        };
        let mut entries: Vec<_> = read(entries)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| self.compare(&a.0, &b.0));
        entries
    }
}

fn compare_scalars(a: &CborObject, b: &CborObject) -> Ordering {
    match (&a.item, &b.item) {
        (Item::Simple(x), Item::Simple(y)) => x.cmp(y),
        (Item::Bytes(x), Item::Bytes(y)) => x.cmp(y),
        // UTF-8 byte order is code point order.
        (Item::Text(x), Item::Text(y)) => x.as_bytes().cmp(y.as_bytes()),
        _ => Ordering::Equal,
    }
}

impl CborObject {
    /// Canonical order against `other`; anything sorts after `None`.
    pub fn compare_to(&self, other: Option<&CborObject>) -> Ordering {
        match other {
            Some(other) => compare(self, other),
            None => Ordering::Greater,
        }
    }
}
