//! Custom key/value sources.
//!
//! This module provides the [`Record`] trait, which lets user types take part
//! in path lookups, pick/at getters and mapping helpers. It is usually
//! implemented with `#[derive(Record)]` from the `fnc` crate.

use crate::value::Value;

/// A value that exposes named attributes and, optionally, keyed items.
///
/// Path resolution consults [`item`](Record::item) first and falls back to
/// [`attr`](Record::attr) for string segments, so a record can model both a
/// plain struct and a dictionary-like container.
///
/// # Derive Usage
///
/// ```ignore
/// use fnc::{Record, Value, get_path};
///
/// #[derive(Clone, Record)]
/// struct User {
///     name: String,
///     #[record(rename = "years")]
///     age: u32,
///     #[record(skip)]
///     password: String,
/// }
/// ```
///
/// # Manual Implementation
///
/// ```
/// use fnc_value::{Record, Value};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl Record for Point {
///     fn attr(&self, name: &str) -> Option<Value> {
///         match name {
///             "x" => Some(Value::Int(self.x)),
///             "y" => Some(Value::Int(self.y)),
///             _ => None,
///         }
///     }
///
///     fn keys(&self) -> Vec<Value> {
///         vec![Value::from("x"), Value::from("y")]
///     }
/// }
///
/// let p = Point { x: 1, y: 2 };
/// assert_eq!(p.entries(), vec![(Value::from("x"), Value::Int(1)), (Value::from("y"), Value::Int(2))]);
/// ```
pub trait Record {
    /// Returns the named attribute, if present.
    fn attr(&self, name: &str) -> Option<Value>;

    /// Returns the item stored under `key`, if this record is subscriptable.
    fn item(&self, key: &Value) -> Option<Value> {
        let _ = key;
        None
    }

    /// Returns the keys this record yields when iterated as key/value pairs.
    fn keys(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Returns `(key, value)` pairs for every key in [`keys`](Record::keys).
    ///
    /// Each key is resolved through [`item`](Record::item), then through
    /// [`attr`](Record::attr) for string keys. Keys that resolve to nothing
    /// are skipped.
    fn entries(&self) -> Vec<(Value, Value)> {
        self.keys()
            .into_iter()
            .filter_map(|key| {
                let value = self
                    .item(&key)
                    .or_else(|| key.as_str().and_then(|name| self.attr(name)))?;
                Some((key, value))
            })
            .collect()
    }

    /// Boolean coercion of the record.
    fn is_truthy(&self) -> bool {
        true
    }

    /// Short name used when displaying the record.
    fn type_name(&self) -> &str {
        "object"
    }
}
