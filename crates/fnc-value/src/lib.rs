//! fnc-value - Dynamic values for the fnc utility library.
//!
//! This crate holds the primitives that every fnc operation is built on:
//!
//! - [`Value`]: a cheaply clonable dynamic value with numeric-aware equality,
//!   hashability and truthiness
//! - [`Func`]: a shared n-ary callable over values
//! - [`Record`]: the trait custom types implement to expose attributes and items
//! - [`SeenSet`]: a membership accumulator that handles unhashable values
//! - [`Accessor`]: a uniform view for item, attribute and key/value access
//!
//! # Quick Start
//!
//! ```rust
//! use fnc_value::{iterate, SeenSet, Value};
//!
//! let row = Value::map([("id", Value::from(1)), ("tags", Value::list(["a", "b"]))]);
//!
//! let keys: Vec<Value> = iterate(&row).map(|(k, _)| k).collect();
//! assert_eq!(keys, vec![Value::from("id"), Value::from("tags")]);
//!
//! let mut seen = SeenSet::new();
//! assert!(seen.add(Value::list(["a", "b"])));
//! assert!(!seen.add(Value::list(["a", "b"])));
//! ```

mod access;
mod func;
mod record;
mod seen;
mod value;

pub use access::{iterate, Accessor, Entries, Sequence};
pub use func::Func;
pub use record::Record;
pub use seen::SeenSet;
pub use value::{Map, Set, Value};

/// Returns `true` for lists, tuples, sets and maps.
pub fn is_collection(value: &Value) -> bool {
    value.is_collection()
}

/// Returns `true` for lists, tuples, text and bytes.
pub fn is_sequence(value: &Value) -> bool {
    value.is_sequence()
}

/// Returns `true` for maps.
pub fn is_mapping(value: &Value) -> bool {
    value.is_mapping()
}
