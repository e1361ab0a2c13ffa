//! fnc - Functional data-processing utilities over dynamic values.
//!
//! fnc works on [`Value`], a dynamic value with maps, sequences, sets,
//! callables and custom [`Record`] objects. On top of it sit:
//!
//! - a path engine ([`get_path`], [`has_path`], [`to_path`]) for `"a.b[0].c"`
//!   style lookups into nested data
//! - [`Iteratee`] resolution, so operators accept a callable or shorthand
//!   data (a path, a conformance map, a pick set or an at tuple)
//! - lazy sequence operators ([`map`], [`filter`], [`union`], [`chunk`], ...)
//! - mapping helpers ([`pick`], [`merge`], [`defaults`], ...)
//! - function builders ([`compose`], [`partial`], [`negate`], ...) and
//!   [`retry`] for fallible calls
//!
//! # Quick Start
//!
//! ```rust
//! use fnc::{chunk, get_path, group_by, map, Value};
//! use serde_json::json;
//!
//! let orders = Value::from(json!([
//!     {"id": 1, "customer": {"name": "ada"}, "total": 30},
//!     {"id": 2, "customer": {"name": "bob"}, "total": 12},
//!     {"id": 3, "customer": {"name": "ada"}, "total": 7},
//! ]));
//!
//! let names: Vec<Value> = map("customer.name", orders.to_vec()).collect();
//! assert_eq!(names, vec![Value::from("ada"), Value::from("bob"), Value::from("ada")]);
//!
//! let by_customer = group_by("customer.name", orders.to_vec());
//! assert_eq!(by_customer[&Value::from("ada")].len(), 2);
//!
//! assert_eq!(get_path("[1].total", &orders, Value::Null), Value::Int(12));
//!
//! let pages: Vec<Vec<Value>> = chunk(2, orders.to_vec()).unwrap().collect();
//! assert_eq!(pages.len(), 2);
//! ```
//!
//! # Custom records
//!
//! Structs can take part in path lookups with `#[derive(Record)]`:
//!
//! ```rust
//! use fnc::{get_path, Record, Value};
//!
//! #[derive(Clone, Record)]
//! struct User {
//!     name: String,
//!     #[record(skip)]
//!     password: String,
//! }
//!
//! let user = Value::object(User { name: "ada".into(), password: "secret".into() });
//! assert_eq!(get_path("name", &user, Value::Null), Value::from("ada"));
//! assert_eq!(get_path("password", &user, Value::Null), Value::Null);
//! ```

mod error;
mod iteratee;
mod mappings;
mod path;
mod sequences;
mod utilities;

pub mod funcs;
pub mod retry;

pub use fnc_macros::Record;
pub use fnc_value::{
    is_collection, is_mapping, is_sequence, iterate, Accessor, Entries, Func, Map, Record,
    SeenSet, Sequence, Set, Value,
};

pub use error::{FncError, Result};
pub use iteratee::{Conformance, Iteratee};
pub use mappings::{at, defaults, invert, map_keys, map_values, merge, omit, pick};
pub use path::{
    get_path, has_path, resolve_segment, to_path, try_get_path, Fallback, IntoPath, Lookup, Path,
};
pub use retry::{Jitter, Retry, RetryConfig, RetryPolicy};
pub use sequences::{
    chunk, compact, concat, count_by, difference, difference_by, duplicates, duplicates_by,
    filter, find, find_index, find_last, find_last_index, flatten, flatten_deep, group_all,
    group_by, interleave, intercalate, intersection, intersection_by, intersperse, key_by, map,
    map_cat, map_flat, map_flat_deep, map_many, partition, reject, union, union_by, unzip,
    without, xor,
};
pub use utilities::{
    after, at_getter, before, compose, conformance, conforms, constant, identity, is_match,
    iteratee, matches, negate, noop, over, over_all, over_any, partial, path_getter, pick_getter,
    random, Step,
};
