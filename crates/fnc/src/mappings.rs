//! Mapping helpers.
//!
//! These functions read their input through [`Accessor`](crate::Accessor), so
//! they accept maps, sequences (keyed by index) and records alike, and always
//! return an insertion-ordered map.

use crate::iteratee::Iteratee;
use crate::path::{get_path, resolve_segment, IntoPath};
use crate::{iterate, Map, Value};

/// Returns a tuple of the values at each path, `Null` where a path is missing.
///
/// ```
/// use fnc::{at, Value};
/// use serde_json::json;
///
/// let obj = Value::from(json!({"a": 1, "b": 2, "c": {"d": {"e": [3]}}}));
/// assert_eq!(at(["a", "c.d.e[0]"], &obj), Value::tuple([1, 3]));
/// ```
pub fn at<P>(paths: impl IntoIterator<Item = P>, obj: &Value) -> Value
where
    P: IntoPath,
{
    Value::Tuple(
        paths
            .into_iter()
            .map(|path| get_path(path, obj, Value::Null))
            .collect(),
    )
}

/// Returns a map of the given keys that are present in `obj`.
///
/// Keys are looked up as single segments, not parsed as paths.
pub fn pick(keys: impl IntoIterator<Item = Value>, obj: &Value) -> Value {
    let mut result = Map::new();
    for key in keys {
        if let Some(value) = resolve_segment(obj, &key) {
            result.insert(key, value);
        }
    }
    Value::from(result)
}

/// Returns the entries of `obj` whose keys are not listed.
pub fn omit(keys: impl IntoIterator<Item = Value>, obj: &Value) -> Value {
    let keys: Vec<Value> = keys.into_iter().collect();
    iterate(obj)
        .filter(|(key, _)| !keys.contains(key))
        .collect::<Map>()
        .into()
}

/// Swaps keys and values. Later entries win on duplicate values.
pub fn invert(obj: &Value) -> Value {
    iterate(obj)
        .map(|(key, value)| (value, key))
        .collect::<Map>()
        .into()
}

/// Maps each key through an iteratee, keeping values.
pub fn map_keys(iteratee: impl Into<Iteratee>, obj: &Value) -> Value {
    let iteratee = iteratee.into();
    iterate(obj)
        .map(|(key, value)| (iteratee.apply(&key), value))
        .collect::<Map>()
        .into()
}

/// Maps each value through an iteratee, keeping keys.
pub fn map_values(iteratee: impl Into<Iteratee>, obj: &Value) -> Value {
    let iteratee = iteratee.into();
    iterate(obj)
        .map(|(key, value)| {
            let mapped = iteratee.apply(&value);
            (key, mapped)
        })
        .collect::<Map>()
        .into()
}

/// Merges entries left to right; later sources overwrite earlier ones.
///
/// ```
/// use fnc::{merge, Value};
/// use serde_json::json;
///
/// let merged = merge([
///     Value::from(json!({"a": 0})),
///     Value::from(json!({"b": 1})),
///     Value::from(json!({"b": 2, "c": 3})),
///     Value::from(json!({"a": 1})),
/// ]);
/// assert_eq!(merged, Value::from(json!({"a": 1, "b": 2, "c": 3})));
/// ```
pub fn merge(objs: impl IntoIterator<Item = Value>) -> Value {
    let mut result = Map::new();
    for obj in objs {
        result.extend(iterate(&obj));
    }
    Value::from(result)
}

/// Merges entries left to right; the first source to set a key wins.
pub fn defaults(objs: impl IntoIterator<Item = Value>) -> Value {
    let mut result = Map::new();
    for obj in objs {
        for (key, value) in iterate(&obj) {
            result.entry(key).or_insert(value);
        }
    }
    Value::from(result)
}
