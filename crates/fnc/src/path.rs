//! Path parsing and deep lookups.
//!
//! A [`Path`] is an ordered list of segments. Each segment is resolved against
//! the current container with [`resolve_segment`], which tries, in order:
//!
//! 1. item access (`container[segment]`)
//! 2. item access with the segment coerced to an integer, when it is not one
//! 3. attribute access, for records only
//!
//! # Path strings
//!
//! | input | segments |
//! |-------|----------|
//! | `"a.b.c"` | `["a", "b", "c"]` |
//! | `"a[0].b"` | `["a", "0", "b"]` |
//! | `"[a][0]"` | `["a", "0"]` |
//! | `"a\.b"` | `["a\.b"]` |
//! | `"a.[]"` | `["a", ""]` |
//! | `"a."` | `["a", ""]` |
//! | `""` | `[""]` |
//!
//! Non-string paths are a single segment, and list paths are used as-is, so a
//! tuple key or a key containing dots can always be addressed exactly.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FncError, Result};
use crate::{Accessor, Value};

static PATH_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\.|\.|\[(.*?)\]").expect("path token pattern is valid"));

/// An ordered list of lookup segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(Vec<Value>);

impl Path {
    /// Creates a path from explicit segments.
    pub fn new(segments: Vec<Value>) -> Self {
        Path(segments)
    }

    /// Parses a path string.
    pub fn parse(text: &str) -> Self {
        Path(parse_segments(text))
    }

    pub fn segments(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walks the path from `obj`.
    ///
    /// The walk stops at the first segment that does not resolve; what is
    /// returned then depends on `fallback`.
    pub fn lookup(&self, obj: &Value, fallback: Fallback) -> Lookup {
        let mut current = obj.clone();
        for segment in &self.0 {
            match resolve_segment(&current, segment) {
                Some(next) => current = next,
                None => {
                    return match fallback {
                        Fallback::Default(default) => Lookup::Defaulted(default),
                        Fallback::Raise => Lookup::NotFound {
                            segment: segment.clone(),
                        },
                    }
                }
            }
        }
        Lookup::Found(current)
    }
}

fn flush(current: &mut String, segments: &mut Vec<Value>) {
    if !current.is_empty() {
        segments.push(Value::from(std::mem::take(current)));
    }
}

fn parse_segments(text: &str) -> Vec<Value> {
    if text.is_empty() {
        return vec![Value::from("")];
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut last = 0;
    let mut ends_with_dot = false;

    for caps in PATH_TOKEN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        current.push_str(&text[last..whole.start()]);
        last = whole.end();
        ends_with_dot = false;

        match caps.get(1) {
            Some(inner) => {
                flush(&mut current, &mut segments);
                segments.push(Value::from(inner.as_str()));
            }
            None if whole.as_str() == "." => {
                flush(&mut current, &mut segments);
                ends_with_dot = true;
            }
            None => current.push_str(whole.as_str()),
        }
    }

    let rest = &text[last..];
    if rest.is_empty() && ends_with_dot {
        segments.push(Value::from(""));
    } else {
        current.push_str(rest);
        flush(&mut current, &mut segments);
    }
    segments
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{segment}")?;
        }
        f.write_str("]")
    }
}

impl FromIterator<Value> for Path {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl From<Path> for Value {
    fn from(path: Path) -> Self {
        Value::from(path.0)
    }
}

/// Converts a value into a [`Path`].
///
/// Lists become their items, strings are parsed, anything else becomes a
/// single segment.
pub fn to_path(value: &Value) -> Path {
    match value {
        Value::List(items) => Path(items.to_vec()),
        Value::Str(text) => Path::parse(text),
        other => Path(vec![other.clone()]),
    }
}

/// Anything that can name a path.
pub trait IntoPath {
    fn into_path(self) -> Path;
}

impl IntoPath for Path {
    fn into_path(self) -> Path {
        self
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> Path {
        self.clone()
    }
}

impl IntoPath for Value {
    fn into_path(self) -> Path {
        to_path(&self)
    }
}

impl IntoPath for &Value {
    fn into_path(self) -> Path {
        to_path(self)
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Path {
        Path::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Path {
        Path::parse(&self)
    }
}

impl IntoPath for Vec<Value> {
    fn into_path(self) -> Path {
        Path(self)
    }
}

macro_rules! int_into_path {
    ($($ty:ty),*) => {
        $(
            impl IntoPath for $ty {
                fn into_path(self) -> Path {
                    Path(vec![Value::from(self)])
                }
            }
        )*
    };
}

int_into_path!(i32, i64, usize);

/// What a lookup does when a segment is missing.
#[derive(Debug, Clone)]
pub enum Fallback {
    /// Stop and hand back this value.
    Default(Value),
    /// Stop and report the missing segment.
    Raise,
}

/// Outcome of [`Path::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Every segment resolved.
    Found(Value),
    /// A segment was missing and the fallback default was substituted.
    Defaulted(Value),
    /// A segment was missing in raise mode.
    NotFound { segment: Value },
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Returns the found or defaulted value.
    pub fn value(self) -> Option<Value> {
        match self {
            Lookup::Found(value) | Lookup::Defaulted(value) => Some(value),
            Lookup::NotFound { .. } => None,
        }
    }
}

fn coerce_index(key: &Value) -> Option<i64> {
    match key {
        Value::Str(text) => text.trim().parse().ok(),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        _ => None,
    }
}

/// Resolves a single segment against a container.
pub fn resolve_segment(obj: &Value, key: &Value) -> Option<Value> {
    let access = Accessor::classify(obj);

    if let Some(value) = access.item(key) {
        return Some(value);
    }

    if !matches!(key, Value::Int(_) | Value::Bool(_)) {
        if let Some(value) = coerce_index(key).and_then(|index| access.item(&Value::Int(index)))
        {
            return Some(value);
        }
    }

    match key {
        Value::Str(name) if !access.is_builtin() => access.attr(name),
        _ => None,
    }
}

/// Returns the value at `path` in `obj`, or `default` if any segment is missing.
///
/// ```
/// use fnc::{get_path, Value};
/// use serde_json::json;
///
/// let obj = Value::from(json!({"a": {"b": [{"c": 1}]}}));
/// assert_eq!(get_path("a.b[0].c", &obj, Value::Null), Value::Int(1));
/// assert_eq!(get_path("a.x.c", &obj, Value::from(false)), Value::from(false));
/// ```
pub fn get_path(path: impl IntoPath, obj: &Value, default: Value) -> Value {
    path.into_path()
        .lookup(obj, Fallback::Default(default.clone()))
        .value()
        .unwrap_or(default)
}

/// Returns `true` if every segment of `path` resolves in `obj`.
pub fn has_path(path: impl IntoPath, obj: &Value) -> bool {
    path.into_path().lookup(obj, Fallback::Raise).is_found()
}

/// Returns the value at `path`, or [`FncError::PathNotFound`].
pub fn try_get_path(path: impl IntoPath, obj: &Value) -> Result<Value> {
    let path = path.into_path();
    match path.lookup(obj, Fallback::Raise) {
        Lookup::Found(value) | Lookup::Defaulted(value) => Ok(value),
        Lookup::NotFound { segment } => Err(FncError::PathNotFound { path, segment }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segments(text: &str) -> Vec<Value> {
        Path::parse(text).segments().to_vec()
    }

    fn strs(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn parses_dotted_and_bracketed_paths() {
        assert_eq!(segments("a.b.c"), strs(&["a", "b", "c"]));
        assert_eq!(segments("a.0.0.b.c"), strs(&["a", "0", "0", "b", "c"]));
        assert_eq!(segments("a[0].b.c"), strs(&["a", "0", "b", "c"]));
        assert_eq!(segments("a[0][1][2].b.c"), strs(&["a", "0", "1", "2", "b", "c"]));
        assert_eq!(segments("[a][0][1][2][b][c]"), strs(&["a", "0", "1", "2", "b", "c"]));
    }

    #[test]
    fn empty_segments() {
        assert_eq!(segments(""), strs(&[""]));
        assert_eq!(segments("a.[]"), strs(&["a", ""]));
        assert_eq!(segments("a."), strs(&["a", ""]));
        assert_eq!(segments("a..b"), strs(&["a", "b"]));
    }

    #[test]
    fn escaped_dots_are_literal() {
        assert_eq!(segments(r"a\.b.c"), strs(&[r"a\.b", "c"]));
        assert_eq!(segments(r"\.a"), strs(&[r"\.a"]));
    }

    #[test]
    fn escaped_dots_address_keys_verbatim() {
        let escaped = Value::map([(r"a\.b", 1)]);
        assert_eq!(get_path(r"a\.b", &escaped, Value::Null), Value::Int(1));

        let dotted = Value::map([("a.b", 2)]);
        assert_eq!(get_path(r"a\.b", &dotted, Value::Null), Value::Null);
        assert_eq!(get_path(vec![Value::from("a.b")], &dotted, Value::Null), Value::Int(2));
    }

    #[test]
    fn non_string_paths() {
        assert_eq!(to_path(&Value::Int(0)).segments(), &[Value::Int(0)]);
        assert_eq!(
            to_path(&Value::list([0, 1])).segments(),
            &[Value::Int(0), Value::Int(1)]
        );
        assert_eq!(
            to_path(&Value::tuple([0, 1])).segments(),
            &[Value::tuple([0, 1])]
        );
    }

    #[test]
    fn resolves_nested_values() {
        let obj = Value::from(json!({"a": {"b": {"c": [1, 2, 3, 4]}}}));
        assert_eq!(get_path("a.b.c[1]", &obj, Value::Null), Value::Int(2));
        assert_eq!(get_path("a.b.c.1", &obj, Value::Null), Value::Int(2));
        assert_eq!(get_path("a.b.c.-1", &obj, Value::Null), Value::Int(4));
    }

    #[test]
    fn list_paths_mix_keys_and_indices() {
        let obj = Value::from(json!({"a": {"b": [0, {"c": [1, 2]}]}}));
        let path = vec![
            Value::from("a"),
            Value::from("b"),
            Value::Int(1),
            Value::from("c"),
            Value::Int(1),
        ];
        assert_eq!(get_path(path, &obj, Value::Null), Value::Int(2));
        assert_eq!(get_path("a.b.1.c.2", &obj, Value::from(false)), Value::from(false));
    }

    #[test]
    fn missing_path_stops_at_first_miss() {
        let obj = Value::from(json!({"a": 1}));
        // The default has the remaining segment, but the walk must not descend into it.
        let default = Value::from(json!({"c": "inner"}));
        assert_eq!(get_path("b.c", &obj, default.clone()), default);
    }

    #[test]
    fn numeric_string_keys_on_maps() {
        let obj = Value::map([(Value::Int(1), Value::from("one"))]);
        assert_eq!(get_path("1", &obj, Value::Null), Value::from("one"));
        assert_eq!(get_path(Value::Float(1.0), &obj, Value::Null), Value::from("one"));
    }

    #[test]
    fn tuple_keys() {
        let obj = Value::map([(Value::tuple([1, 2]), Value::from("pair"))]);
        assert_eq!(get_path(Value::tuple([1, 2]), &obj, Value::Null), Value::from("pair"));
        assert!(has_path(vec![Value::tuple([1, 2])], &obj));
    }

    #[test]
    fn has_path_distinguishes_null_values() {
        let obj = Value::from(json!({"a": null}));
        assert!(has_path("a", &obj));
        assert!(!has_path("b", &obj));
        assert!(has_path(1, &Value::list([1, 2, 3])));
    }

    #[test]
    fn try_get_path_reports_segment() {
        let obj = Value::from(json!({"a": {"b": 1}}));
        assert_eq!(try_get_path("a.b", &obj).unwrap(), Value::Int(1));

        match try_get_path("a.x.y", &obj) {
            Err(FncError::PathNotFound { segment, path }) => {
                assert_eq!(segment, Value::from("x"));
                assert_eq!(path.len(), 3);
            }
            other => panic!("expected PathNotFound, got {other:?}"),
        }
    }

    #[test]
    fn lookup_tri_state() {
        let obj = Value::from(json!({"a": 1}));
        let path = Path::parse("a");
        assert_eq!(path.lookup(&obj, Fallback::Raise), Lookup::Found(Value::Int(1)));

        let missing = Path::parse("z");
        assert_eq!(
            missing.lookup(&obj, Fallback::Default(Value::Int(9))),
            Lookup::Defaulted(Value::Int(9))
        );
        assert_eq!(
            missing.lookup(&obj, Fallback::Raise),
            Lookup::NotFound {
                segment: Value::from("z")
            }
        );
    }

    #[test]
    fn strings_are_indexable() {
        assert_eq!(get_path("1", &Value::from("abc"), Value::Null), Value::from("b"));
    }

    #[test]
    fn empty_string_is_a_literal_key() {
        let obj = Value::map([("", 5)]);
        assert_eq!(get_path("", &obj, Value::Null), Value::Int(5));
    }
}
