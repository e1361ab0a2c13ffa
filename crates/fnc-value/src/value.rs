//! Dynamic runtime values.
//!
//! The [`Value`] enum is the currency of every fnc operation: sequence items,
//! path segments, iteratee shorthand and iteratee results are all values.
//! Compound variants are reference counted, so cloning a value is cheap and
//! never copies its contents.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::func::Func;
use crate::record::Record;

/// Insertion-ordered mapping of values.
pub type Map = IndexMap<Value, Value>;

/// Insertion-ordered set of values.
pub type Set = IndexSet<Value>;

/// A dynamically typed value.
///
/// # Equality and hashing
///
/// - `Int` and `Float` compare numerically, so `Value::Int(1) == Value::Float(1.0)`.
/// - `Bool` never equals a number, so `true` and `1` stay distinct in set
///   operations and as map keys. This deliberately differs from dynamic
///   languages where `true == 1`.
/// - `List` and `Tuple` never equal each other, even with the same items.
/// - `Map` and `Set` compare irrespective of insertion order.
/// - `Func` and `Object` compare by identity.
///
/// `List`, `Map` and `Set` are *unhashable* (see [`Value::is_hashable`]). They
/// still implement [`Hash`] consistently with equality, but membership
/// structures such as [`SeenSet`](crate::SeenSet) keep them out of hash
/// buckets.
///
/// # Example
///
/// ```
/// use fnc_value::Value;
///
/// let row = Value::map([("name", Value::from("fred")), ("age", Value::from(40))]);
/// assert_eq!(row.type_name(), "map");
/// assert!(!row.is_hashable());
/// assert_eq!(Value::from(1), Value::from(1.0));
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(Rc<str>),
    /// Raw bytes.
    Bytes(Rc<[u8]>),
    /// Ordered, unhashable sequence.
    List(Rc<[Value]>),
    /// Ordered sequence, hashable when all of its items are.
    Tuple(Rc<[Value]>),
    /// Insertion-ordered mapping.
    Map(Rc<Map>),
    /// Insertion-ordered set.
    Set(Rc<Set>),
    /// Callable.
    Func(Func),
    /// Custom key/value source.
    Object(Rc<dyn Record>),
}

impl Value {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Creates a string value.
    pub fn str(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Creates a list from anything convertible into values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Creates a tuple from anything convertible into values.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Creates a map from key/value pairs. Later duplicates overwrite earlier ones.
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(Rc::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Creates a set from anything convertible into values.
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Set(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Wraps a [`Record`] implementation.
    pub fn object<R: Record + 'static>(record: R) -> Self {
        Value::Object(Rc::new(record))
    }

    /// Wraps a unary closure as a callable value.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + 'static,
    {
        Value::Func(Func::unary(f))
    }

    // ========================================================================
    // Type checks
    // ========================================================================

    /// Returns a short lowercase name for the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Func(_) => "func",
            Value::Object(_) => "object",
        }
    }

    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a callable.
    pub fn is_func(&self) -> bool {
        matches!(self, Value::Func(_))
    }

    /// Returns `true` if this value may be stored in a hash bucket.
    ///
    /// Lists, maps and sets are unhashable; a tuple is hashable only when
    /// every item is.
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Map(_) | Value::Set(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }

    /// Returns `true` if iterating this value yields items and it is not text or bytes.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Tuple(_) | Value::Map(_) | Value::Set(_)
        )
    }

    /// Returns `true` for index-addressable values (lists, tuples, text, bytes).
    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Tuple(_) | Value::Str(_) | Value::Bytes(_)
        )
    }

    /// Returns `true` for maps.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Boolean coercion.
    ///
    /// `Null`, `false`, zero, and empty text, bytes or collections are falsey.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(items) | Value::Tuple(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Set(set) => !set.is_empty(),
            Value::Func(_) => true,
            Value::Object(record) => record.is_truthy(),
        }
    }

    // ========================================================================
    // Extractors
    // ========================================================================

    /// Extracts a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts a number as `f64`, accepting integers too.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extracts text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    /// Extracts the items of a list or tuple.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(&items[..]),
            _ => None,
        }
    }

    /// Extracts a map.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(&**map),
            _ => None,
        }
    }

    /// Extracts a set.
    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::Set(set) => Some(&**set),
            _ => None,
        }
    }

    /// Extracts a callable.
    pub fn as_func(&self) -> Option<&Func> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }

    /// Extracts a record.
    pub fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Value::Object(record) => Some(record.as_ref()),
            _ => None,
        }
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns the items produced by iterating a collection, or `None` for
    /// non-collections.
    ///
    /// Maps yield their keys.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items.to_vec()),
            Value::Set(set) => Some(set.iter().cloned().collect()),
            Value::Map(map) => Some(map.keys().cloned().collect()),
            _ => None,
        }
    }

    /// Like [`elements`](Value::elements), but also unrolls text into
    /// single-character strings and bytes into integers. Other scalars yield
    /// nothing.
    pub fn to_vec(&self) -> Vec<Value> {
        match self {
            Value::Str(s) => s.chars().map(Value::from).collect(),
            Value::Bytes(bytes) => bytes.iter().map(|b| Value::Int(i64::from(*b))).collect(),
            other => other.elements().unwrap_or_default(),
        }
    }
}

/// Converts a float to the integer it equals exactly, if any.
pub(crate) fn float_as_int(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it overflows i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && f >= -LIMIT && f < LIMIT {
        Some(f as i64)
    } else {
        None
    }
}

fn object_addr(record: &Rc<dyn Record>) -> usize {
    Rc::as_ptr(record) as *const () as usize
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                float_as_int(*b) == Some(*a)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => object_addr(a) == object_addr(b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Int(n) => {
                2u8.hash(state);
                n.hash(state);
            }
            Value::Float(f) => match float_as_int(*f) {
                // Integral floats must land in the same bucket as the equal integer.
                Some(n) => {
                    2u8.hash(state);
                    n.hash(state);
                }
                None => {
                    3u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            Value::Str(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Value::Bytes(b) => {
                5u8.hash(state);
                b.hash(state);
            }
            Value::Tuple(items) => {
                6u8.hash(state);
                items.len().hash(state);
                for item in items.iter() {
                    item.hash(state);
                }
            }
            // Unhashable variants only contribute their tag.
            Value::List(_) => 7u8.hash(state),
            Value::Map(_) => 8u8.hash(state),
            Value::Set(_) => 9u8.hash(state),
            Value::Func(f) => {
                10u8.hash(state);
                f.addr().hash(state);
            }
            Value::Object(record) => {
                11u8.hash(state);
                object_addr(record).hash(state);
            }
        }
    }
}

// ============================================================================
// Display
// ============================================================================

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            Value::List(items) => {
                f.write_str("[")?;
                write_items(f, items.iter())?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items.iter())?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Set(set) if set.is_empty() => f.write_str("set()"),
            Value::Set(set) => {
                f.write_str("{")?;
                write_items(f, set.iter())?;
                f.write_str("}")
            }
            Value::Func(_) => f.write_str("<func>"),
            Value::Object(record) => write!(f, "<{}>", record.type_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_lossless_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Int(i64::from(n))
                }
            }
        )*
    };
}

from_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! from_wide_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    i64::try_from(n).map_or(Value::Float(n as f64), Value::Int)
                }
            }
        )*
    };
}

from_wide_int!(u64, usize, isize);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Str(c.to_string().into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::Str(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(Rc::new(map))
    }
}

impl From<Set> for Value {
    fn from(set: Set) -> Self {
        Value::Set(Rc::new(set))
    }
}

impl From<Func> for Value {
    fn from(f: Func) -> Self {
        Value::Func(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Tuple(vec![a.into(), b.into()].into())
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Value::Tuple(vec![a.into(), b.into(), c.into()].into())
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.into()),
            serde_json::Value::Array(items) => items.into_iter().map(Value::from).collect(),
            serde_json::Value::Object(fields) => Value::map(fields),
        }
    }
}

// ============================================================================
// Serde
// ============================================================================

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::List(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Set(set) => {
                let mut seq = serializer.serialize_seq(Some(set.len()))?;
                for item in set.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Object(record) => {
                let entries = record.entries();
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in &entries {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Func(_) => Err(S::Error::custom("functions cannot be serialized")),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
