//! Uniform key/value access over mappings, sequences and records.
//!
//! Path resolution and the mapping helpers never match on [`Value`] variants
//! directly. They go through an [`Accessor`], which classifies a value once
//! and then offers item lookup, attribute lookup and key/value iteration.

use std::str::Chars;

use crate::record::Record;
use crate::value::{Map, Value};

/// Index-addressable contents of a sequence value.
#[derive(Debug, Clone, Copy)]
pub enum Sequence<'a> {
    /// Lists and tuples.
    Items(&'a [Value]),
    /// Text, addressed by character.
    Text(&'a str),
    /// Raw bytes, addressed by byte.
    Bytes(&'a [u8]),
}

impl Sequence<'_> {
    /// Number of addressable elements.
    pub fn len(&self) -> usize {
        match self {
            Sequence::Items(items) => items.len(),
            Sequence::Text(text) => text.chars().count(),
            Sequence::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Sequence::Items(items) => items.is_empty(),
            Sequence::Text(text) => text.is_empty(),
            Sequence::Bytes(bytes) => bytes.is_empty(),
        }
    }

    /// Returns the element at `index`; negative indices count from the end.
    pub fn get(&self, index: i64) -> Option<Value> {
        let len = i64::try_from(self.len()).ok()?;
        let index = if index < 0 { index + len } else { index };
        if index < 0 || index >= len {
            return None;
        }
        let index = usize::try_from(index).ok()?;
        match self {
            Sequence::Items(items) => items.get(index).cloned(),
            Sequence::Text(text) => text.chars().nth(index).map(Value::from),
            Sequence::Bytes(bytes) => bytes.get(index).map(|b| Value::Int(i64::from(*b))),
        }
    }
}

/// The access adapter selected for a value.
#[derive(Clone, Copy)]
pub enum Accessor<'a> {
    /// Maps: keyed item access.
    Mapping(&'a Map),
    /// Lists, tuples, text and bytes: integer item access.
    Sequence(Sequence<'a>),
    /// Records: item access plus attribute access.
    Source(&'a dyn Record),
    /// Everything else: no access at all.
    Opaque,
}

impl<'a> Accessor<'a> {
    /// Classifies a value.
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Map(map) => Accessor::Mapping(map),
            Value::List(items) | Value::Tuple(items) => Accessor::Sequence(Sequence::Items(items)),
            Value::Str(text) => Accessor::Sequence(Sequence::Text(text)),
            Value::Bytes(bytes) => Accessor::Sequence(Sequence::Bytes(bytes)),
            Value::Object(record) => Accessor::Source(record.as_ref()),
            _ => Accessor::Opaque,
        }
    }

    /// Returns `true` for the built-in containers (maps and sequences).
    ///
    /// Attribute fallback only applies to values that are not built-in.
    pub fn is_builtin(&self) -> bool {
        matches!(self, Accessor::Mapping(_) | Accessor::Sequence(_))
    }

    /// Subscript access: `container[key]`.
    ///
    /// Sequences accept integer (and boolean) indices only.
    pub fn item(&self, key: &Value) -> Option<Value> {
        match self {
            Accessor::Mapping(map) => map.get(key).cloned(),
            Accessor::Sequence(seq) => {
                let index = match key {
                    Value::Int(n) => *n,
                    Value::Bool(b) => i64::from(*b),
                    _ => return None,
                };
                seq.get(index)
            }
            Accessor::Source(record) => record.item(key),
            Accessor::Opaque => None,
        }
    }

    /// Attribute access: `container.name`. Only records have attributes.
    pub fn attr(&self, name: &str) -> Option<Value> {
        match self {
            Accessor::Source(record) => record.attr(name),
            _ => None,
        }
    }

    /// Iterates `(key, value)` pairs.
    ///
    /// Maps yield their entries, sequences yield `(index, element)`, records
    /// yield [`Record::entries`]. Opaque values yield nothing.
    pub fn entries(&self) -> Entries<'a> {
        match *self {
            Accessor::Mapping(map) => Entries::Mapping(map.iter()),
            Accessor::Sequence(Sequence::Items(items)) => Entries::Items(items.iter().enumerate()),
            Accessor::Sequence(Sequence::Text(text)) => Entries::Text(text.chars().enumerate()),
            Accessor::Sequence(Sequence::Bytes(bytes)) => Entries::Bytes(bytes.iter().enumerate()),
            Accessor::Source(record) => Entries::Owned(record.entries().into_iter()),
            Accessor::Opaque => Entries::Empty,
        }
    }
}

/// Iterates the `(key, value)` pairs of any value.
///
/// Shorthand for `Accessor::classify(value).entries()`.
pub fn iterate(value: &Value) -> Entries<'_> {
    Accessor::classify(value).entries()
}

/// Iterator returned by [`Accessor::entries`].
pub enum Entries<'a> {
    Mapping(indexmap::map::Iter<'a, Value, Value>),
    Items(std::iter::Enumerate<std::slice::Iter<'a, Value>>),
    Text(std::iter::Enumerate<Chars<'a>>),
    Bytes(std::iter::Enumerate<std::slice::Iter<'a, u8>>),
    Owned(std::vec::IntoIter<(Value, Value)>),
    Empty,
}

fn index_key(i: usize) -> Value {
    Value::from(i)
}

impl Iterator for Entries<'_> {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Entries::Mapping(iter) => iter.next().map(|(k, v)| (k.clone(), v.clone())),
            Entries::Items(iter) => iter.next().map(|(i, v)| (index_key(i), v.clone())),
            Entries::Text(iter) => iter.next().map(|(i, c)| (index_key(i), Value::from(c))),
            Entries::Bytes(iter) => iter
                .next()
                .map(|(i, b)| (index_key(i), Value::Int(i64::from(*b)))),
            Entries::Owned(iter) => iter.next(),
            Entries::Empty => None,
        }
    }
}
