//! Membership tracking over hashable and unhashable values.

use std::collections::HashSet;

use crate::value::Value;

/// A write-once membership accumulator.
///
/// Hashable values live in a hash set; unhashable ones (lists, maps, sets and
/// tuples containing them) are kept in an insertion-ordered list and found by
/// linear scan. Values are never removed.
///
/// ```
/// use fnc_value::{SeenSet, Value};
///
/// let mut seen = SeenSet::new();
/// assert!(seen.add(Value::Int(1)));
/// assert!(seen.add(Value::list([1, 2])));
/// assert!(!seen.add(Value::Float(1.0)));
/// assert!(seen.contains(&Value::list([1, 2])));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    hashable: HashSet<Value>,
    unhashable: Vec<Value>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if an equal value has been added.
    pub fn contains(&self, value: &Value) -> bool {
        if value.is_hashable() {
            self.hashable.contains(value)
        } else {
            self.unhashable.contains(value)
        }
    }

    /// Adds a value, returning `true` if it was not already present.
    pub fn add(&mut self, value: Value) -> bool {
        if value.is_hashable() {
            self.hashable.insert(value)
        } else if self.unhashable.contains(&value) {
            false
        } else {
            self.unhashable.push(value);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.hashable.len() + self.unhashable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<Value> for SeenSet {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<Value> for SeenSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut seen = SeenSet::new();
        seen.extend(iter);
        seen
    }
}
