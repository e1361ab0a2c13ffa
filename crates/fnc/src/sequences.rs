//! Sequence operators.
//!
//! Operators take their iteratee first and their input sequences last. Inputs
//! are any `IntoIterator<Item = Value>` and are consumed on demand: unless
//! documented otherwise, an operator returns a lazy iterator that pulls from
//! its input only as far as the caller reads.
//!
//! The set-like operators ([`union`], [`intersection`], [`difference`],
//! [`duplicates`] and their `_by` variants) work over unhashable values via
//! [`SeenSet`] and always yield items in the order they are first seen,
//! scanning the primary sequence first.
//!
//! # Example
//!
//! ```
//! use fnc::{filter, map, Value};
//! use serde_json::json;
//!
//! let users = Value::from(json!([
//!     {"name": "fred", "active": true},
//!     {"name": "barney", "active": false},
//! ]));
//!
//! let names: Vec<Value> = map("name", filter("active", users.to_vec())).collect();
//! assert_eq!(names, vec![Value::from("fred")]);
//! ```

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::error::{FncError, Result};
use crate::iteratee::Iteratee;
use crate::{Map, SeenSet, Value};

// ============================================================================
// Mapping and filtering
// ============================================================================

/// Applies an iteratee to each item.
pub fn map<I>(iteratee: impl Into<Iteratee>, seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    seq.into_iter().map(move |item| iteratee.apply(&item))
}

/// Applies an iteratee to items drawn from several sequences in lockstep.
///
/// The iteratee receives one argument per sequence. Iteration stops when the
/// shortest sequence is exhausted.
pub fn map_many<I, S>(iteratee: impl Into<Iteratee>, seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    let mut iters: Vec<S::IntoIter> = seqs.into_iter().map(IntoIterator::into_iter).collect();
    std::iter::from_fn(move || {
        if iters.is_empty() {
            return None;
        }
        let args = iters
            .iter_mut()
            .map(Iterator::next)
            .collect::<Option<Vec<Value>>>()?;
        Some(iteratee.call(&args))
    })
    .fuse()
}

/// Keeps items for which the iteratee returns a truthy value.
pub fn filter<I>(iteratee: impl Into<Iteratee>, seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    seq.into_iter().filter(move |item| iteratee.test(item))
}

/// Drops items for which the iteratee returns a truthy value.
pub fn reject<I>(iteratee: impl Into<Iteratee>, seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    seq.into_iter().filter(move |item| !iteratee.test(item))
}

/// Drops falsey items.
pub fn compact<I>(seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    seq.into_iter().filter(Value::is_truthy)
}

/// Chains sequences end to end.
pub fn concat<I, S>(seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    seqs.into_iter().flatten()
}

// ============================================================================
// Searching
// ============================================================================

/// Returns the first item for which the iteratee is truthy.
pub fn find<I>(iteratee: impl Into<Iteratee>, seq: I) -> Option<Value>
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    seq.into_iter().find(|item| iteratee.test(item))
}

/// Returns the index of the first item for which the iteratee is truthy.
pub fn find_index<I>(iteratee: impl Into<Iteratee>, seq: I) -> Option<usize>
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    seq.into_iter().position(|item| iteratee.test(&item))
}

/// Returns the last item for which the iteratee is truthy.
///
/// Consumes the whole sequence.
pub fn find_last<I>(iteratee: impl Into<Iteratee>, seq: I) -> Option<Value>
where
    I: IntoIterator<Item = Value>,
{
    filter(iteratee, seq).last()
}

/// Returns the index of the last item for which the iteratee is truthy.
///
/// Consumes the whole sequence.
pub fn find_last_index<I>(iteratee: impl Into<Iteratee>, seq: I) -> Option<usize>
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    seq.into_iter()
        .enumerate()
        .filter(|(_, item)| iteratee.test(item))
        .map(|(index, _)| index)
        .last()
}

// ============================================================================
// Grouping
// ============================================================================

/// Groups items into buckets keyed by the iteratee result.
///
/// Keys and bucket contents keep first-seen order.
///
/// ```
/// use fnc::{group_by, Value};
/// use serde_json::json;
///
/// let rows = Value::from(json!([{"a": 1, "b": 2}, {"a": 3, "b": 4}]));
/// let groups = group_by("a", rows.to_vec());
/// assert_eq!(groups[&Value::Int(1)], vec![Value::from(json!({"a": 1, "b": 2}))]);
/// assert_eq!(groups.len(), 2);
/// ```
pub fn group_by<I>(iteratee: impl Into<Iteratee>, seq: I) -> IndexMap<Value, Vec<Value>>
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    let mut groups: IndexMap<Value, Vec<Value>> = IndexMap::new();
    for item in seq {
        groups.entry(iteratee.apply(&item)).or_default().push(item);
    }
    groups
}

/// Counts items per iteratee result.
pub fn count_by<I>(iteratee: impl Into<Iteratee>, seq: I) -> IndexMap<Value, usize>
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    let mut counts: IndexMap<Value, usize> = IndexMap::new();
    for item in seq {
        *counts.entry(iteratee.apply(&item)).or_default() += 1;
    }
    counts
}

/// Indexes items by iteratee result. The last item with a given key wins.
pub fn key_by<I>(iteratee: impl Into<Iteratee>, seq: I) -> Map
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    seq.into_iter()
        .map(|item| (iteratee.apply(&item), item))
        .collect()
}

/// Groups recursively, one level per iteratee.
///
/// With no iteratees the items are returned as a list. Otherwise the result
/// is a map from first-level keys to the grouping of each bucket by the
/// remaining iteratees.
pub fn group_all<T, I>(iteratees: impl IntoIterator<Item = T>, seq: I) -> Value
where
    T: Into<Iteratee>,
    I: IntoIterator<Item = Value>,
{
    let iteratees: Vec<Iteratee> = iteratees.into_iter().map(Into::into).collect();
    group_levels(&iteratees, seq.into_iter().collect())
}

fn group_levels(iteratees: &[Iteratee], items: Vec<Value>) -> Value {
    let Some((head, rest)) = iteratees.split_first() else {
        return Value::from(items);
    };
    group_by(head.clone(), items)
        .into_iter()
        .map(|(key, bucket)| (key, group_levels(rest, bucket)))
        .collect::<Map>()
        .into()
}

/// Splits items into those for which the iteratee is truthy and the rest.
pub fn partition<I>(iteratee: impl Into<Iteratee>, seq: I) -> (Vec<Value>, Vec<Value>)
where
    I: IntoIterator<Item = Value>,
{
    let iteratee = iteratee.into();
    seq.into_iter().partition(|item| iteratee.test(item))
}

// ============================================================================
// Set operations
// ============================================================================

fn key_of(iteratee: Option<&Iteratee>, item: &Value) -> Value {
    match iteratee {
        Some(iteratee) => iteratee.apply(item),
        None => item.clone(),
    }
}

/// Membership of the non-primary sequences, computed on first use.
struct Others<R> {
    pending: Option<Vec<R>>,
    keys: SeenSet,
}

impl<R> Others<R>
where
    R: Iterator<Item = Value>,
{
    fn new(rest: Vec<R>) -> Self {
        Others {
            pending: Some(rest),
            keys: SeenSet::new(),
        }
    }

    /// Collects the keys found in any of the other sequences.
    fn union(&mut self, iteratee: Option<&Iteratee>) -> &SeenSet {
        if let Some(rest) = self.pending.take() {
            self.keys = rest
                .into_iter()
                .flatten()
                .map(|item| key_of(iteratee, &item))
                .collect();
        }
        &self.keys
    }

    /// Collects the keys found in every one of the other sequences.
    fn intersection(&mut self, iteratee: Option<&Iteratee>) -> &SeenSet {
        if let Some(rest) = self.pending.take() {
            let mut rest = rest.into_iter();
            let mut common: Vec<Value> = Vec::new();
            if let Some(first) = rest.next() {
                let mut seen = SeenSet::new();
                common = first
                    .map(|item| key_of(iteratee, &item))
                    .filter(|key| seen.add(key.clone()))
                    .collect();
            }
            for other in rest {
                let keys: SeenSet = other.map(|item| key_of(iteratee, &item)).collect();
                common.retain(|key| keys.contains(key));
            }
            self.keys = common.into_iter().collect();
        }
        &self.keys
    }
}

enum Membership<R> {
    /// Every key once.
    Unique,
    /// Keys absent from the other sequences.
    Exclude(Others<R>),
    /// Keys present in all the other sequences.
    Require(Others<R>),
    /// Keys seen at least twice; holds the keys seen so far.
    Repeated(SeenSet),
}

/// Single-pass scan shared by the set operators.
struct SetScan<P, R> {
    items: P,
    iteratee: Option<Iteratee>,
    membership: Membership<R>,
    yielded: SeenSet,
}

impl<P, R> SetScan<P, R> {
    fn new(items: P, iteratee: Option<Iteratee>, membership: Membership<R>) -> Self {
        SetScan {
            items,
            iteratee,
            membership,
            yielded: SeenSet::new(),
        }
    }
}

impl<P, R> Iterator for SetScan<P, R>
where
    P: Iterator<Item = Value>,
    R: Iterator<Item = Value>,
{
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let iteratee = self.iteratee.as_ref();
        for item in self.items.by_ref() {
            let key = key_of(iteratee, &item);
            if self.yielded.contains(&key) {
                continue;
            }
            let keep = match &mut self.membership {
                Membership::Unique => true,
                Membership::Exclude(others) => !others.union(iteratee).contains(&key),
                Membership::Require(others) => others.intersection(iteratee).contains(&key),
                Membership::Repeated(seen) => !seen.add(key.clone()),
            };
            if keep {
                self.yielded.add(key);
                return Some(item);
            }
        }
        None
    }
}

type Rest<S> = <S as IntoIterator>::IntoIter;

fn split_primary<I, S>(seqs: I) -> (impl Iterator<Item = Value>, Vec<Rest<S>>)
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    let mut seqs = seqs.into_iter();
    let primary = seqs.next().into_iter().flatten();
    let rest = seqs.map(IntoIterator::into_iter).collect();
    (primary, rest)
}

fn unique_scan<I, S>(
    iteratee: Option<Iteratee>,
    seqs: I,
) -> SetScan<impl Iterator<Item = Value>, std::iter::Empty<Value>>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    SetScan::new(seqs.into_iter().flatten(), iteratee, Membership::Unique)
}

/// Yields each distinct item across all sequences once, in first-seen order.
///
/// ```
/// use fnc::{union, Value};
///
/// let merged: Vec<Value> = union([Value::list([1, 2, 3]).to_vec(), Value::list([2, 3, 4]).to_vec()]).collect();
/// assert_eq!(merged, Value::list([1, 2, 3, 4]).to_vec());
/// ```
pub fn union<I, S>(seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    unique_scan(None, seqs)
}

/// Like [`union`], comparing items by iteratee result.
pub fn union_by<I, S>(iteratee: impl Into<Iteratee>, seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    unique_scan(Some(iteratee.into()), seqs)
}

#[derive(Clone, Copy)]
enum Against {
    Exclude,
    Require,
}

fn scan_against<I, S>(
    iteratee: Option<Iteratee>,
    seqs: I,
    against: Against,
) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    let (primary, rest) = split_primary(seqs);
    let membership = match against {
        _ if rest.is_empty() => Membership::Unique,
        Against::Exclude => Membership::Exclude(Others::new(rest)),
        Against::Require => Membership::Require(Others::new(rest)),
    };
    SetScan::new(primary, iteratee, membership)
}

/// Yields distinct items of the first sequence that appear in none of the others.
///
/// With a single sequence this is the same as [`union`].
pub fn difference<I, S>(seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    scan_against(None, seqs, Against::Exclude)
}

/// Like [`difference`], comparing items by iteratee result.
pub fn difference_by<I, S>(iteratee: impl Into<Iteratee>, seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    scan_against(Some(iteratee.into()), seqs, Against::Exclude)
}

/// Yields distinct items of the first sequence that appear in all of the others.
///
/// With a single sequence this is the same as [`union`].
pub fn intersection<I, S>(seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    scan_against(None, seqs, Against::Require)
}

/// Like [`intersection`], comparing items by iteratee result.
pub fn intersection_by<I, S>(
    iteratee: impl Into<Iteratee>,
    seqs: I,
) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    scan_against(Some(iteratee.into()), seqs, Against::Require)
}

/// Yields each repeated item once, at its second occurrence across all sequences.
pub fn duplicates<I, S>(seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    SetScan::<_, std::iter::Empty<Value>>::new(
        seqs.into_iter().flatten(),
        None,
        Membership::Repeated(SeenSet::new()),
    )
}

/// Like [`duplicates`], comparing items by iteratee result.
pub fn duplicates_by<I, S>(iteratee: impl Into<Iteratee>, seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    SetScan::<_, std::iter::Empty<Value>>::new(
        seqs.into_iter().flatten(),
        Some(iteratee.into()),
        Membership::Repeated(SeenSet::new()),
    )
}

/// Symmetric difference: items found in exactly one of the sequences.
///
/// Folds pairwise from the left. Every input is collected before the first
/// item is produced, since each pair is scanned twice. A single sequence is
/// returned as-is.
pub fn xor<I, S>(seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    let mut seqs = seqs.into_iter();
    let mut acc: Vec<Value> = seqs
        .next()
        .map(|seq| seq.into_iter().collect())
        .unwrap_or_default();
    for next in seqs {
        let next: Vec<Value> = next.into_iter().collect();
        let common: Vec<Value> = intersection([acc.clone(), next.clone()]).collect();
        let all: Vec<Value> = union([acc, next]).collect();
        acc = difference([all, common]).collect();
    }
    acc.into_iter()
}

/// Yields items not equal to any of `values`.
///
/// `values` is scanned linearly for each item.
pub fn without<V, I>(values: V, seq: I) -> impl Iterator<Item = Value>
where
    V: IntoIterator<Item = Value>,
    I: IntoIterator<Item = Value>,
{
    let values: Vec<Value> = values.into_iter().collect();
    seq.into_iter().filter(move |item| !values.contains(item))
}

// ============================================================================
// Flattening
// ============================================================================

fn unroll(item: Value) -> Vec<Value> {
    match item.elements() {
        Some(items) => items,
        None => vec![item],
    }
}

/// Unrolls one level of nested collections. Text and bytes are not unrolled.
pub fn flatten<I>(seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    seq.into_iter().flat_map(unroll)
}

/// Unrolls nested collections at any depth.
pub fn flatten_deep<I>(seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    DeepFlatten {
        source: seq.into_iter(),
        stack: Vec::new(),
    }
}

struct DeepFlatten<I> {
    source: I,
    stack: Vec<std::vec::IntoIter<Value>>,
}

impl<I> Iterator for DeepFlatten<I>
where
    I: Iterator<Item = Value>,
{
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        loop {
            let item = match self.stack.last_mut() {
                Some(top) => match top.next() {
                    Some(item) => item,
                    None => {
                        self.stack.pop();
                        continue;
                    }
                },
                None => self.source.next()?,
            };
            match item.elements() {
                Some(items) => self.stack.push(items.into_iter()),
                None => return Some(item),
            }
        }
    }
}

/// [`map`] followed by [`flatten`].
pub fn map_flat<I>(iteratee: impl Into<Iteratee>, seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    flatten(map(iteratee, seq))
}

/// [`map`] followed by [`flatten_deep`].
pub fn map_flat_deep<I>(iteratee: impl Into<Iteratee>, seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    flatten_deep(map(iteratee, seq))
}

/// [`map`] followed by concatenation of each result.
///
/// Unlike [`map_flat`], text and bytes results are unrolled into characters
/// and integers. Results that cannot be iterated are yielded as they are.
pub fn map_cat<I>(iteratee: impl Into<Iteratee>, seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    map(iteratee, seq).flat_map(|item| match item {
        Value::Str(_) | Value::Bytes(_) => item.to_vec(),
        other => unroll(other),
    })
}

// ============================================================================
// Weaving and batching
// ============================================================================

/// Takes one item from each sequence in turn, dropping sequences as they run out.
///
/// ```
/// use fnc::{interleave, Value};
///
/// let woven: Vec<Value> = interleave([
///     Value::list([1, 2, 3]).to_vec(),
///     Value::list([4]).to_vec(),
///     Value::list([5, 6]).to_vec(),
/// ])
/// .collect();
/// assert_eq!(woven, Value::list([1, 4, 5, 2, 6, 3]).to_vec());
/// ```
pub fn interleave<I, S>(seqs: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Value>,
{
    let mut queue: VecDeque<S::IntoIter> = seqs.into_iter().map(IntoIterator::into_iter).collect();
    std::iter::from_fn(move || {
        while let Some(mut seq) = queue.pop_front() {
            if let Some(item) = seq.next() {
                queue.push_back(seq);
                return Some(item);
            }
        }
        None
    })
}

/// Places `separator` between adjacent items.
pub fn intersperse<I>(separator: Value, seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    let mut items = seq.into_iter().peekable();
    let mut separate = false;
    std::iter::from_fn(move || {
        if separate && items.peek().is_some() {
            separate = false;
            return Some(separator.clone());
        }
        let item = items.next()?;
        separate = true;
        Some(item)
    })
}

/// [`intersperse`] followed by [`flatten`].
pub fn intercalate<I>(separator: Value, seq: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    flatten(intersperse(separator, seq))
}

/// Splits items into consecutive batches of `size`. The last batch may be shorter.
///
/// Fails with [`FncError::InvalidArgument`] when `size` is zero.
pub fn chunk<I>(size: usize, seq: I) -> Result<impl Iterator<Item = Vec<Value>>>
where
    I: IntoIterator<Item = Value>,
{
    if size == 0 {
        return Err(FncError::InvalidArgument(
            "chunk size must be greater than zero".to_string(),
        ));
    }
    let mut items = seq.into_iter();
    Ok(std::iter::from_fn(move || {
        let batch: Vec<Value> = items.by_ref().take(size).collect();
        (!batch.is_empty()).then_some(batch)
    }))
}

/// Transposes rows into tuples, truncating to the shortest row.
///
/// All rows are collected before the first tuple is produced.
pub fn unzip<I>(rows: I) -> impl Iterator<Item = Value>
where
    I: IntoIterator<Item = Value>,
{
    let rows: Vec<Vec<Value>> = rows.into_iter().map(|row| row.to_vec()).collect();
    let width = rows.iter().map(Vec::len).min().unwrap_or(0);
    (0..width).map(move |column| Value::Tuple(rows.iter().map(|row| row[column].clone()).collect()))
}
