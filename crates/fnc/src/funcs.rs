//! Operators as [`Func`] handles.
//!
//! Each handle takes its iteratee (or other leading argument) first and the
//! input last, so it can be partially applied and chained with
//! [`compose`](crate::compose). Inputs are read with [`Value::to_vec`] and
//! results are materialized into `List` values.

use crate::iteratee::Iteratee;
use crate::path::get_path;
use crate::{sequences, Func, Map, Value};

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Null)
}

fn last(args: &[Value]) -> Vec<Value> {
    args.last().map(Value::to_vec).unwrap_or_default()
}

fn grouped<T>(groups: indexmap::IndexMap<Value, T>) -> Value
where
    T: Into<Value>,
{
    groups
        .into_iter()
        .map(|(key, group)| (key, group.into()))
        .collect::<Map>()
        .into()
}

macro_rules! iteratee_handle {
    ($(#[$doc:meta] $name:ident => $op:path;)*) => {
        $(
            #[$doc]
            pub fn $name() -> Func {
                Func::new(|args| {
                    let iteratee = Iteratee::new(arg(args, 0));
                    $op(iteratee, last(args)).collect()
                })
            }
        )*
    };
}

iteratee_handle! {
    /// `(iteratee, seq)` → [`sequences::map`].
    map => sequences::map;
    /// `(iteratee, seq)` → [`sequences::filter`].
    filter => sequences::filter;
    /// `(iteratee, seq)` → [`sequences::reject`].
    reject => sequences::reject;
    /// `(iteratee, seq)` → [`sequences::map_flat`].
    map_flat => sequences::map_flat;
    /// `(iteratee, seq)` → [`sequences::map_cat`].
    map_cat => sequences::map_cat;
}

/// `(seq)` → [`sequences::compact`].
pub fn compact() -> Func {
    Func::new(|args| sequences::compact(last(args)).collect())
}

fn chained(args: &[Value]) -> impl Iterator<Item = Value> + '_ {
    args.iter().flat_map(Value::to_vec)
}

/// `(seq, ...)` → [`sequences::flatten`] of every argument, end to end.
pub fn flatten() -> Func {
    Func::new(|args| sequences::flatten(chained(args)).collect())
}

/// `(seq, ...)` → [`sequences::flatten_deep`] of every argument, end to end.
pub fn flatten_deep() -> Func {
    Func::new(|args| sequences::flatten_deep(chained(args)).collect())
}

/// `(iteratee, seq)` → [`sequences::group_by`], as a map of lists.
pub fn group_by() -> Func {
    Func::new(|args| grouped(sequences::group_by(arg(args, 0), last(args))))
}

/// `(iteratee, seq)` → [`sequences::count_by`].
pub fn count_by() -> Func {
    Func::new(|args| grouped(sequences::count_by(arg(args, 0), last(args))))
}

/// `(iteratee, seq)` → [`sequences::key_by`].
pub fn key_by() -> Func {
    Func::new(|args| sequences::key_by(arg(args, 0), last(args)).into())
}

/// `(iteratee, seq)` → [`sequences::partition`], as a `(truthy, falsey)` tuple.
pub fn partition() -> Func {
    Func::new(|args| {
        let (truthy, falsey) = sequences::partition(arg(args, 0), last(args));
        Value::tuple([Value::from(truthy), Value::from(falsey)])
    })
}

/// `(seq, ...)` → [`sequences::union`] of every argument.
pub fn union() -> Func {
    Func::new(|args| sequences::union(args.iter().map(Value::to_vec)).collect())
}

/// `(values, seq)` → [`sequences::without`].
pub fn without() -> Func {
    Func::new(|args| sequences::without(arg(args, 0).to_vec(), last(args)).collect())
}

/// `(path, obj)` or `(path, obj, default)` → [`get_path`].
pub fn get() -> Func {
    Func::new(|args| get_path(arg(args, 0), &arg(args, 1), arg(args, 2)))
}
