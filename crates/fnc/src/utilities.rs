//! General purpose function builders.
//!
//! Everything here returns a [`Func`], so the results compose with each other
//! and can be passed anywhere an iteratee is accepted.

use rand::Rng;

use crate::error::{FncError, Result};
use crate::iteratee::{Conformance, Iteratee};
use crate::mappings::{at, pick};
use crate::path::{to_path, Fallback, IntoPath, Lookup, Path};
use crate::{Func, Map, Value};

/// Returns its first argument, or `Null` when called without one.
pub fn identity() -> Func {
    Iteratee::Identity.into_func()
}

/// Always returns `value`.
pub fn constant(value: Value) -> Func {
    Func::new(move |_| value.clone())
}

/// Ignores its arguments and returns `Null`.
pub fn noop() -> Func {
    Func::new(|_| Value::Null)
}

/// Returns the boolean negation of an iteratee's result.
pub fn negate(iteratee: impl Into<Iteratee>) -> Func {
    let iteratee = iteratee.into();
    Func::new(move |args| Value::Bool(!iteratee.call(args).is_truthy()))
}

/// Calls every function with the same arguments and returns their results as a tuple.
pub fn over(funcs: impl IntoIterator<Item = Func>) -> Func {
    let funcs: Vec<Func> = funcs.into_iter().collect();
    Func::new(move |args| Value::Tuple(funcs.iter().map(|f| f.call(args)).collect()))
}

/// Returns whether every function returns a truthy value. Stops at the first falsey one.
pub fn over_all(funcs: impl IntoIterator<Item = Func>) -> Func {
    let funcs: Vec<Func> = funcs.into_iter().collect();
    Func::new(move |args| Value::Bool(funcs.iter().all(|f| f.call(args).is_truthy())))
}

/// Returns whether any function returns a truthy value. Stops at the first truthy one.
pub fn over_any(funcs: impl IntoIterator<Item = Func>) -> Func {
    let funcs: Vec<Func> = funcs.into_iter().collect();
    Func::new(move |args| Value::Bool(funcs.iter().any(|f| f.call(args).is_truthy())))
}

/// Runs `hook` before each call to `func`.
pub fn before<H>(hook: H, func: Func) -> Func
where
    H: Fn() + 'static,
{
    Func::new(move |args| {
        hook();
        func.call(args)
    })
}

/// Runs `hook` after each call to `func`.
pub fn after<H>(hook: H, func: Func) -> Func
where
    H: Fn() + 'static,
{
    Func::new(move |args| {
        let result = func.call(args);
        hook();
        result
    })
}

/// Binds leading positional arguments.
pub fn partial(func: Func, bound: Vec<Value>) -> Func {
    Func::new(move |args| {
        let mut all = bound.clone();
        all.extend_from_slice(args);
        func.call(&all)
    })
}

/// One stage of a [`compose`] pipeline.
#[derive(Debug, Clone)]
pub enum Step {
    /// Called as-is.
    Func(Func),
    /// Called with these leading arguments followed by the pipeline input.
    Partial(Func, Vec<Value>),
}

impl Step {
    fn into_func(self) -> Func {
        match self {
            Step::Func(f) => f,
            Step::Partial(f, bound) => partial(f, bound),
        }
    }
}

impl From<Func> for Step {
    fn from(f: Func) -> Self {
        Step::Func(f)
    }
}

impl From<(Func, Vec<Value>)> for Step {
    fn from((f, bound): (Func, Vec<Value>)) -> Self {
        Step::Partial(f, bound)
    }
}

/// Chains functions left to right.
///
/// The first step receives every argument; each later step receives only the
/// previous step's result. An empty pipeline returns `Null`.
///
/// ```
/// use fnc::{compose, funcs, Func, Step, Value};
///
/// let total_age = compose([
///     Step::Partial(funcs::map(), vec![Value::from("age")]),
///     Step::Func(Func::unary(|ages| {
///         Value::Int(ages.to_vec().iter().filter_map(Value::as_int).sum())
///     })),
/// ]);
///
/// let people = Value::list([
///     Value::map([("age", 30)]),
///     Value::map([("age", 12)]),
/// ]);
/// assert_eq!(total_age.call1(&people), Value::Int(42));
/// ```
pub fn compose<S>(steps: impl IntoIterator<Item = S>) -> Func
where
    S: Into<Step>,
{
    let funcs: Vec<Func> = steps.into_iter().map(|s| s.into().into_func()).collect();
    Func::new(move |args| {
        let mut funcs = funcs.iter();
        let Some(first) = funcs.next() else {
            return Value::Null;
        };
        funcs.fold(first.call(args), |result, f| f.call1(&result))
    })
}

/// Returns whether `target` conforms to `source`.
///
/// Each key of `source` is a path into `target`. A function value is used as
/// a predicate on the resolved value; any other value must be equal to it.
pub fn conforms(source: &Map, target: &Value) -> bool {
    Conformance::new(source).matches(target)
}

/// Builds a predicate from [`conforms`].
pub fn conformance(source: &Map) -> Func {
    Iteratee::Conforms(Conformance::new(source)).into_func()
}

/// Returns whether every path in `source` resolves in `target` to an equal value.
///
/// Unlike [`conforms`], function values are compared by identity.
pub fn is_match(source: &Map, target: &Value) -> bool {
    source.iter().all(|(key, expected)| {
        matches!(
            to_path(key).lookup(target, Fallback::Raise),
            Lookup::Found(actual) if &actual == expected
        )
    })
}

/// Builds a predicate from [`is_match`].
pub fn matches(source: Map) -> Func {
    Func::unary(move |target| Value::Bool(is_match(&source, target)))
}

/// Builds a getter for the value at `path`.
pub fn path_getter(path: impl IntoPath, default: Value) -> Func {
    Iteratee::Path {
        path: path.into_path(),
        default,
    }
    .into_func()
}

/// Builds a getter for [`pick`].
pub fn pick_getter(keys: impl IntoIterator<Item = Value>) -> Func {
    let keys: Vec<Value> = keys.into_iter().collect();
    Func::unary(move |obj| pick(keys.iter().cloned(), obj))
}

/// Builds a getter for [`at`].
pub fn at_getter<P: IntoPath>(paths: impl IntoIterator<Item = P>) -> Func {
    let paths: Vec<Path> = paths.into_iter().map(IntoPath::into_path).collect();
    Func::unary(move |obj| at(paths.iter(), obj))
}

/// Resolves iteratee shorthand into a callable.
pub fn iteratee(shorthand: impl Into<Iteratee>) -> Func {
    shorthand.into().into_func()
}

/// Returns a random number between `start` and `stop`, inclusive.
///
/// The bounds may be given in either order. The result is a float when
/// `floating` is set or either bound is a float, an integer otherwise.
pub fn random(start: impl Into<Value>, stop: impl Into<Value>, floating: bool) -> Result<Value> {
    let (start, stop) = (start.into(), stop.into());
    let mut rng = rand::thread_rng();

    if let (false, Value::Int(a), Value::Int(b)) = (floating, &start, &stop) {
        let (low, high) = if a <= b { (*a, *b) } else { (*b, *a) };
        return Ok(Value::Int(rng.gen_range(low..=high)));
    }

    match (start.as_float(), stop.as_float()) {
        (Some(a), Some(b)) if (a - b).is_finite() => {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            Ok(Value::Float(rng.gen_range(low..=high)))
        }
        _ => Err(FncError::InvalidArgument(format!(
            "random bounds must be numbers with a finite span, got {start} and {stop}"
        ))),
    }
}
