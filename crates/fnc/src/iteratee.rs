//! Iteratee resolution.
//!
//! Every operator that applies a function per element accepts an iteratee.
//! Besides a real callable, an iteratee may be given as shorthand data:
//!
//! | shorthand | resolves to |
//! |-----------|-------------|
//! | [`Value::Func`] | the function itself |
//! | [`Value::Null`] | identity |
//! | [`Value::Map`] | a conformance matcher ([`Conformance`]) |
//! | [`Value::Set`] | a pick-getter ([`crate::pick`]) |
//! | [`Value::Tuple`] | an at-getter ([`crate::at`]) |
//! | anything else | a path-getter ([`crate::get_path`]) with a `Null` default |
//!
//! Resolution happens once, when the [`Iteratee`] is built, and the dispatch
//! is total: every value maps to exactly one variant.

use crate::mappings::pick;
use crate::path::{get_path, to_path, Fallback, IntoPath, Lookup, Path};
use crate::{Func, Map, Value};

/// A resolved iteratee.
#[derive(Debug, Clone, Default)]
pub enum Iteratee {
    /// Returns its first argument.
    #[default]
    Identity,
    /// Calls a function with all arguments.
    Func(Func),
    /// Returns the value at `path`, or `default`.
    Path { path: Path, default: Value },
    /// Returns a map of the listed keys present in the argument.
    Pick(Vec<Value>),
    /// Returns a tuple of the values at each path.
    At(Vec<Path>),
    /// Returns whether the argument conforms to a set of path expectations.
    Conforms(Conformance),
}

impl Iteratee {
    /// Resolves iteratee shorthand.
    pub fn new(shorthand: Value) -> Self {
        match shorthand {
            Value::Func(f) => Iteratee::Func(f),
            Value::Null => Iteratee::Identity,
            Value::Map(map) => Iteratee::Conforms(Conformance::new(&map)),
            Value::Set(keys) => Iteratee::Pick(keys.iter().cloned().collect()),
            Value::Tuple(paths) => Iteratee::At(paths.iter().map(to_path).collect()),
            other => Iteratee::Path {
                path: to_path(&other),
                default: Value::Null,
            },
        }
    }

    /// Wraps a unary closure.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + 'static,
    {
        Iteratee::Func(Func::unary(f))
    }

    /// Wraps a boolean predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        Iteratee::Func(Func::predicate(f))
    }

    /// Calls the iteratee with positional arguments.
    ///
    /// Only [`Iteratee::Func`] sees more than the first argument.
    pub fn call(&self, args: &[Value]) -> Value {
        let null = Value::Null;
        let first = args.first().unwrap_or(&null);
        match self {
            Iteratee::Identity => first.clone(),
            Iteratee::Func(f) => f.call(args),
            Iteratee::Path { path, default } => get_path(path, first, default.clone()),
            Iteratee::Pick(keys) => pick(keys.iter().cloned(), first),
            Iteratee::At(paths) => {
                Value::Tuple(paths.iter().map(|p| get_path(p, first, Value::Null)).collect())
            }
            Iteratee::Conforms(conformance) => Value::Bool(conformance.matches(first)),
        }
    }

    /// Calls the iteratee with a single argument.
    pub fn apply(&self, item: &Value) -> Value {
        self.call(std::slice::from_ref(item))
    }

    /// Calls the iteratee and coerces the result to a boolean.
    pub fn test(&self, item: &Value) -> bool {
        self.apply(item).is_truthy()
    }

    /// Converts the iteratee into a plain callable.
    pub fn into_func(self) -> Func {
        match self {
            Iteratee::Func(f) => f,
            other => Func::new(move |args| other.call(args)),
        }
    }
}

impl From<Value> for Iteratee {
    fn from(value: Value) -> Self {
        Iteratee::new(value)
    }
}

impl From<&Value> for Iteratee {
    fn from(value: &Value) -> Self {
        Iteratee::new(value.clone())
    }
}

impl From<&str> for Iteratee {
    fn from(path: &str) -> Self {
        Iteratee::new(Value::from(path))
    }
}

impl From<String> for Iteratee {
    fn from(path: String) -> Self {
        Iteratee::new(Value::from(path))
    }
}

impl From<Vec<Value>> for Iteratee {
    fn from(path: Vec<Value>) -> Self {
        Iteratee::new(Value::from(path))
    }
}

macro_rules! index_iteratee {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Iteratee {
                fn from(index: $ty) -> Self {
                    Iteratee::new(Value::from(index))
                }
            }
        )*
    };
}

index_iteratee!(i32, i64, usize);

impl From<Func> for Iteratee {
    fn from(f: Func) -> Self {
        Iteratee::Func(f)
    }
}

impl From<Path> for Iteratee {
    fn from(path: Path) -> Self {
        Iteratee::Path {
            path,
            default: Value::Null,
        }
    }
}

impl From<Conformance> for Iteratee {
    fn from(conformance: Conformance) -> Self {
        Iteratee::Conforms(conformance)
    }
}

/// A list of `(path, expected)` checks.
///
/// A candidate conforms when every path resolves and either equals the
/// expected value or, when the expected value is a function, makes that
/// function return a truthy value. Checking stops at the first failure.
#[derive(Debug, Clone, Default)]
pub struct Conformance(Vec<(Path, Value)>);

impl Conformance {
    /// Builds checks from a map of path keys to expected values.
    pub fn new(source: &Map) -> Self {
        Conformance(source.iter().map(|(k, v)| (to_path(k), v.clone())).collect())
    }

    /// Adds a check.
    pub fn with(mut self, path: impl IntoPath, expected: impl Into<Value>) -> Self {
        self.0.push((path.into_path(), expected.into()));
        self
    }

    pub fn matches(&self, target: &Value) -> bool {
        self.0.iter().all(|(path, expected)| {
            let Lookup::Found(actual) = path.lookup(target, Fallback::Raise) else {
                return false;
            };
            match expected {
                Value::Func(predicate) => predicate.call1(&actual).is_truthy(),
                expected => &actual == expected,
            }
        })
    }
}
