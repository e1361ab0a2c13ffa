//! Callable values.

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// A shared, n-ary callable over [`Value`]s.
///
/// Every callable in fnc takes a slice of positional arguments and returns a
/// single value. Unary closures are adapted with [`Func::unary`], which passes
/// the first argument (or `Null` when called with none).
///
/// Two `Func`s are equal only if they share the same allocation.
#[derive(Clone)]
pub struct Func(Rc<dyn Fn(&[Value]) -> Value>);

impl Func {
    /// Wraps an n-ary closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        Func(Rc::new(f))
    }

    /// Wraps a closure that only looks at its first argument.
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + 'static,
    {
        Func::new(move |args| f(args.first().unwrap_or(&Value::Null)))
    }

    /// Wraps a boolean predicate over the first argument.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        Func::unary(move |value| Value::Bool(f(value)))
    }

    /// Invokes the callable with positional arguments.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// Invokes the callable with a single argument.
    pub fn call1(&self, arg: &Value) -> Value {
        self.call(std::slice::from_ref(arg))
    }

    /// Returns `true` if both handles point at the same closure.
    pub fn ptr_eq(&self, other: &Func) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for Func {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Func {}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Func(<fn>)")
    }
}
