//! Proc macros for fnc.
//!
//! # Available Macros
//!
//! ## Derive Macros
//!
//! - [`Record`] - Expose a struct's named fields as path-addressable attributes
//!
//! The generated code refers to `::fnc`, so the macro is meant to be used
//! through the re-export in the `fnc` crate.
//!
//! For working examples, see `fnc/tests/record_derive.rs`.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Record` trait for structs with named fields.
///
/// Every field becomes an attribute named after the field. The field type
/// must be `Clone` and convertible into `fnc::Value`.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `skip` | Exclude this field from the record |
/// | `rename = "..."` | Expose the field under a different attribute name |
///
/// # Generated Code
///
/// 1. `Record::attr()` matching attribute names to field values
/// 2. `Record::keys()` listing attribute names in declaration order
/// 3. `Record::type_name()` returning the struct name
///
/// # Example
///
/// ```ignore
/// use fnc::{get_path, Record, Value};
///
/// #[derive(Clone, Record)]
/// struct User {
///     name: String,
///
///     #[record(rename = "years")]
///     age: u32,
///
///     #[record(skip)]
///     password: String,
/// }
///
/// let user = Value::object(User {
///     name: "fred".into(),
///     age: 40,
///     password: "hunter2".into(),
/// });
///
/// assert_eq!(get_path("years", &user, Value::Null), Value::Int(40));
/// assert_eq!(get_path("password", &user, Value::Null), Value::Null);
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
