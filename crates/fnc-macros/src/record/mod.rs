//! Implementation of the `#[derive(Record)]` macro.
//!
//! This module generates `fnc::Record` implementations from named struct
//! fields, so user types can be addressed by path strings and iterated as
//! key/value pairs.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
