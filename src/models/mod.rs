//! Data models
//!
//! Rust structs representing database entities.

mod saved_value;

pub use saved_value::SavedValue;
