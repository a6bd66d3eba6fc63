//! Dog Food Calculator (DFC) Library
//!
//! Daily raw food and kibble portion estimates for dogs, with persisted
//! calculator inputs and an MCP tool surface.

pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod portions;
pub mod store;
pub mod tools;

pub use portions::{estimate, estimate_kibble_grams, estimate_raw_food_grams, PortionTables};
