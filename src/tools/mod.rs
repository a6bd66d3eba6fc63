//! DFC Tools module
//!
//! MCP tool implementations for the Dog Food Calculator.

pub mod calculator;
pub mod status;
