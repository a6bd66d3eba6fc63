//! DFC Status Tool
//!
//! Provides runtime status information about the DFC service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build number and compile time, stamped in by `build.rs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildStamp {
    pub number: u64,
    pub compiled_at: &'static str,
}

impl BuildStamp {
    pub fn current() -> Self {
        Self::parse(
            option_env!("DFC_BUILD_NUMBER"),
            option_env!("DFC_BUILD_TIMESTAMP"),
        )
    }

    /// Missing or malformed stamps fall back to build 0, compiled "unknown"
    fn parse(number: Option<&str>, compiled_at: Option<&'static str>) -> Self {
        Self {
            number: number.and_then(|n| n.trim().parse().ok()).unwrap_or(0),
            compiled_at: compiled_at.unwrap_or("unknown"),
        }
    }
}

/// Usage guide for AI assistants driving the calculator tools
pub const FEEDING_INSTRUCTIONS: &str = r#"
# DFC Feeding Calculator Instructions

The Dog Food Calculator estimates a dog's daily raw food and kibble portions
from two inputs: body weight in **pounds** and age in **weeks**.

## Tools

| Tool | Use it for |
|------|------------|
| `estimate_portions` | One-off estimate from numbers. Nothing is saved. |
| `update_inputs` | Change the saved weight and/or age (as typed text) and get the new result. |
| `get_saved_inputs` | Show the last saved weight/age and their result. |
| `get_portion_tables` | Show the reference tables in use. |

## Reading the Result

- `raw_food_grams` and `kibble_grams` are **full daily amounts** for a diet of
  only raw food or only kibble.
- `daily_blend_grams` is an even 50/50 mix of the two.
- `*_per_meal_grams` split the daily amount into 3 meals.
- `result: null` means one of the inputs is empty, zero, negative, or not a
  number. Ask the user for a corrected value.
- A result of **0 g** means the weight is outside the tables (raw food covers
  0-125 lbs, kibble 3-125 lbs). Do not extrapolate.

## How Amounts Are Chosen

- **Raw food**: dogs under 44 weeks use the puppy range, 44 weeks and older the
  adult range. The amount is interpolated across the weight bracket.
- **Kibble**: age is converted to months (weeks / 4.345) and mapped to a band:
  2-4, 4-8, 8-12 months, or adult. Cups are interpolated between reference
  weights and converted to grams.

## Converting Units

The calculator does not convert units. Convert before calling:
- kg to lbs: multiply by 2.2046
- months to weeks: multiply by 4.345
"#;

/// Runtime status of the DFC service
#[derive(Debug, Clone, Serialize)]
pub struct DfcStatus {
    pub version: &'static str,
    pub build: BuildStamp,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Where the portion tables came from
    pub tables_source: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    tables_source: String,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, tables_source: String) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            tables_source,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> DfcStatus {
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        DfcStatus {
            version: VERSION,
            build: BuildStamp::current(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            tables_source: self.tables_source.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_missing_database() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/dfc.db"), "built-in".into());
        let status = tracker.get_status();
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.tables_source, "built-in");
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.version, VERSION);
    }

    #[test]
    fn test_build_stamp_parse() {
        let stamp = BuildStamp::parse(Some("42"), Some("2026-01-01T00:00:00Z"));
        assert_eq!(stamp.number, 42);
        assert_eq!(stamp.compiled_at, "2026-01-01T00:00:00Z");

        let fallback = BuildStamp::parse(Some("4x2"), None);
        assert_eq!(fallback.number, 0);
        assert_eq!(fallback.compiled_at, "unknown");
    }
}
