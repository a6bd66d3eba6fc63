//! Runtime configuration
//!
//! Everything is read from the environment:
//! - `DFC_DATABASE_PATH`: SQLite file for saved inputs (default `<project>/data/dfc.db`)
//! - `DFC_TABLES_PATH`: optional JSON file replacing the built-in portion tables

use std::path::PathBuf;

use crate::portions::{PortionTables, TableError};

pub const DATABASE_PATH_VAR: &str = "DFC_DATABASE_PATH";
pub const TABLES_PATH_VAR: &str = "DFC_TABLES_PATH";

/// Label reported when the built-in tables are active
pub const BUILT_IN_TABLES: &str = "built-in";

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = project_dir();
            path.push("data");
            path.push("dfc.db");
            path
        })
}

/// Directory of the executable, or the project root when run from `target/`
fn project_dir() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path
}

/// Tables override path, if configured
pub fn tables_path() -> Option<PathBuf> {
    std::env::var_os(TABLES_PATH_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Load the active portion tables and describe where they came from
pub fn load_tables() -> Result<(PortionTables, String), TableError> {
    match tables_path() {
        Some(path) => {
            let tables = PortionTables::from_json_file(&path)?;
            Ok((tables, path.display().to_string()))
        }
        None => Ok((PortionTables::canonical(), BUILT_IN_TABLES.to_string())),
    }
}
