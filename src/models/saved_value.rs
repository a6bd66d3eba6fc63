//! Saved value model
//!
//! Persists the last-entered calculator inputs, one row per key.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A stored key/value pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedValue {
    pub key: String,
    pub value: String,
    pub created_at: String,
    pub updated_at: String,
}

impl SavedValue {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get("key")?,
            value: row.get("value")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the value stored under `key`
    pub fn get(conn: &Connection, key: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM saved_values WHERE key = ?1")?;

        let result = stmt.query_row([key], Self::from_row);
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or replace the value stored under `key` (upsert)
    pub fn set(conn: &Connection, key: &str, value: &str) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO saved_values (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![key, value],
        )?;

        Self::get(conn, key)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}
