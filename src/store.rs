//! Key-value store for persisted form state
//!
//! The calculator reads each key once at start-up and writes on every change.
//! Any backend implementing [`ValueStore`] can be injected.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::db::{Database, DbResult};
use crate::models::SavedValue;

/// String-keyed store of string values
pub trait ValueStore {
    /// Read the value for `key`, `None` if it was never written
    fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Write several entries; backends that can should apply all or none
    fn set_many(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<S: ValueStore + ?Sized> ValueStore for &S {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> DbResult<()> {
        (**self).set(key, value)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        (**self).set_many(entries)
    }
}

/// Store backed by the `saved_values` table
#[derive(Clone)]
pub struct SqliteValueStore {
    database: Database,
}

impl SqliteValueStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl ValueStore for SqliteValueStore {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        self.database
            .with_conn(|conn| Ok(SavedValue::get(conn, key)?.map(|v| v.value)))
    }

    fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.database.with_conn(|conn| {
            SavedValue::set(conn, key, value)?;
            Ok(())
        })
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        self.database.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            for (key, value) in entries {
                SavedValue::set(&tx, key, value)?;
            }
            tx.commit()?;
            Ok(())
        })
    }
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ValueStore for MemoryValueStore {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in entries {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn sqlite_store() -> SqliteValueStore {
        let database = Database::in_memory().unwrap();
        database.with_conn(|conn| run_migrations(conn)).unwrap();
        SqliteValueStore::new(database)
    }

    fn exercise(store: &dyn ValueStore) {
        assert_eq!(store.get("weight").unwrap(), None);
        store.set("weight", "10").unwrap();
        store.set("weight", "12").unwrap();
        store.set("age_weeks", "9").unwrap();
        store.set_many(&[("weight", "12"), ("age_weeks", "9")]).unwrap();
        assert_eq!(store.get("weight").unwrap().as_deref(), Some("12"));
        assert_eq!(store.get("age_weeks").unwrap().as_deref(), Some("9"));
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryValueStore::new());
    }

    #[test]
    fn test_sqlite_store() {
        exercise(&sqlite_store());
    }

    #[test]
    fn test_sqlite_set_many_is_all_or_nothing() {
        let store = sqlite_store();
        store.set("weight", "10").unwrap();

        // Reject any write to the age key
        store
            .database
            .with_conn(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER reject_age BEFORE INSERT ON saved_values
                     WHEN NEW.key = 'age_weeks'
                     BEGIN SELECT RAISE(ABORT, 'age rejected'); END;",
                )?;
                Ok(())
            })
            .unwrap();

        assert!(store.set_many(&[("weight", "60"), ("age_weeks", "200")]).is_err());
        assert_eq!(store.get("weight").unwrap().as_deref(), Some("10"));
        assert_eq!(store.get("age_weeks").unwrap(), None);
    }

    #[test]
    fn test_sqlite_store_shares_database_between_clones() {
        let store = sqlite_store();
        let other = store.clone();
        store.set("weight", "40").unwrap();
        assert_eq!(other.get("weight").unwrap().as_deref(), Some("40"));
    }
}
