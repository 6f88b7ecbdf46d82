use rusqlite::{params, OptionalExtension};
use tribute_shared::error::KvError;
use tribute_shared::kv::KeyValueStore;

use crate::database::Database;
use crate::error::Result;
use crate::shared::SqliteStore;

impl Database {
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, KvError> {
        Ok(self.with_db(|db| db.kv_get(key))?)
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), KvError> {
        Ok(self.with_db(|db| db.kv_set(key, value))?)
    }

    fn remove(&self, key: &str) -> std::result::Result<(), KvError> {
        self.with_db(|db| db.kv_remove(key))?;
        Ok(())
    }
}
