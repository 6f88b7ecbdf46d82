//! Thread-safe handle over a single [`Database`].
//!
//! `rusqlite::Connection` is not `Sync`, so every adapter that needs to be
//! shared across tasks goes through this mutex. Calls are short and never
//! hold the lock across an `.await`.

use std::sync::{Arc, Mutex};

use crate::database::Database;
use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Run `f` with exclusive access to the database.
    pub fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let guard = self.db.lock().map_err(|_| StoreError::Poisoned)?;
        f(&guard)
    }
}
