//! Device-local key-value storage.
//!
//! Mirrors the semantics of browser local storage: string keys, string
//! values, each `get`/`set` atomic on its own but no transactions spanning
//! calls. Callers that read-modify-write a key race with other writers
//! under last-write-wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::KvError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    fn remove(&self, key: &str) -> Result<(), KvError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        (**self).remove(key)
    }
}

/// Volatile store, used for ephemeral sessions and as a test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let entries = self.entries.lock().map_err(|_| KvError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut entries = self.entries.lock().map_err(|_| KvError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        let mut entries = self.entries.lock().map_err(|_| KvError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
