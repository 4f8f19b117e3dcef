//! The key/value persistence collaborator the record store writes through.

use std::collections::HashMap;

use crate::app_response::AppResponse;

/// Durable text storage addressed by key.
///
/// `set` must be durable when it returns; the store relies on that to treat a
/// mutation as complete.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppResponse>;

    /// Returns whether the key existed.
    fn remove(&mut self, key: &str) -> Result<bool, AppResponse>;
}

/// Process-local storage, for hosts without a writable filesystem.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppResponse> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, AppResponse> {
        Ok(self.entries.remove(key).is_some())
    }
}
