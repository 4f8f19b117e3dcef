//! The authoritative ordered record collection.
//!
//! [`RecordStore`] keeps the records in memory and writes the whole sequence
//! through a [`KeyValueStore`] after every mutation. A mutation whose write
//! fails is rolled back, so memory and storage never disagree once a call
//! returns.

use std::mem;

use log::{info, warn};
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::exporters::{parse_import, ImportKind};
use crate::persistence::KeyValueStore;
use crate::record_model::{sample_records, Record, RecordDraft};
use crate::sanitizer::sanitize_all;

pub struct RecordStore<S: KeyValueStore> {
    backend: S,
    storage_key: String,
    draft_key: String,
    records: Vec<Record>,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Opens the store and loads whatever is persisted under the configured
    /// key. See [`RecordStore::load`] for the fallback rules.
    pub fn open(backend: S, config: &StoreConfig) -> Self {
        let mut store = Self {
            backend,
            storage_key: config.storage_key.clone(),
            draft_key: config.draft_key.clone(),
            records: Vec::new(),
        };
        store.records = store.load();
        info!(
            "Record store opened with {} records (key '{}')",
            store.records.len(),
            store.storage_key
        );
        store
    }

    /// Reads the persisted sequence. Absent, unreadable or non-array data
    /// yields the built-in sample set; this never fails.
    pub fn load(&self) -> Vec<Record> {
        let raw = match self.backend.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!("No persisted records under '{}', using sample data", self.storage_key);
                return sample_records();
            }
            Err(e) => {
                warn!("Failed to read persisted records, using sample data: {e}");
                return sample_records();
            }
        };

        match serde_json::from_str::<JsonValue>(&raw) {
            Ok(JsonValue::Array(items)) => sanitize_all(&items),
            Ok(_) => {
                warn!("Persisted records are not an array, using sample data");
                sample_records()
            }
            Err(e) => {
                warn!("Failed to parse persisted records, using sample data: {e}");
                sample_records()
            }
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Adds a record at the end. Id uniqueness is the caller's concern.
    pub fn append(&mut self, record: Record) -> Result<(), AppResponse> {
        self.records.push(record);
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Overwrites the record at `position`, returning the previous one.
    pub fn replace_at(&mut self, position: usize, record: Record) -> Result<Record, AppResponse> {
        if position >= self.records.len() {
            return Err(AppResponse::out_of_range(position, self.records.len()));
        }
        let previous = mem::replace(&mut self.records[position], record);

        if let Err(e) = self.persist() {
            self.records[position] = previous;
            return Err(e);
        }
        Ok(previous)
    }

    pub fn remove_at(&mut self, position: usize) -> Result<Record, AppResponse> {
        if position >= self.records.len() {
            return Err(AppResponse::out_of_range(position, self.records.len()));
        }
        let removed = self.records.remove(position);

        if let Err(e) = self.persist() {
            self.records.insert(position, removed);
            return Err(e);
        }
        Ok(removed)
    }

    /// Substitutes the entire contents.
    pub fn replace_all(&mut self, records: Vec<Record>) -> Result<(), AppResponse> {
        let previous = mem::replace(&mut self.records, records);
        if let Err(e) = self.persist() {
            self.records = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn reset_to_sample(&mut self) -> Result<(), AppResponse> {
        self.replace_all(sample_records())?;
        info!("Record store reset to sample data");
        Ok(())
    }

    /// Replaces the contents with the records parsed from an imported file.
    /// On any format error the store is left untouched.
    pub fn import(&mut self, file_name: &str, text: &str) -> Result<usize, AppResponse> {
        let kind = ImportKind::from_file_name(file_name)?;
        let imported = parse_import(kind, text)?;
        let count = imported.len();
        self.replace_all(imported)?;
        info!("Imported {count} records from {file_name}");
        Ok(count)
    }

    /// Writes the full ordered sequence under the storage key.
    pub fn persist(&mut self) -> Result<(), AppResponse> {
        let json = serde_json::to_string(&self.records)?;
        self.backend.set(&self.storage_key, &json)
    }

    pub fn save_draft(&mut self, draft: &RecordDraft) -> Result<(), AppResponse> {
        let json = serde_json::to_string(draft)?;
        self.backend.set(&self.draft_key, &json)
    }

    /// The last saved form draft. A corrupt draft is discarded with a warning.
    pub fn load_draft(&self) -> Result<Option<RecordDraft>, AppResponse> {
        let raw = match self.backend.get(&self.draft_key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        match serde_json::from_str(&raw) {
            Ok(draft) => Ok(Some(draft)),
            Err(e) => {
                warn!("Discarding unreadable form draft: {e}");
                Ok(None)
            }
        }
    }

    pub fn clear_draft(&mut self) -> Result<bool, AppResponse> {
        self.backend.remove(&self.draft_key)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }
}
