use std::fs;
use std::path::Path;

use lmdb::{Database, DatabaseFlags, Environment, Error as LmdbError, Transaction, WriteFlags};
use log::info;

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::persistence::KeyValueStore;

const DB_NAME: &str = "confirmation_store";

/// LMDB-backed key/value storage.
///
/// One environment directory (`<name>.lmdb`) with a single named database.
/// Writes commit before returning, so a successful [`KeyValueStore::set`] is
/// on disk.
pub struct AppDbState {
    env: Environment,
    db: Database,
    path: String,
}

impl AppDbState {
    pub fn init(config: &StoreConfig) -> Result<Self, AppResponse> {
        let path = config.lmdb_dir();
        fs::create_dir_all(&path)?;

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(config.map_size)
            .open(Path::new(&path))?;
        let db = env.create_db(Some(DB_NAME), DatabaseFlags::empty())?;

        info!("LMDB environment opened at {}", path);
        Ok(Self { env, db, path })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Flushes to disk and releases the environment.
    pub fn close_database(self) -> Result<(), AppResponse> {
        self.env.sync(true)?;
        info!("LMDB environment at {} closed", self.path);
        Ok(())
    }
}

impl KeyValueStore for AppDbState {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let txn = self.env.begin_ro_txn()?;
        let value = match txn.get(self.db, &key) {
            Ok(bytes) => Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                AppResponse::SerializationError(format!("Value under '{key}' is not UTF-8: {e}"))
            })?),
            Err(LmdbError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.abort();
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppResponse> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, AppResponse> {
        let mut txn = self.env.begin_rw_txn()?;
        let existed = match txn.del(self.db, &key, None) {
            Ok(()) => true,
            Err(LmdbError::NotFound) => false,
            Err(e) => return Err(e.into()),
        };
        txn.commit()?;
        Ok(existed)
    }
}
