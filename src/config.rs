use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

pub const DEFAULT_DB_NAME: &str = "bienban";
pub const DEFAULT_STORAGE_KEY: &str = "bienban_data_v1";
pub const DEFAULT_DRAFT_KEY: &str = "bienban_neon_last";
pub const DEFAULT_REPORT_CREATOR: &str = "Admin User";

// Image payloads are stored inline as data URIs, so the map is sized well
// above what plain text records would need.
pub const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;

/// Settings for opening a record store.
///
/// Every field has a default, so hosts can send a partial JSON object:
///
/// ```rust
/// use confirmation_core::config::StoreConfig;
///
/// let config = StoreConfig::from_json(r#"{"name":"factory_a"}"#)?;
/// assert_eq!(config.name, "factory_a");
/// assert_eq!(config.storage_key, "bienban_data_v1");
/// # Ok::<(), confirmation_core::app_response::AppResponse>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Database name; the LMDB environment lives in `<name>.lmdb`.
    pub name: String,
    pub storage_key: String,
    pub draft_key: String,
    pub map_size: usize,
    /// Attribution stamped on records created through the form.
    pub report_creator: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DB_NAME.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            draft_key: DEFAULT_DRAFT_KEY.to_string(),
            map_size: DEFAULT_MAP_SIZE,
            report_creator: DEFAULT_REPORT_CREATOR.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        let config: StoreConfig = serde_json::from_str(json)?;
        if config.name.trim().is_empty() {
            return Err(AppResponse::BadRequest("Database name cannot be empty".to_string()));
        }
        Ok(config)
    }

    pub fn lmdb_dir(&self) -> String {
        format!("{}.lmdb", self.name)
    }
}
