//! # Confirmation Core
//!
//! Local record store for production-confirmation documents: product code,
//! customer, sample and production dates, edit notes, reference images, a
//! signature and the customer's agreement. Records are persisted in LMDB,
//! searched and sorted through a derived view, imported from JSON or CSV, and
//! exported as JSON, CSV or PDF.
//!
//! ## Layers
//!
//! - [`record_schema`] / [`record_model`] - the fixed field set and [`record_model::Record`]
//! - [`sanitizer`] - total coercion of external data into records
//! - [`record_store`] - ordered, write-through record collection
//! - [`query_view`] - filter and sort projection
//! - [`exporters`] / [`pdf_export`] - JSON, CSV and PDF output
//! - [`session`] - command handlers tying the above together
//!
//! ## Quick Start
//!
//! ```no_run
//! use confirmation_core::{create_db, get_view, set_sort};
//! use std::ffi::CString;
//!
//! let db_name = CString::new("bienban").unwrap();
//! let session = create_db(db_name.as_ptr());
//!
//! let key = CString::new("productionDate").unwrap();
//! let sorted = set_sort(session, key.as_ptr());
//! ```
//!
//! ## FFI Functions
//!
//! Every function returns a JSON-encoded [`AppResponse`] that the caller
//! releases with [`free_response`]:
//!
//! - [`create_db`] / [`create_db_with_config`] - open a session
//! - [`get_all`] / [`get_view`] - read records or the filtered, sorted rows
//! - [`create_record`] / [`update_record`] / [`delete_record`] - mutate
//! - [`apply_filter`] / [`clear_filter`] / [`set_sort`] - change the view
//! - [`import_records`] / [`reset_to_sample`] - bulk replace
//! - [`export_json`] / [`export_csv`] - text export
//! - [`save_draft`] / [`load_draft`] - keep an unfinished form
//! - [`close_database`] - release the session

pub mod app_response;
pub mod config;
pub mod data_uri;
pub mod exporters;
pub mod local_db_state;
pub mod pdf_export;
pub mod persistence;
pub mod query_view;
pub mod record_model;
pub mod record_schema;
pub mod record_store;
pub mod sanitizer;
pub mod session;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::local_db_state::AppDbState;
use crate::query_view::FilterCriteria;
use crate::record_model::RecordDraft;
use crate::record_schema::Field;
use crate::sanitizer::sanitize_value;
use crate::session::AppSession;

/// Session handle handed to FFI callers.
pub type DbSession = AppSession<AppDbState>;

/// Opens (or creates) the database `<name>.lmdb` with default settings.
///
/// Returns a null pointer if the name is null, not UTF-8, or the environment
/// cannot be opened.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use confirmation_core::create_db;
///
/// let name = CString::new("bienban").unwrap();
/// let session = create_db(name.as_ptr());
/// assert!(!session.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_db(name: *const c_char) -> *mut DbSession {
    if name.is_null() {
        warn!("Null name pointer passed to create_db");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    open_session(StoreConfig::with_name(name_str))
}

/// Opens a session from a JSON [`StoreConfig`]; missing keys take defaults.
///
/// ```no_run
/// use std::ffi::CString;
/// use confirmation_core::create_db_with_config;
///
/// let config = CString::new(r#"{"name":"factory_a","reportCreator":"QA"}"#).unwrap();
/// let session = create_db_with_config(config.as_ptr());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_db_with_config(config_ptr: *const c_char) -> *mut DbSession {
    if config_ptr.is_null() {
        warn!("Null config pointer passed to create_db_with_config");
        return std::ptr::null_mut();
    }

    let json = match unsafe { CStr::from_ptr(config_ptr).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match StoreConfig::from_json(json) {
        Ok(config) => open_session(config),
        Err(e) => {
            warn!("Rejected store config: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_session(config: StoreConfig) -> *mut DbSession {
    info!("Attempting to create/open database at: {}", config.lmdb_dir());

    match AppDbState::init(&config) {
        Ok(db) => {
            info!("Database initialized successfully at {}", db.path());
            let session = AppSession::open(db, &config);
            Box::into_raw(Box::new(session))
        }
        Err(e) => {
            warn!("Failed to initialize database: {e}");
            warn!("Attempted path: {}", config.lmdb_dir());
            std::ptr::null_mut()
        }
    }
}

/// All records in store order.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all(state: *mut DbSession) -> *const c_char {
    let session = match session_ref(state, "get_all") {
        Ok(s) => s,
        Err(err) => return err,
    };
    respond_json(session.store().records())
}

/// The filtered, sorted rows; each row carries its store `position`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_view(state: *mut DbSession) -> *const c_char {
    let session = match session_ref(state, "get_view") {
        Ok(s) => s,
        Err(err) => return err,
    };
    respond_json(&session.view())
}

/// Creates a record from a form draft.
///
/// # JSON Format
///
/// ```json
/// {
///   "productCodeName": "AO-001",
///   "customerName": "Khách Hàng A",
///   "productionDate": "2025-10-05",
///   "formSelection": "existing",
///   "originalForm": "FORM-GOC-XYZ",
///   "agreedToTerms": true,
///   "signature": "data:image/png;base64,..."
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_record(state: *mut DbSession, json_ptr: *const c_char) -> *const c_char {
    let session = match session_mut(state, "create_record") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let draft: RecordDraft = match serde_json::from_str(&json_str) {
        Ok(d) => d,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid draft JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    match session.create_record(&draft) {
        Ok(record) => respond_json(&record),
        Err(e) => response_to_c_string(&e),
    }
}

/// Replaces the record at a store position with the given record JSON.
/// The JSON is sanitized, so partial objects are accepted.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_record(
    state: *mut DbSession,
    position: usize,
    json_ptr: *const c_char,
) -> *const c_char {
    let session = match session_mut(state, "update_record") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let value: serde_json::Value = match serde_json::from_str(&json_str) {
        Ok(v) => v,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid record JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    match session.update_record(position, sanitize_value(&value)) {
        Ok(record) => respond_json(&record),
        Err(e) => response_to_c_string(&e),
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_record(state: *mut DbSession, position: usize) -> *const c_char {
    let session = match session_mut(state, "delete_record") {
        Ok(s) => s,
        Err(err) => return err,
    };

    match session.delete_record(position) {
        Ok(removed) => respond_json(&removed),
        Err(e) => response_to_c_string(&e),
    }
}

/// Sets the search criteria and returns the resulting view.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn apply_filter(state: *mut DbSession, json_ptr: *const c_char) -> *const c_char {
    let session = match session_mut(state, "apply_filter") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let json_str = match c_ptr_to_string(json_ptr, "criteria") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let criteria: FilterCriteria = match serde_json::from_str(&json_str) {
        Ok(c) => c,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid criteria JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    session.apply_filter(criteria);
    respond_json(&session.view())
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_filter(state: *mut DbSession) -> *const c_char {
    let session = match session_mut(state, "clear_filter") {
        Ok(s) => s,
        Err(err) => return err,
    };
    session.clear_filter();
    respond_json(&session.view())
}

/// Sorts by a field name (e.g. `"productionDate"`). Repeating the same key
/// flips the direction.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn set_sort(state: *mut DbSession, key_ptr: *const c_char) -> *const c_char {
    let session = match session_mut(state, "set_sort") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let key = match c_ptr_to_string(key_ptr, "sort key") {
        Ok(k) => k,
        Err(err) => return err,
    };

    let field = match Field::from_name(&key) {
        Some(f) => f,
        None => {
            let error = AppResponse::BadRequest(format!("Unknown sort key: {key}"));
            return response_to_c_string(&error);
        }
    };

    session.set_sort(field);
    respond_json(&session.view())
}

/// Replaces every record with the contents of an imported `.json` or `.csv`
/// file. On a format error the store is unchanged.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn import_records(
    state: *mut DbSession,
    file_name_ptr: *const c_char,
    content_ptr: *const c_char,
) -> *const c_char {
    let session = match session_mut(state, "import_records") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let file_name = match c_ptr_to_string(file_name_ptr, "file name") {
        Ok(name) => name,
        Err(err) => return err,
    };
    let content = match c_ptr_to_string(content_ptr, "file content") {
        Ok(text) => text,
        Err(err) => return err,
    };

    match session.import(&file_name, &content) {
        Ok(count) => response_to_c_string(&AppResponse::Ok(format!("Imported {count} records"))),
        Err(e) => response_to_c_string(&e),
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reset_to_sample(state: *mut DbSession) -> *const c_char {
    let session = match session_mut(state, "reset_to_sample") {
        Ok(s) => s,
        Err(err) => return err,
    };

    match session.reset_to_sample() {
        Ok(()) => response_to_c_string(&AppResponse::success("Sample data restored")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Pretty-printed JSON of the whole record set, in the `Ok` payload.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn export_json(state: *mut DbSession) -> *const c_char {
    let session = match session_ref(state, "export_json") {
        Ok(s) => s,
        Err(err) => return err,
    };

    match session.export_json() {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => response_to_c_string(&e),
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn export_csv(state: *mut DbSession) -> *const c_char {
    let session = match session_ref(state, "export_csv") {
        Ok(s) => s,
        Err(err) => return err,
    };
    response_to_c_string(&AppResponse::Ok(session.export_csv()))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_draft(state: *mut DbSession, json_ptr: *const c_char) -> *const c_char {
    let session = match session_mut(state, "save_draft") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let draft: RecordDraft = match serde_json::from_str(&json_str) {
        Ok(d) => d,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid draft JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    match session.save_draft(&draft) {
        Ok(()) => response_to_c_string(&AppResponse::success("Draft saved")),
        Err(e) => response_to_c_string(&e),
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn load_draft(state: *mut DbSession) -> *const c_char {
    let session = match session_ref(state, "load_draft") {
        Ok(s) => s,
        Err(err) => return err,
    };

    match session.load_draft() {
        Ok(Some(draft)) => respond_json(&draft),
        Ok(None) => response_to_c_string(&AppResponse::NotFound("No saved draft".to_string())),
        Err(e) => response_to_c_string(&e),
    }
}

/// Flushes and releases the session. The pointer must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_database(state: *mut DbSession) -> *const c_char {
    if state.is_null() {
        let error =
            AppResponse::BadRequest("Null state pointer passed to close_database".to_string());
        return response_to_c_string(&error);
    }

    let session = unsafe { Box::from_raw(state) };
    match session.into_backend().close_database() {
        Ok(()) => {
            response_to_c_string(&AppResponse::success("Database connection closed successfully"))
        }
        Err(e) => response_to_c_string(&e),
    }
}

/// Releases a string returned by any function in this library.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn session_ref<'a>(state: *mut DbSession, op: &str) -> Result<&'a DbSession, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(s) => Ok(s),
        None => {
            warn!("Null state pointer passed to {op}");
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {op}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn session_mut<'a>(state: *mut DbSession, op: &str) -> Result<&'a mut DbSession, *const c_char> {
    match unsafe { state.as_mut() } {
        Some(s) => Ok(s),
        None => {
            warn!("Null state pointer passed to {op}");
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {op}"));
            Err(response_to_c_string(&error))
        }
    }
}

/// Serializes `value` into the payload of an `Ok` response.
fn respond_json<T: Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Failed to serialize result: {e}"));
            response_to_c_string(&error)
        }
    }
}

/// Converts an [`AppResponse`] to a C string owned by the caller.
///
/// Returns a null pointer if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust `String`, turning null pointers and
/// invalid UTF-8 into a `BadRequest` response.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
