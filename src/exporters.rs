//! JSON and delimited-text codecs for the record set.
//!
//! The delimited format is deliberately naive: fields are joined and split on
//! `,` with no quoting, so values containing commas or newlines do not survive
//! a CSV round-trip. JSON round-trips unconditionally.

use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::record_model::Record;
use crate::record_schema::{field_names, Field};
use crate::sanitizer::{sanitize_all, sanitize_row};

pub const JSON_EXPORT_FILE_NAME: &str = "bienban_data.json";
pub const CSV_EXPORT_FILE_NAME: &str = "bienban_data.csv";

/// File types accepted by import, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Json,
    Csv,
}

impl ImportKind {
    pub fn from_file_name(file_name: &str) -> Result<Self, AppResponse> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".csv") {
            Ok(ImportKind::Csv)
        } else if lower.ends_with(".json") {
            Ok(ImportKind::Json)
        } else {
            Err(AppResponse::ImportFormat(format!(
                "Unsupported file type: {file_name}"
            )))
        }
    }
}

/// Pretty-printed JSON array, keys in schema order.
pub fn to_json(records: &[Record]) -> Result<String, AppResponse> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Header line of schema field names, then one line per record.
pub fn to_csv(records: &[Record]) -> String {
    let head = field_names().collect::<Vec<_>>().join(",");
    let body = records
        .iter()
        .map(|record| {
            Field::ALL
                .iter()
                .map(|field| record.field_text(*field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{head}\n{body}")
}

pub fn parse_import(kind: ImportKind, text: &str) -> Result<Vec<Record>, AppResponse> {
    match kind {
        ImportKind::Json => parse_json(text),
        ImportKind::Csv => parse_csv(text),
    }
}

/// Top level must be an array whose elements are all objects.
pub fn parse_json(text: &str) -> Result<Vec<Record>, AppResponse> {
    let text = strip_bom(text);
    let value: JsonValue = serde_json::from_str(text)
        .map_err(|e| AppResponse::ImportFormat(format!("Invalid JSON: {e}")))?;

    let items = match &value {
        JsonValue::Array(items) => items,
        _ => {
            return Err(AppResponse::ImportFormat(
                "Top-level JSON value must be an array of records".to_string(),
            ))
        }
    };

    if let Some(index) = items.iter().position(|item| !item.is_object()) {
        return Err(AppResponse::ImportFormat(format!(
            "Element {index} is not a record object"
        )));
    }

    Ok(sanitize_all(items))
}

/// First non-empty line is the header; each following non-empty line is
/// split on `,` and aligned to it by position.
pub fn parse_csv(text: &str) -> Result<Vec<Record>, AppResponse> {
    let mut lines = strip_bom(text)
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty());

    let headers: Vec<&str> = match lines.next() {
        Some(header) => header.split(',').map(str::trim).collect(),
        None => {
            return Err(AppResponse::ImportFormat(
                "CSV file has no header line".to_string(),
            ))
        }
    };

    Ok(lines
        .map(|line| {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            sanitize_row(
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| (*header, values.get(i).copied().unwrap_or(""))),
            )
        })
        .collect())
}

// Spreadsheet tools prefix UTF-8 exports with a byte-order mark.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}
