//! Image payloads are kept as `data:` URIs, the same shape a browser file
//! reader produces, so records stay self-contained JSON.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};

use crate::app_response::AppResponse;

pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

/// Mime type of a `data:` URI, or `None` if the payload is not one.
pub fn mime_type(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, _) = rest.split_once(',')?;
    let mime = meta.split(';').next().unwrap_or("");
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

/// Decodes the payload of a base64 `data:` URI.
pub fn decode(uri: &str) -> Result<Vec<u8>, AppResponse> {
    let (meta, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| AppResponse::BadRequest("Not a data URI".to_string()))?;

    if !meta.ends_with(";base64") {
        return Err(AppResponse::BadRequest(
            "Only base64 data URIs are supported".to_string(),
        ));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AppResponse::BadRequest(format!("Invalid base64 payload: {e}")))
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Reads an image file into a data URI for the `sampleImage` or
/// `patternImage` field.
pub fn read_image_file(path: &Path) -> Result<String, AppResponse> {
    let bytes = fs::read(path)?;
    Ok(encode(mime_for_path(path), &bytes))
}
