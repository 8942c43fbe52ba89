// SPDX-License-Identifier: Apache-2.0

//! Compressed JSON array I/O shared by the pipeline stages.
//!
//! Inputs may be plain `.json`, gzip `.json.gz`, or zstd `.json.zst`,
//! selected by extension. The intermediate artifact written between the
//! sanitize and generate stages is always gzip.

use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

#[derive(Debug)]
pub struct JsonIoError(pub String);

impl Display for JsonIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for JsonIoError {}

fn read_bytes(path: &Path) -> Result<Vec<u8>, JsonIoError> {
    let raw = fs::read(path)
        .map_err(|e| JsonIoError(format!("cannot read {}: {e}", path.display())))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if name.ends_with(".gz") {
        let mut decoder = GzDecoder::new(std::io::Cursor::new(raw));
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| JsonIoError(format!("gzip decode failed for {}: {e}", path.display())))?;
        return Ok(out);
    }
    if name.ends_with(".zst") {
        let mut decoder = zstd::stream::read::Decoder::new(std::io::Cursor::new(raw))
            .map_err(|e| JsonIoError(format!("zstd decode failed for {}: {e}", path.display())))?;
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| JsonIoError(format!("zstd decode failed for {}: {e}", path.display())))?;
        return Ok(out);
    }
    Ok(raw)
}

/// Load a JSON array of records. Non-array roots are an error, not an empty
/// result, so callers can report the shape mismatch distinctly.
pub fn load_json_array(path: &Path) -> Result<Vec<Value>, JsonIoError> {
    let bytes = read_bytes(path)?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| JsonIoError(format!("invalid JSON in {}: {e}", path.display())))?;
    match value {
        Value::Array(records) => Ok(records),
        other => Err(JsonIoError(format!(
            "JSON root must be an array of records, got {} in {}",
            json_type_name(&other),
            path.display()
        ))),
    }
}

/// Write a JSON array gzip-compressed. A path without a `.gz` suffix gets one
/// appended; the effective path is returned.
pub fn write_json_array_gz(path: &Path, records: &[Value]) -> Result<PathBuf, JsonIoError> {
    let effective = if path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "gz")
    {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".gz");
        PathBuf::from(name)
    };

    if let Some(parent) = effective.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| JsonIoError(format!("cannot create {}: {e}", parent.display())))?;
        }
    }

    let bytes = serde_json::to_vec(&Value::Array(records.to_vec()))
        .map_err(|e| JsonIoError(format!("JSON encode failed: {e}")))?;
    let file = fs::File::create(&effective)
        .map_err(|e| JsonIoError(format!("cannot create {}: {e}", effective.display())))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(&bytes)
        .map_err(|e| JsonIoError(format!("gzip write failed for {}: {e}", effective.display())))?;
    encoder
        .finish()
        .map_err(|e| JsonIoError(format!("gzip finish failed for {}: {e}", effective.display())))?;
    Ok(effective)
}

#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
