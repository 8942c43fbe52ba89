// SPDX-License-Identifier: Apache-2.0

//! Sanitization stage: strips personally identifying data from every record
//! and writes the gzip intermediate artifact the report stage consumes.
//!
//! No record is dropped here. The stage expects to run after a clean
//! validation pass and does no row-level filtering of its own.

use std::path::Path;

use joblens_core::jsonio::{load_json_array, write_json_array_gz};
use joblens_core::sha256_hex;
use joblens_core::stagelog::{PipelineStage, StageLog};
use joblens_model::SanitizeSummary;
use serde_json::Value;

use crate::{PipelineError, Redactor, SanitizeOptions};

/// Keys removed from every record regardless of value.
const KEYS_TO_REMOVE: &[&str] = &["session_id", "history_id"];

/// Digest length of the sanitized `user_id`: first 16 hex chars of the
/// unsalted SHA-256 over the value's string form. Unsalted by contract,
/// cross-run comparability of hashed identifiers is part of it.
const USER_DIGEST_LEN: usize = 16;

const PROGRESS_INTERVAL: usize = 25_000;

/// Deterministic one-way digest of a user identifier; null maps to `None`.
#[must_use]
pub fn hash_user_id(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    };
    let mut digest = sha256_hex(text.as_bytes());
    digest.truncate(USER_DIGEST_LEN);
    Some(digest)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeCounters {
    pub hashed_user_ids: usize,
    pub dropped_keys: usize,
    pub redacted_fields: usize,
}

/// Sanitize records in place, preserving order and count.
pub fn sanitize_records(records: &mut [Value], log: &mut StageLog) -> SanitizeCounters {
    let redactor = Redactor;
    let mut counters = SanitizeCounters::default();

    for (index, record) in records.iter_mut().enumerate() {
        let Value::Object(map) = record else {
            continue;
        };

        if let Some(user_id) = map.get_mut("user_id") {
            match hash_user_id(user_id) {
                Some(digest) => {
                    *user_id = Value::String(digest);
                    counters.hashed_user_ids += 1;
                }
                None => *user_id = Value::Null,
            }
        }

        for key in KEYS_TO_REMOVE {
            if map.remove(*key).is_some() {
                counters.dropped_keys += 1;
            }
        }

        for value in map.values_mut() {
            if let Value::String(text) = value {
                let (redacted, changed) = redactor.redact(text);
                if changed {
                    *text = redacted;
                    counters.redacted_fields += 1;
                }
            }
        }

        if (index + 1) % PROGRESS_INTERVAL == 0 {
            log.emit_count(PipelineStage::Sanitize, "sanitize.progress", index + 1);
        }
    }

    counters
}

pub fn sanitize_file(
    input: &Path,
    options: &SanitizeOptions,
    log: &mut StageLog,
) -> Result<SanitizeSummary, PipelineError> {
    log.emit(
        PipelineStage::Load,
        "sanitize.load",
        [("path".to_string(), input.display().to_string())].into(),
    );
    let mut records = load_json_array(input)?;
    log.emit_count(PipelineStage::Load, "sanitize.loaded", records.len());

    let counters = sanitize_records(&mut records, log);

    let output_path = write_json_array_gz(&options.output_path, &records)?;
    let output_bytes = std::fs::read(&output_path)
        .map_err(|e| PipelineError(format!("cannot re-read {}: {e}", output_path.display())))?;
    let output_sha256 = sha256_hex(&output_bytes);
    log.emit(
        PipelineStage::Sanitize,
        "sanitize.written",
        [
            ("path".to_string(), output_path.display().to_string()),
            ("records".to_string(), records.len().to_string()),
        ]
        .into(),
    );

    Ok(SanitizeSummary::new(
        records.len(),
        counters.hashed_user_ids,
        counters.dropped_keys,
        counters.redacted_fields,
        output_path,
        output_sha256,
    ))
}
