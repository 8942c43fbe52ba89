// SPDX-License-Identifier: Apache-2.0

//! Structure validation of a raw failed-job export.
//!
//! The validator is read-only. Fatal input problems (missing file, bad JSON,
//! non-array root) surface as `PipelineError`; per-record problems become
//! findings with the record index and are never fatal on their own.

use std::collections::BTreeSet;
use std::path::Path;

use joblens_core::jsonio::{json_type_name, load_json_array};
use joblens_core::stagelog::{PipelineStage, StageLog};
use joblens_model::{
    FieldSpec, JsonKind, ValidationFinding, ValidationReport, ValidationStats, OPTIONAL_FIELDS,
    REQUIRED_FIELDS,
};
use serde_json::Value;

use crate::{PipelineError, ValidateOptions};

pub fn validate_file(
    path: &Path,
    options: &ValidateOptions,
    log: &mut StageLog,
) -> Result<ValidationReport, PipelineError> {
    log.emit(
        PipelineStage::Load,
        "validate.load",
        [("path".to_string(), path.display().to_string())].into(),
    );
    let records = load_json_array(path)?;
    let total = records.len();
    log.emit_count(PipelineStage::Load, "validate.loaded", total);

    let check_count = if options.sample_size == 0 {
        total
    } else {
        options.sample_size.min(total)
    };

    let mut findings: Vec<ValidationFinding> = Vec::new();
    let mut truncated = false;
    let mut fields_found: BTreeSet<String> = BTreeSet::new();
    let mut states_found: BTreeSet<String> = BTreeSet::new();

    for (index, record) in records.iter().take(check_count).enumerate() {
        check_record(record, index, &mut findings);

        if let Value::Object(map) = record {
            fields_found.extend(map.keys().cloned());
            if let Some(Value::String(state)) = map.get("state") {
                states_found.insert(state.clone());
            }
        }

        if findings.len() > options.max_findings {
            truncated = true;
            break;
        }
    }

    // Beyond the sample only the record shape is checked.
    if !truncated && options.sample_size > 0 && total > check_count {
        for (index, record) in records.iter().enumerate().skip(check_count) {
            if !record.is_object() {
                findings.push(ValidationFinding::new(
                    index,
                    format!("not an object (got {})", json_type_name(record)),
                ));
                if findings.len() > options.max_findings {
                    truncated = true;
                    break;
                }
            }
        }
    }

    if truncated {
        findings.truncate(options.max_findings);
    }

    let required_fields_present = REQUIRED_FIELDS
        .iter()
        .all(|spec| fields_found.contains(spec.name));

    let stats = ValidationStats::new(
        total,
        check_count,
        fields_found.into_iter().collect(),
        states_found.into_iter().collect(),
        required_fields_present,
    );
    log.emit_count(PipelineStage::Validate, "validate.findings", findings.len());

    Ok(ValidationReport::new(stats, findings, truncated))
}

fn check_record(record: &Value, index: usize, findings: &mut Vec<ValidationFinding>) {
    let Value::Object(map) = record else {
        findings.push(ValidationFinding::new(
            index,
            format!("not an object (got {})", json_type_name(record)),
        ));
        return;
    };

    for spec in REQUIRED_FIELDS {
        match map.get(spec.name) {
            None => findings.push(ValidationFinding::new(
                index,
                format!("missing required field '{}'", spec.name),
            )),
            Some(value) => {
                if let Some(message) = kind_mismatch(spec, value) {
                    findings.push(ValidationFinding::new(index, message));
                }
            }
        }
    }

    for spec in OPTIONAL_FIELDS {
        if let Some(value) = map.get(spec.name) {
            if value.is_null() {
                continue;
            }
            if let Some(message) = kind_mismatch(spec, value) {
                findings.push(ValidationFinding::new(index, message));
            }
        }
    }
}

fn kind_mismatch(spec: &FieldSpec, value: &Value) -> Option<String> {
    let ok = match spec.kind {
        JsonKind::Integer => value.is_i64() || value.is_u64(),
        JsonKind::Number => value.is_number(),
        JsonKind::String => value.is_string(),
        JsonKind::NonEmptyString => value.as_str().is_some_and(|s| !s.is_empty()),
        JsonKind::Timestamp => {
            return match value.as_str() {
                Some(s) if is_iso8601_shaped(s) => None,
                Some(s) => Some(format!(
                    "field '{}' not in ISO8601 format: {}",
                    spec.name,
                    s.chars().take(30).collect::<String>()
                )),
                None => Some(format!(
                    "field '{}' has wrong type (got {}, expected ISO8601 string)",
                    spec.name,
                    json_type_name(value)
                )),
            };
        }
    };

    if ok {
        None
    } else {
        Some(format!(
            "field '{}' has wrong type (got {}, expected {})",
            spec.name,
            json_type_name(value),
            kind_name(spec.kind)
        ))
    }
}

/// Positional shape check: `YYYY-MM-DDTHH:MM:SS` prefix with dashes at 4 and 7
/// and `T` at 10. Fractional seconds may follow.
fn is_iso8601_shaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 19 && bytes[4] == b'-' && bytes[7] == b'-' && bytes[10] == b'T'
}

const fn kind_name(kind: JsonKind) -> &'static str {
    match kind {
        JsonKind::Integer => "integer",
        JsonKind::Number => "number",
        JsonKind::String => "string",
        JsonKind::NonEmptyString => "non-empty string",
        JsonKind::Timestamp => "ISO8601 string",
    }
}
