// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-record validation problem, reported with the record's array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationFinding {
    pub index: usize,
    pub message: String,
}

impl ValidationFinding {
    #[must_use]
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct ValidationStats {
    pub total_records: usize,
    pub records_validated: usize,
    pub fields_found: Vec<String>,
    pub states_found: Vec<String>,
    pub required_fields_present: bool,
}

impl ValidationStats {
    #[must_use]
    pub fn new(
        total_records: usize,
        records_validated: usize,
        fields_found: Vec<String>,
        states_found: Vec<String>,
        required_fields_present: bool,
    ) -> Self {
        Self {
            total_records,
            records_validated,
            fields_found,
            states_found,
            required_fields_present,
        }
    }
}

/// Outcome of a validation pass: stats plus the bounded finding list.
///
/// Findings never abort the pass early; collection stops at the cap and the
/// report records that truncation happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct ValidationReport {
    pub stats: ValidationStats,
    pub findings: Vec<ValidationFinding>,
    pub truncated: bool,
}

impl ValidationReport {
    #[must_use]
    pub fn new(stats: ValidationStats, findings: Vec<ValidationFinding>, truncated: bool) -> Self {
        Self {
            stats,
            findings,
            truncated,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty() && self.stats.required_fields_present
    }
}

/// Counters describing one sanitize run, alongside the artifact it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct SanitizeSummary {
    pub records: usize,
    pub hashed_user_ids: usize,
    pub dropped_keys: usize,
    pub redacted_fields: usize,
    pub output_path: PathBuf,
    pub output_sha256: String,
}

impl SanitizeSummary {
    #[must_use]
    pub fn new(
        records: usize,
        hashed_user_ids: usize,
        dropped_keys: usize,
        redacted_fields: usize,
        output_path: PathBuf,
        output_sha256: String,
    ) -> Self {
        Self {
            records,
            hashed_user_ids,
            dropped_keys,
            redacted_fields,
            output_path,
            output_sha256,
        }
    }
}
