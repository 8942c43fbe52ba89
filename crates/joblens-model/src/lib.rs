// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod paths;
mod record;
mod summary;

pub const CRATE_NAME: &str = "joblens-model";

pub use paths::{
    report_paths, safe_tool_filename, ReportPaths, DEFAULT_REPORT_DIR, DEFAULT_SANITIZED_ARTIFACT,
};
pub use record::{
    tool_name_of, FieldSpec, JobRecord, JsonKind, OPTIONAL_FIELDS, REQUIRED_FIELDS, STATE_ERROR,
};
pub use summary::{SanitizeSummary, ValidationFinding, ValidationReport, ValidationStats};
