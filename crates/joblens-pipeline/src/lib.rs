// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod redact;
mod sanitize;
mod validate;

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use joblens_model::DEFAULT_SANITIZED_ARTIFACT;

pub const CRATE_NAME: &str = "joblens-pipeline";

pub use redact::{redact_text, Redactor, EMAIL_PLACEHOLDER, HOME_PLACEHOLDER, USER_PLACEHOLDER};
pub use sanitize::{hash_user_id, sanitize_file, sanitize_records, SanitizeCounters};
pub use validate::validate_file;

#[derive(Debug)]
pub struct PipelineError(pub String);

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PipelineError {}

impl From<joblens_core::jsonio::JsonIoError> for PipelineError {
    fn from(err: joblens_core::jsonio::JsonIoError) -> Self {
        Self(err.0)
    }
}

/// Default number of records the validator fully checks; the tail of the
/// file still gets a shape check.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Finding collection stops once this many problems have been recorded.
pub const MAX_FINDINGS: usize = 100;

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Number of records to fully validate; `0` validates all of them.
    pub sample_size: usize,
    pub max_findings: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_findings: MAX_FINDINGS,
        }
    }
}

impl ValidateOptions {
    /// Full-file validation, as selected by the `--full` flag.
    #[must_use]
    pub fn full() -> Self {
        Self {
            sample_size: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    pub output_path: PathBuf,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_SANITIZED_ARTIFACT),
        }
    }
}
