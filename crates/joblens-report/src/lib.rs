// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod aggregate;
mod classify;
mod html;
mod svg;
mod write;

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use joblens_model::{DEFAULT_REPORT_DIR, DEFAULT_SANITIZED_ARTIFACT};

pub const CRATE_NAME: &str = "joblens-report";

pub use aggregate::{aggregate_records, AggregateView, MessageGroup, ToolDetail};
pub use classify::{ErrorPatternTable, PatternSpec, DEFAULT_ERROR_PATTERNS};
pub use write::{generate_report, ReportOutput};

#[derive(Debug)]
pub struct ReportError(pub String);

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ReportError {}

impl From<joblens_core::jsonio::JsonIoError> for ReportError {
    fn from(err: joblens_core::jsonio::JsonIoError) -> Self {
        Self(err.0)
    }
}

/// How many tools the overview table and chart show.
pub const TOP_TOOLS: usize = 20;

/// How many users the user-impact table shows.
pub const TOP_USERS: usize = 10;

/// How many exit codes the distribution chart shows.
pub const TOP_EXIT_CODES: usize = 12;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Sanitized intermediate artifact to read.
    pub data_path: PathBuf,
    /// Root directory the report tree is written under.
    pub report_dir: PathBuf,
    /// Ordered error-pattern classification table.
    pub patterns: Vec<PatternSpec>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_SANITIZED_ARTIFACT),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            patterns: DEFAULT_ERROR_PATTERNS
                .iter()
                .map(|(label, pattern)| PatternSpec::new(*label, *pattern))
                .collect(),
        }
    }
}
