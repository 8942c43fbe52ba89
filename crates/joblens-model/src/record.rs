// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Job state every record in a failed-job export is expected to carry.
pub const STATE_ERROR: &str = "error";

/// JSON value kinds the validator checks field values against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    /// Integer-valued JSON number.
    Integer,
    /// Any JSON number.
    Number,
    /// Any JSON string.
    String,
    /// Non-empty JSON string.
    NonEmptyString,
    /// String shaped like an ISO8601 timestamp (`YYYY-MM-DDTHH:MM:SS...`).
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: JsonKind,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(name: &'static str, kind: JsonKind) -> Self {
        Self { name, kind }
    }
}

/// Fields that must be present, non-null, and correctly typed on every record.
pub const REQUIRED_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", JsonKind::Integer),
    FieldSpec::new("create_time", JsonKind::Timestamp),
    FieldSpec::new("tool_id", JsonKind::NonEmptyString),
    FieldSpec::new("state", JsonKind::String),
];

/// Fields that may be absent or null; a present non-null value must match
/// the declared kind.
pub const OPTIONAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("exit_code", JsonKind::Number),
    FieldSpec::new("tool_version", JsonKind::String),
    FieldSpec::new("tool_stderr", JsonKind::String),
    FieldSpec::new("tool_stdout", JsonKind::String),
    FieldSpec::new("job_stderr", JsonKind::String),
    FieldSpec::new("job_stdout", JsonKind::String),
    FieldSpec::new("destination_id", JsonKind::String),
    FieldSpec::new("handler", JsonKind::String),
    FieldSpec::new("update_time", JsonKind::String),
    FieldSpec::new("user_id", JsonKind::Number),
    FieldSpec::new("session_id", JsonKind::Integer),
    FieldSpec::new("history_id", JsonKind::Integer),
];

/// Typed view of one failed execution attempt, as read by the report stage.
///
/// Unknown fields are tolerated: exports carry site-specific extras
/// (`command_line`, `traceback`, ...) that the sanitizer redacts but the
/// report never consumes. `user_id` is an integer before sanitization and a
/// hex digest string after it, so it is kept as a raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: i64,
    pub tool_id: String,
    #[serde(default)]
    pub tool_version: Option<String>,
    pub create_time: String,
    #[serde(default)]
    pub update_time: Option<String>,
    pub state: String,
    #[serde(default)]
    pub exit_code: Option<i64>,
    #[serde(default)]
    pub tool_stderr: Option<String>,
    #[serde(default)]
    pub tool_stdout: Option<String>,
    #[serde(default)]
    pub job_stderr: Option<String>,
    #[serde(default)]
    pub job_stdout: Option<String>,
    #[serde(default)]
    pub destination_id: Option<String>,
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub user_id: Option<Value>,
}

impl JobRecord {
    /// Short tool name extracted from the full `tool_id`.
    #[must_use]
    pub fn tool_name(&self) -> String {
        tool_name_of(&self.tool_id)
    }

    /// Display key for the (possibly hashed) user identity, `None` when the
    /// record is anonymous.
    #[must_use]
    pub fn user_key(&self) -> Option<String> {
        match &self.user_id {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Whether the record carries the suspicious success-exit-with-error-state
    /// combination flagged in the report's anomaly section.
    #[must_use]
    pub fn is_exit_zero_anomaly(&self) -> bool {
        self.state == STATE_ERROR && self.exit_code == Some(0)
    }
}

/// Tool ids embed a repository path and version
/// (`toolshed/repos/owner/name/tool/version`); the short name is the fourth
/// path component when one exists.
#[must_use]
pub fn tool_name_of(tool_id: &str) -> String {
    if tool_id.is_empty() {
        return "unknown".to_string();
    }
    let parts: Vec<&str> = tool_id.split('/').collect();
    if parts.len() >= 4 {
        parts[3].to_string()
    } else {
        tool_id.to_string()
    }
}
