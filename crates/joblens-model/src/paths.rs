// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

/// Fixed relative location of the sanitized intermediate artifact. This path
/// is the sole coupling contract between the sanitize and generate stages.
pub const DEFAULT_SANITIZED_ARTIFACT: &str = "data/error-jobs-sanitized.json.gz";

/// Default root for the rendered report tree.
pub const DEFAULT_REPORT_DIR: &str = "report";

/// Layout of the rendered report tree under one root.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ReportPaths {
    pub root: PathBuf,
    pub index_html: PathBuf,
    pub tools_dir: PathBuf,
}

#[must_use]
pub fn report_paths(root: &Path) -> ReportPaths {
    ReportPaths {
        root: root.to_path_buf(),
        index_html: root.join("index.html"),
        tools_dir: root.join("tools"),
    }
}

/// File-system-safe name for a per-tool page; anything outside
/// `[A-Za-z0-9_-]` becomes `_`.
#[must_use]
pub fn safe_tool_filename(tool: &str) -> String {
    tool.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
