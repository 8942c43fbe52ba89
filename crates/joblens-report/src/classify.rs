// SPDX-License-Identifier: Apache-2.0

//! Error-pattern classification over diagnostic text.
//!
//! The table is an ordered list of (label, pattern) pairs treated as
//! configuration data: adding a category means adding a row, not touching
//! the aggregation. A record increments every category whose pattern
//! matches (multi-match, as the source system counted).

use regex::{Regex, RegexBuilder};

use crate::ReportError;

/// Default category table for failed-job diagnostics.
pub const DEFAULT_ERROR_PATTERNS: &[(&str, &str)] = &[
    ("Invalid Input", r"invalid|not valid|malformed|corrupt"),
    (
        "Memory/OOM",
        r"memory|MemoryError|Cannot allocate|out of memory|OOM",
    ),
    ("Disk Space", r"No space left|disk full|quota exceeded"),
    ("Missing Header", r"no.*header|missing header"),
    ("Connection", r"connection|ConnectionError|network|refused"),
    ("Process Killed", r"Killed|SIGKILL|signal 9"),
    ("Permission", r"Permission denied|Access denied"),
];

/// One uncompiled classification row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSpec {
    pub label: String,
    pub pattern: String,
}

impl PatternSpec {
    #[must_use]
    pub fn new(label: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pattern: pattern.into(),
        }
    }
}

/// Compiled, ordered classification table.
#[derive(Debug)]
pub struct ErrorPatternTable {
    entries: Vec<(String, Regex)>,
}

impl ErrorPatternTable {
    /// Compile the table; patterns match case-insensitively.
    pub fn compile(specs: &[PatternSpec]) -> Result<Self, ReportError> {
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            let regex = RegexBuilder::new(&spec.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    ReportError(format!(
                        "invalid error pattern for category '{}': {e}",
                        spec.label
                    ))
                })?;
            entries.push((spec.label.clone(), regex));
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Labels of every category whose pattern matches the text, in table order.
    #[must_use]
    pub fn matches<'a>(&'a self, text: &str) -> Vec<&'a str> {
        self.entries
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(label, _)| label.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_table() -> ErrorPatternTable {
        let specs: Vec<PatternSpec> = DEFAULT_ERROR_PATTERNS
            .iter()
            .map(|(label, pattern)| PatternSpec::new(*label, *pattern))
            .collect();
        ErrorPatternTable::compile(&specs).expect("default table compiles")
    }

    #[test]
    fn oom_text_matches_memory_category_case_insensitively() {
        let table = default_table();
        assert_eq!(table.matches("cannot allocate vector of size 8 Gb"), vec!["Memory/OOM"]);
    }

    #[test]
    fn one_record_can_hit_several_categories() {
        let table = default_table();
        let labels = table.matches("Killed: out of memory");
        assert_eq!(labels, vec!["Memory/OOM", "Process Killed"]);
    }

    #[test]
    fn unclassified_text_matches_nothing() {
        let table = default_table();
        assert!(table.matches("exit status 1").is_empty());
    }

    #[test]
    fn bad_pattern_is_rejected_with_category_label() {
        let err = ErrorPatternTable::compile(&[PatternSpec::new("Broken", "(unclosed")])
            .expect_err("must fail");
        assert!(err.0.contains("'Broken'"), "unexpected error: {}", err.0);
    }
}
