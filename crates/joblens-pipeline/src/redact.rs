// SPDX-License-Identifier: Apache-2.0

//! Substring redaction of personally identifying patterns in free-form text.
//!
//! The email pattern is deliberately greedy: over-redaction is the safe
//! direction for an artifact meant for public sharing.

use std::sync::OnceLock;

use regex::Regex;

pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";
pub const HOME_PLACEHOLDER: &str = "/home/[USER]";
pub const USER_PLACEHOLDER: &str = "/user/[USER]";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email regex"))
}

fn home_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/home/[a-zA-Z0-9_.-]+").expect("home path regex"))
}

fn user_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)/users?/[a-zA-Z0-9_.-]+").expect("user path regex"))
}

/// Compiled redaction pattern set. One instance serves a whole run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Redactor;

impl Redactor {
    /// Replace every sensitive substring; returns the rewritten text and
    /// whether anything changed.
    #[must_use]
    pub fn redact(&self, text: &str) -> (String, bool) {
        let mut out = email_regex().replace_all(text, EMAIL_PLACEHOLDER).into_owned();
        out = home_path_regex()
            .replace_all(&out, HOME_PLACEHOLDER)
            .into_owned();
        out = user_path_regex()
            .replace_all(&out, USER_PLACEHOLDER)
            .into_owned();
        let changed = out != text;
        (out, changed)
    }
}

/// Convenience wrapper over a shared [`Redactor`].
#[must_use]
pub fn redact_text(text: &str) -> String {
    Redactor.redact(text).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_addresses_become_placeholder() {
        let (out, changed) = Redactor.redact("contact me at a@b.com");
        assert_eq!(out, "contact me at [EMAIL]");
        assert!(changed);
    }

    #[test]
    fn home_path_prefix_is_replaced_and_suffix_kept() {
        let (out, _) = Redactor.redact("wrote /home/alice/galaxy/tmp today");
        assert_eq!(out, "wrote /home/[USER]/galaxy/tmp today");
        assert!(!out.contains("alice"));
    }

    #[test]
    fn user_and_users_prefixes_collapse_case_insensitively() {
        let (out, _) = Redactor.redact("/Users/bob/data and /user/carol/run");
        assert_eq!(out, "/user/[USER]/data and /user/[USER]/run");
    }

    #[test]
    fn clean_text_is_untouched() {
        let (out, changed) = Redactor.redact("Killed by signal 9");
        assert_eq!(out, "Killed by signal 9");
        assert!(!changed);
    }

    #[test]
    fn redaction_is_idempotent() {
        let (once, _) = Redactor.redact("a@b.com at /home/alice/x");
        let (twice, changed) = Redactor.redact(&once);
        assert_eq!(once, twice);
        assert!(!changed);
    }
}
