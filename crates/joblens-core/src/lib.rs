// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use sha2::{Digest, Sha256};

pub mod jsonio;
pub mod stagelog;

pub const CRATE_NAME: &str = "joblens-core";

/// Process exit codes shared by every stage entry point.
///
/// The distinct codes keep "stage reported a failure", "input file missing",
/// and "intermediate artifact missing" distinguishable to callers wiring the
/// pipeline into scripts.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExitCode {
    Success = 0,
    Usage = 2,
    StageFailure = 3,
    MissingInput = 4,
    MissingArtifact = 5,
    Internal = 10,
}

impl ExitCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Usage => "usage",
            Self::StageFailure => "stage_failure",
            Self::MissingInput => "missing_input",
            Self::MissingArtifact => "missing_artifact",
            Self::Internal => "internal",
        }
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_is_stable_across_calls() {
        let a = sha256_hex(b"4217");
        let b = sha256_hex(b"4217");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            ExitCode::Success,
            ExitCode::Usage,
            ExitCode::StageFailure,
            ExitCode::MissingInput,
            ExitCode::MissingArtifact,
            ExitCode::Internal,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                assert_ne!(*a as u8, *b as u8);
            }
        }
    }
}
