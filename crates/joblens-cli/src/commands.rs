// SPDX-License-Identifier: Apache-2.0

//! Stage orchestration behind `joblens run`. Stages hand off through files
//! only; the orchestrator owns ordering, the existence gates between stages,
//! and the exit-status mapping.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use joblens_core::stagelog::StageLog;
use joblens_core::ExitCode;
use joblens_model::{ValidationReport, DEFAULT_SANITIZED_ARTIFACT};
use joblens_pipeline::{sanitize_file, validate_file, SanitizeOptions, ValidateOptions};
use joblens_report::{generate_report, ReportOptions};

/// Findings shown before the summary line cuts the list off.
const FINDINGS_SHOWN: usize = 20;

#[derive(Debug)]
pub struct CliFailure {
    pub exit: ExitCode,
    pub message: String,
}

fn stage_failure(message: impl Display) -> CliFailure {
    CliFailure {
        exit: ExitCode::StageFailure,
        message: message.to_string(),
    }
}

fn missing_input(path: &Path) -> CliFailure {
    CliFailure {
        exit: ExitCode::MissingInput,
        message: format!("input file not found: {}", path.display()),
    }
}

#[derive(Debug)]
pub struct RunArgs {
    pub input: Option<PathBuf>,
    pub validate: Option<PathBuf>,
    pub sanitize: Option<PathBuf>,
    pub generate_only: bool,
    pub full: bool,
    pub output: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
}

impl RunArgs {
    fn artifact_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SANITIZED_ARTIFACT))
    }
}

pub fn run_pipeline(args: RunArgs) -> Result<(), CliFailure> {
    if let Some(path) = args.validate.clone() {
        validate_stage(&path, args.full)?;
        println!("✓ done");
        return Ok(());
    }
    if let Some(path) = args.sanitize.clone() {
        sanitize_stage(&path, &args.artifact_path())?;
        println!("✓ done");
        return Ok(());
    }
    if args.generate_only {
        generate_stage(&args.artifact_path(), args.report_dir.as_deref())?;
        println!("✓ done");
        return Ok(());
    }

    let Some(input) = args.input.clone() else {
        return Err(CliFailure {
            exit: ExitCode::Usage,
            message: "missing input file; see `joblens run --help`".to_string(),
        });
    };

    validate_stage(&input, args.full)?;
    let artifact = sanitize_stage(&input, &args.artifact_path())?;
    // Explicit gate between sanitize and generate: the artifact file must
    // exist on disk before the report stage is allowed to start.
    if !artifact.exists() {
        return Err(CliFailure {
            exit: ExitCode::MissingArtifact,
            message: format!(
                "sanitize reported success but {} is missing",
                artifact.display()
            ),
        });
    }
    generate_stage(&artifact, args.report_dir.as_deref())?;

    println!("✓ pipeline complete");
    Ok(())
}

fn validate_stage(path: &Path, full: bool) -> Result<(), CliFailure> {
    if !path.exists() {
        return Err(missing_input(path));
    }
    println!("validate: {}", path.display());

    let options = if full {
        ValidateOptions::full()
    } else {
        ValidateOptions::default()
    };
    let mut log = StageLog::default();
    let report = validate_file(path, &options, &mut log).map_err(stage_failure)?;
    print_validation(&report);

    if report.is_valid() {
        println!(
            "✓ validation passed ({} records, {} checked)",
            report.stats.total_records, report.stats.records_validated
        );
        Ok(())
    } else {
        Err(stage_failure(format!(
            "validation failed with {} finding(s)",
            report.findings.len()
        )))
    }
}

fn print_validation(report: &ValidationReport) {
    println!(
        "  records: {} total, {} validated",
        report.stats.total_records, report.stats.records_validated
    );
    println!("  states found: {}", report.stats.states_found.join(", "));
    println!("  fields found: {}", report.stats.fields_found.join(", "));
    if !report.stats.required_fields_present {
        println!("  required fields missing from every sampled record");
    }
    for finding in report.findings.iter().take(FINDINGS_SHOWN) {
        println!("  - record {}: {}", finding.index, finding.message);
    }
    if report.findings.len() > FINDINGS_SHOWN {
        println!(
            "  ... and {} more finding(s)",
            report.findings.len() - FINDINGS_SHOWN
        );
    }
    if report.truncated {
        println!("  ... (stopped collecting after {} findings)", report.findings.len());
    }
}

fn sanitize_stage(input: &Path, output: &Path) -> Result<PathBuf, CliFailure> {
    if !input.exists() {
        return Err(missing_input(input));
    }
    println!("sanitize: {}", input.display());

    let options = SanitizeOptions {
        output_path: output.to_path_buf(),
    };
    let mut log = StageLog::default();
    let summary = sanitize_file(input, &options, &mut log).map_err(stage_failure)?;

    println!(
        "  {} records: {} user ids hashed, {} keys dropped, {} fields redacted",
        summary.records, summary.hashed_user_ids, summary.dropped_keys, summary.redacted_fields
    );
    println!(
        "✓ sanitized artifact: {} (sha256 {})",
        summary.output_path.display(),
        &summary.output_sha256[..16]
    );
    Ok(summary.output_path)
}

fn generate_stage(artifact: &Path, report_dir: Option<&Path>) -> Result<(), CliFailure> {
    if !artifact.exists() {
        return Err(CliFailure {
            exit: ExitCode::MissingArtifact,
            message: format!(
                "sanitized artifact not found: {}; run the full pipeline (`joblens run <input>`) first",
                artifact.display()
            ),
        });
    }
    println!("generate: {}", artifact.display());

    let mut options = ReportOptions {
        data_path: artifact.to_path_buf(),
        ..ReportOptions::default()
    };
    if let Some(dir) = report_dir {
        options.report_dir = dir.to_path_buf();
    }
    let mut log = StageLog::default();
    let output = generate_report(&options, &mut log).map_err(stage_failure)?;

    println!(
        "  {} records aggregated, {} tool pages",
        output.records,
        output.tool_pages.len()
    );
    println!("✓ report: {}", output.index_path.display());
    Ok(())
}
