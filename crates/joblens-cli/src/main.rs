// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod commands;

use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

use clap::{Parser, Subcommand};
use joblens_core::ExitCode;

use crate::commands::{run_pipeline, CliFailure, RunArgs};

#[derive(Parser)]
#[command(name = "joblens")]
#[command(about = "Failed-job batch report pipeline: validate, sanitize, generate")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline over a failed-job export. With no stage flag all
    /// three stages execute in order; each stage flag selects that single
    /// stage instead.
    Run {
        /// Raw export to process (JSON array, optionally .gz/.zst).
        input: Option<PathBuf>,
        /// Only validate the given export.
        #[arg(long, value_name = "INPUT", conflicts_with_all = ["sanitize", "generate_only"])]
        validate: Option<PathBuf>,
        /// Only sanitize the given export.
        #[arg(long, value_name = "INPUT", conflicts_with = "generate_only")]
        sanitize: Option<PathBuf>,
        /// Only generate the report; the sanitized artifact must exist.
        #[arg(long)]
        generate_only: bool,
        /// Validate every record instead of the first 1000.
        #[arg(long)]
        full: bool,
        /// Where the sanitized artifact is written (and read by generate).
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Where the report tree is written.
        #[arg(long, value_name = "DIR")]
        report_dir: Option<PathBuf>,
    },
}

fn main() -> ProcessExitCode {
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(failure) => {
            eprintln!("✗ {}", failure.message);
            ProcessExitCode::from(failure.exit as u8)
        }
    }
}

fn run() -> Result<(), CliFailure> {
    let cli = Cli::parse();
    let command = cli.command.ok_or_else(|| CliFailure {
        exit: ExitCode::Usage,
        message: "missing command; see --help".to_string(),
    })?;

    match command {
        Commands::Run {
            input,
            validate,
            sanitize,
            generate_only,
            full,
            output,
            report_dir,
        } => run_pipeline(RunArgs {
            input,
            validate,
            sanitize,
            generate_only,
            full,
            output,
            report_dir,
        }),
    }
}
