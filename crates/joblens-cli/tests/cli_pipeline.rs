// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::tempdir;

fn joblens(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_joblens"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn joblens")
}

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let records = json!([
        {
            "id": 1,
            "tool_id": "T1",
            "create_time": "2031-03-14T09:26:53.589793",
            "state": "error",
            "exit_code": 1,
            "user_id": 42,
            "session_id": 7,
            "tool_stderr": "Out of memory: killed, mail admin@example.org"
        },
        {
            "id": 2,
            "tool_id": "T1",
            "create_time": "2031-03-15T10:00:00.000000",
            "state": "error",
            "exit_code": 137
        },
        {
            "id": 3,
            "tool_id": "T2",
            "create_time": "2031-03-15T23:59:59.000000",
            "state": "error",
            "exit_code": 0
        }
    ]);
    let path = dir.join("errors.json");
    std::fs::write(&path, serde_json::to_vec(&records).expect("encode")).expect("write fixture");
    path
}

#[test]
fn full_pipeline_produces_artifact_and_report() {
    let dir = tempdir().expect("tmp");
    let input = write_fixture(dir.path());

    let output = joblens(
        dir.path(),
        &[
            "run",
            input.to_str().expect("utf8 path"),
            "--output",
            "data/sanitized.json.gz",
            "--report-dir",
            "report",
        ],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stdout: {stdout}\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("✓ validation passed"));
    assert!(stdout.contains("✓ pipeline complete"));

    assert!(dir.path().join("data/sanitized.json.gz").exists());
    assert!(dir.path().join("report/index.html").exists());
    assert!(dir.path().join("report/tools/T1.html").exists());
    assert!(dir.path().join("report/tools/T2.html").exists());

    let index =
        std::fs::read_to_string(dir.path().join("report/index.html")).expect("read index");
    assert!(index.contains("<td>T1</td><td>2</td>"));
    assert!(index.contains("<td>T2</td><td>1</td>"));
}

#[test]
fn generate_only_without_artifact_fails_with_distinct_code_and_no_output() {
    let dir = tempdir().expect("tmp");

    let output = joblens(dir.path(), &["run", "--generate-only", "--report-dir", "report"]);
    assert_eq!(output.status.code(), Some(5), "missing-artifact exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("run the full pipeline"),
        "stderr: {stderr}"
    );
    assert!(!dir.path().join("report").exists(), "no output documents");
}

#[test]
fn validate_only_reports_record_findings_and_fails() {
    let dir = tempdir().expect("tmp");
    let records = json!([
        {
            "id": 1,
            "tool_id": "T1",
            "create_time": "2031-03-14T09:26:53.589793",
            "state": "error"
        },
        {
            "id": "two",
            "tool_id": "T1",
            "create_time": "2031-03-14T09:26:53.589793",
            "state": "error"
        }
    ]);
    let input = dir.path().join("broken.json");
    std::fs::write(&input, serde_json::to_vec(&records).expect("encode")).expect("write");

    let output = joblens(
        dir.path(),
        &["run", "--validate", input.to_str().expect("utf8 path")],
    );
    assert_eq!(output.status.code(), Some(3), "stage failure exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("record 1") && stdout.contains("field 'id' has wrong type"),
        "stdout: {stdout}"
    );
}

#[test]
fn sanitize_only_writes_the_artifact() {
    let dir = tempdir().expect("tmp");
    let input = write_fixture(dir.path());

    let output = joblens(
        dir.path(),
        &[
            "run",
            "--sanitize",
            input.to_str().expect("utf8 path"),
            "--output",
            "data/sanitized.json.gz",
        ],
    );
    assert!(output.status.success());
    assert!(dir.path().join("data/sanitized.json.gz").exists());
    assert!(
        !dir.path().join("report").exists(),
        "sanitize-only runs no report stage"
    );
}

#[test]
fn missing_input_file_uses_missing_input_exit_code() {
    let dir = tempdir().expect("tmp");
    let output = joblens(dir.path(), &["run", "absent.json"]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input file not found"), "stderr: {stderr}");
}

#[test]
fn run_without_input_is_a_usage_error() {
    let dir = tempdir().expect("tmp");
    let output = joblens(dir.path(), &["run"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn sanitized_artifact_contains_no_raw_identifiers() {
    let dir = tempdir().expect("tmp");
    let input = write_fixture(dir.path());

    let output = joblens(
        dir.path(),
        &[
            "run",
            input.to_str().expect("utf8 path"),
            "--output",
            "data/sanitized.json.gz",
            "--report-dir",
            "report",
        ],
    );
    assert!(output.status.success());

    let artifact = joblens_core::jsonio::load_json_array(
        &dir.path().join("data/sanitized.json.gz"),
    )
    .expect("artifact");
    let first = artifact[0].as_object().expect("object");
    assert!(!first.contains_key("session_id"));
    assert!(first["user_id"].is_string());
    let stderr_field = first["tool_stderr"].as_str().expect("stderr");
    assert!(!stderr_field.contains("admin@example.org"));
    assert!(stderr_field.contains("[EMAIL]"));
}
