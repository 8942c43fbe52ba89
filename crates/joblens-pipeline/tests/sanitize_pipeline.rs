// SPDX-License-Identifier: Apache-2.0

use joblens_core::jsonio::load_json_array;
use joblens_core::stagelog::StageLog;
use joblens_pipeline::{sanitize_file, SanitizeOptions};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn sanitize_writes_one_gzip_artifact_with_order_preserved() {
    let dir = tempdir().expect("tmp");
    let input = dir.path().join("raw.json");
    let records = json!([
        {
            "id": 1,
            "tool_id": "upload1",
            "create_time": "2031-01-05T10:00:00.000000",
            "state": "error",
            "user_id": 42,
            "session_id": 900,
            "history_id": 901,
            "tool_stderr": "contact me at a@b.com"
        },
        {
            "id": 2,
            "tool_id": "upload1",
            "create_time": "2031-01-05T11:00:00.000000",
            "state": "error",
            "user_id": null,
            "job_stderr": "read error under /home/alice/galaxy/tmp"
        }
    ]);
    std::fs::write(&input, serde_json::to_vec(&records).expect("encode")).expect("write");

    let options = SanitizeOptions {
        output_path: dir.path().join("data/sanitized.json.gz"),
    };
    let mut log = StageLog::default();
    let summary = sanitize_file(&input, &options, &mut log).expect("sanitize");

    assert_eq!(summary.records, 2);
    assert_eq!(summary.hashed_user_ids, 1);
    assert_eq!(summary.dropped_keys, 2);
    assert_eq!(summary.redacted_fields, 2);
    assert_eq!(summary.output_sha256.len(), 64);

    let sanitized = load_json_array(&summary.output_path).expect("load artifact");
    assert_eq!(sanitized.len(), 2);
    assert_eq!(sanitized[0]["id"], 1);
    assert_eq!(sanitized[1]["id"], 2);

    assert_eq!(sanitized[0]["tool_stderr"], "contact me at [EMAIL]");
    assert!(sanitized[0].get("session_id").is_none());
    assert!(sanitized[0].get("history_id").is_none());
    let digest = sanitized[0]["user_id"].as_str().expect("digest string");
    assert_eq!(digest.len(), 16);

    assert_eq!(sanitized[1]["user_id"], serde_json::Value::Null);
    assert_eq!(
        sanitized[1]["job_stderr"],
        "read error under /home/[USER]/galaxy/tmp"
    );
    let stderr = sanitized[1]["job_stderr"].as_str().expect("str");
    assert!(!stderr.contains("alice"));
}

#[test]
fn sanitizing_already_sanitized_data_changes_nothing_more() {
    let dir = tempdir().expect("tmp");
    let input = dir.path().join("raw.json");
    let records = json!([{
        "id": 1,
        "tool_id": "upload1",
        "create_time": "2031-01-05T10:00:00.000000",
        "state": "error",
        "session_id": 5,
        "tool_stderr": "mail a@b.com from /home/alice/run"
    }]);
    std::fs::write(&input, serde_json::to_vec(&records).expect("encode")).expect("write");

    let first = SanitizeOptions {
        output_path: dir.path().join("pass1.json.gz"),
    };
    let mut log = StageLog::default();
    let summary1 = sanitize_file(&input, &first, &mut log).expect("first pass");
    assert_eq!(summary1.redacted_fields, 1);
    assert_eq!(summary1.dropped_keys, 1);

    let second = SanitizeOptions {
        output_path: dir.path().join("pass2.json.gz"),
    };
    let summary2 = sanitize_file(&summary1.output_path, &second, &mut log).expect("second pass");
    assert_eq!(summary2.redacted_fields, 0, "no further substitutions");
    assert_eq!(summary2.dropped_keys, 0);

    let pass1 = load_json_array(&summary1.output_path).expect("load");
    let pass2 = load_json_array(&summary2.output_path).expect("load");
    let strip_user =
        |mut v: serde_json::Value| {
            v.as_object_mut().expect("object").remove("user_id");
            v
        };
    assert_eq!(
        strip_user(pass1[0].clone()),
        strip_user(pass2[0].clone()),
        "non-identity fields unchanged by the second pass"
    );
}

#[test]
fn missing_input_is_fatal() {
    let dir = tempdir().expect("tmp");
    let options = SanitizeOptions {
        output_path: dir.path().join("out.json.gz"),
    };
    let mut log = StageLog::default();
    let err = sanitize_file(&dir.path().join("absent.json"), &options, &mut log)
        .expect_err("missing input must fail");
    assert!(err.0.contains("cannot read"), "unexpected error: {}", err.0);
}

#[test]
fn gzip_input_is_accepted() {
    let dir = tempdir().expect("tmp");
    let records = vec![json!({
        "id": 3,
        "tool_id": "upload1",
        "create_time": "2031-01-06T10:00:00.000000",
        "state": "error"
    })];
    let input = joblens_core::jsonio::write_json_array_gz(&dir.path().join("raw.json.gz"), &records)
        .expect("write gz input");

    let options = SanitizeOptions {
        output_path: dir.path().join("out.json.gz"),
    };
    let mut log = StageLog::default();
    let summary = sanitize_file(&input, &options, &mut log).expect("sanitize");
    assert_eq!(summary.records, 1);
}
