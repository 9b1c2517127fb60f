//! End-to-end tests driving the invoker against scripted formatter
//! binaries, covering the success, lint-failure, and spawn-failure paths
//! without depending on a real formatter being installed.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use seisho::error::FormatError;
use seisho::formatter::{FormatOutcome, FormatRequest, invoke, parse_stderr};
use seisho::text::replacement_edits;

/// Write an executable shell script into `dir` and return its path.
fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("make script executable");
    path
}

#[tokio::test]
async fn echoing_formatter_produces_no_edits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_script(&dir, "fake-format", "cat");

    let original = "a=1\n";
    let request = FormatRequest::new(original);
    let outcome = invoke(&request, &script.to_string_lossy(), &[])
        .await
        .expect("script should spawn");

    let FormatOutcome::Formatted(formatted) = outcome else {
        panic!("expected Formatted, got {outcome:?}");
    };
    assert_eq!(formatted, original);
    assert!(replacement_edits(original, &formatted).is_empty());
}

#[tokio::test]
async fn rewriting_formatter_produces_edits() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Inserts spaces around '=' on every line
    let script = write_script(&dir, "fake-format", "sed 's/=/ = /'");

    let original = "a=1\nb=2\n";
    let request = FormatRequest::new(original);
    let outcome = invoke(&request, &script.to_string_lossy(), &[])
        .await
        .expect("script should spawn");

    let FormatOutcome::Formatted(formatted) = outcome else {
        panic!("expected Formatted, got {outcome:?}");
    };
    assert_eq!(formatted, "a = 1\nb = 2\n");
    assert!(!replacement_edits(original, &formatted).is_empty());
}

#[tokio::test]
async fn linting_formatter_yields_positioned_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_script(
        &dir,
        "fake-format",
        r#"cat >/dev/null
echo "<stdin>:360:37: missing ',' in" >&2
echo "expression list" >&2
echo "<stdin>:2:1: unexpected symbol" >&2
exit 1"#,
    );

    let request = FormatRequest::new("broken {\n");
    let outcome = invoke(&request, &script.to_string_lossy(), &[])
        .await
        .expect("script should spawn");

    let FormatOutcome::Failed { stderr, exit_code } = outcome else {
        panic!("expected Failed, got {outcome:?}");
    };
    assert_eq!(exit_code, 1);

    let errors = parse_stderr(&stderr);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].line, 359);
    assert_eq!(errors[0].column, 36);
    // The record wrapped across two stderr lines and is still recovered whole
    assert_eq!(errors[0].message, "missing ',' in expression list");
    assert_eq!(errors[1].line, 1);
    assert_eq!(errors[1].column, 0);
}

#[tokio::test]
async fn formatter_runs_in_the_requested_working_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_script(&dir, "fake-format", "cat >/dev/null; pwd");

    let workdir = tempfile::tempdir().expect("workdir");
    let expected = workdir.path().canonicalize().expect("canonicalize workdir");

    let request =
        FormatRequest::new("x\n").with_working_dir(Some(workdir.path().to_path_buf()));
    let outcome = invoke(&request, &script.to_string_lossy(), &[])
        .await
        .expect("script should spawn");

    let FormatOutcome::Formatted(stdout) = outcome else {
        panic!("expected Formatted, got {outcome:?}");
    };
    let reported = PathBuf::from(stdout.trim())
        .canonicalize()
        .expect("canonicalize reported dir");
    assert_eq!(reported, expected);
}

#[tokio::test]
async fn missing_formatter_is_a_spawn_error_with_remediation() {
    let request = FormatRequest::new("a=1\n");
    let result = invoke(&request, "seisho-integration-missing-binary", &[]).await;

    let Err(err) = result else {
        panic!("expected spawn error, got {result:?}");
    };
    assert!(matches!(err, FormatError::Spawn { .. }));
    assert!(
        err.remediation("seisho-integration-missing-binary")
            .contains("seisho-integration-missing-binary")
    );
}
