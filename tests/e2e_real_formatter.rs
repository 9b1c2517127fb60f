//! End-to-end tests against a real lua-format binary.
//!
//! Run with: `cargo test --test e2e_real_formatter --features e2e`
//!
//! **Requirements**: lua-format must be installed and in PATH.
//! If not available, tests will be skipped (not failed).

#![cfg(feature = "e2e")]

use seisho::formatter::{FormatOutcome, FormatRequest, invoke, parse_stderr};

async fn lua_format_available() -> bool {
    tokio::process::Command::new("lua-format")
        .arg("--version")
        .output()
        .await
        .is_ok()
}

#[tokio::test]
async fn valid_lua_comes_back_formatted() {
    if !lua_format_available().await {
        eprintln!("SKIP: lua-format not found in PATH");
        return;
    }

    let request = FormatRequest::new("local x=1\nreturn x\n");
    let outcome = invoke(&request, "lua-format", &[])
        .await
        .expect("lua-format should spawn");

    let FormatOutcome::Formatted(formatted) = outcome else {
        panic!("expected Formatted for valid input, got {outcome:?}");
    };
    assert!(formatted.contains("local x = 1"), "got: {formatted}");
}

#[tokio::test]
async fn broken_lua_yields_positioned_errors() {
    if !lua_format_available().await {
        eprintln!("SKIP: lua-format not found in PATH");
        return;
    }

    // Unclosed table constructor
    let request = FormatRequest::new("local t = {\n");
    let outcome = invoke(&request, "lua-format", &[])
        .await
        .expect("lua-format should spawn");

    let FormatOutcome::Failed { stderr, exit_code } = outcome else {
        panic!("expected Failed for broken input, got {outcome:?}");
    };
    assert_ne!(exit_code, 0);

    let errors = parse_stderr(&stderr);
    assert!(
        !errors.is_empty(),
        "expected positional records in stderr, got: {stderr}"
    );
}
