//! External formatter invocation.
//!
//! The formatter is an opaque oracle: it reads the whole document on
//! stdin and either writes the formatted text to stdout (exit 0) or
//! reports problems on stderr (non-zero exit). Spawning, feeding stdin,
//! and waiting for exit are all suspension points; the caller decides
//! what each outcome means.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{FormatError, FormatResult};

const LOG_TARGET: &str = "seisho::invoke";

/// A single formatter invocation. Immutable, created fresh per run.
#[derive(Debug, Clone)]
pub struct FormatRequest {
    pub text: String,
    pub working_dir: Option<PathBuf>,
}

impl FormatRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }
}

/// What the formatter process reported once it exited.
///
/// Failure to start the process at all is not an outcome but an
/// [`FormatError`]: it carries no positional information and must not be
/// parsed for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatOutcome {
    /// Exit 0: stdout holds the formatted document
    Formatted(String),
    /// Non-zero exit: stderr (or a fallback message) plus the exit code
    Failed { stderr: String, exit_code: i32 },
}

/// Run the formatter against the request text.
///
/// The full input is written to the child's stdin and the stream is shut
/// down to signal end-of-input, while stdout/stderr are accumulated until
/// the process exits. The write runs concurrently with output collection
/// so a formatter that streams its output cannot deadlock on full pipes.
pub async fn invoke(
    request: &FormatRequest,
    command: &str,
    args: &[String],
) -> FormatResult<FormatOutcome> {
    let mut cmd = Command::new(command);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &request.working_dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| FormatError::Spawn {
        command: command.to_string(),
        source,
    })?;

    let mut stdin = child.stdin.take().ok_or_else(|| {
        FormatError::Stdin(std::io::Error::other("formatter stdin was not captured"))
    })?;

    let text = request.text.clone();
    let writer = tokio::spawn(async move {
        stdin.write_all(text.as_bytes()).await?;
        stdin.shutdown().await
    });

    let output = child.wait_with_output().await?;

    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            // A formatter that exits early (e.g. on a syntax error) may
            // close its stdin before consuming all input. Only treat the
            // write failure as fatal when the process gave us nothing to
            // work with instead.
            if output.status.success() || !output.stderr.is_empty() {
                log::debug!(
                    target: LOG_TARGET,
                    "formatter closed stdin early: {err}"
                );
            } else {
                return Err(FormatError::Stdin(err));
            }
        }
        Err(join_err) => {
            return Err(FormatError::Stdin(std::io::Error::other(join_err)));
        }
    }

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        log::trace!(
            target: LOG_TARGET,
            "formatter '{command}' succeeded ({} bytes out)",
            stdout.len()
        );
        Ok(FormatOutcome::Formatted(stdout))
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let stderr = if stderr.trim().is_empty() {
            format!("formatter '{command}' exited with status {exit_code}")
        } else {
            stderr
        };
        log::debug!(
            target: LOG_TARGET,
            "formatter '{command}' failed with status {exit_code}"
        );
        Ok(FormatOutcome::Failed { stderr, exit_code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let request = FormatRequest::new("a=1\n");
        let result = invoke(&request, "seisho-test-no-such-binary", &[]).await;
        assert!(matches!(result, Err(FormatError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn echo_formatter_returns_input_unchanged() {
        let request = FormatRequest::new("a=1\n");
        let outcome = invoke(&request, "cat", &[])
            .await
            .expect("cat should spawn");
        assert_eq!(outcome, FormatOutcome::Formatted("a=1\n".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_with_silent_stderr_gets_fallback_message() {
        let request = FormatRequest::new("");
        let outcome = invoke(
            &request,
            "sh",
            &["-c".to_string(), "cat >/dev/null; exit 3".to_string()],
        )
        .await
        .expect("sh should spawn");

        match outcome {
            FormatOutcome::Failed { stderr, exit_code } => {
                assert_eq!(exit_code, 3);
                assert!(stderr.contains("status 3"), "got: {stderr}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_is_captured_on_failure() {
        let request = FormatRequest::new("x\n");
        let outcome = invoke(
            &request,
            "sh",
            &[
                "-c".to_string(),
                "cat >/dev/null; echo '<stdin>:1:1: oops' >&2; exit 1".to_string(),
            ],
        )
        .await
        .expect("sh should spawn");

        match outcome {
            FormatOutcome::Failed { stderr, exit_code } => {
                assert_eq!(exit_code, 1);
                assert!(stderr.contains("<stdin>:1:1: oops"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
