//! Error handling types for seisho.
//!
//! This module provides error types used throughout the formatter bridge.

use thiserror::Error;

/// Comprehensive error type for formatter invocations.
///
/// A spawn or stdin-write failure means the formatter never saw the
/// document, so these variants carry no positional information and must
/// never be fed to the stderr parser.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The formatter binary could not be started (missing, not executable)
    #[error("failed to spawn formatter '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the document to the formatter's stdin failed
    #[error("failed to write document to formatter stdin: {0}")]
    Stdin(#[source] std::io::Error),

    /// Collecting the formatter's output failed
    #[error("IO error while running formatter: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for formatter operations
pub type FormatResult<T> = Result<T, FormatError>;

impl FormatError {
    /// Remediation hint shown to the user on an explicit format action.
    ///
    /// Background validation never surfaces this; it would turn a missing
    /// binary into a popup per keystroke.
    pub fn remediation(&self, command: &str) -> String {
        match self {
            FormatError::Spawn { .. } => format!(
                "Could not run '{command}'. Check that it is installed and on PATH, \
                 or set the formatter command in the seisho configuration.",
            ),
            FormatError::Stdin(_) | FormatError::Io(_) => format!(
                "'{command}' did not accept the document on stdin. \
                 Check the formatter installation and configured command.",
            ),
        }
    }
}
