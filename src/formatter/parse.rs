//! Positional error extraction from formatter stderr.
//!
//! Formatters in the lua-format family report problems as
//! `<stdin>:<line>:<column>: <message>` records, 1-based, one or more per
//! run, sometimes wrapped across lines by the terminal width. Parsing is
//! total: input that matches nothing yields an empty vector, and the
//! caller decides whether that means "no errors" or "failure of unknown
//! shape".

use std::sync::LazyLock;

use regex::Regex;

/// Marker that starts one error record. Line and column are 1-based.
static RECORD_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<stdin>:(\d+):(\d+):").expect("record marker pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// One structured error extracted from stderr. Coordinates are 0-based to
/// match LSP document positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Extract all positional error records from raw stderr text.
///
/// Whitespace runs (including newlines) are collapsed to single spaces
/// first, so records split across lines are still recovered. Each record's
/// message extends to the next record marker or the end of input, trimmed.
pub fn parse_stderr(stderr: &str) -> Vec<PositionedError> {
    let flattened = WHITESPACE_RUN.replace_all(stderr, " ");
    let flat: &str = flattened.as_ref();

    let markers: Vec<_> = RECORD_MARKER.captures_iter(flat).collect();
    let mut errors = Vec::with_capacity(markers.len());

    for (index, captures) in markers.iter().enumerate() {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let (Ok(line), Ok(column)) = (captures[1].parse::<u32>(), captures[2].parse::<u32>())
        else {
            // Absurdly large coordinates; skip the record rather than wrap
            continue;
        };

        let message_end = markers
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(flat.len());
        let message = flat[whole.end()..message_end].trim().to_string();

        errors.push(PositionedError {
            line: line.saturating_sub(1),
            column: column.saturating_sub(1),
            message,
        });
    }

    errors
}
