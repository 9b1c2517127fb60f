//! Minimal text edits between a document and its formatted output.

use similar::{DiffTag, TextDiff};
use tower_lsp_server::ls_types::{Position, Range, TextEdit};

/// Compute line-based edits that turn `original` into `formatted`.
///
/// Returns an empty vector when the texts are equal, so a formatter that
/// is already satisfied produces no edits at all. Edits are grouped per
/// changed line run rather than replacing the whole document, which keeps
/// cursors and folds stable in the client.
pub fn replacement_edits(original: &str, formatted: &str) -> Vec<TextEdit> {
    if original == formatted {
        return Vec::new();
    }

    let diff = TextDiff::from_lines(original, formatted);
    let formatted_lines: Vec<&str> = formatted.split_inclusive('\n').collect();

    let mut edits = Vec::new();
    for op in diff.ops() {
        if op.tag() == DiffTag::Equal {
            continue;
        }
        let old = op.old_range();
        let new = op.new_range();

        let new_text = formatted_lines
            .get(new.start..new.end)
            .map(|lines| lines.concat())
            .unwrap_or_default();

        edits.push(TextEdit {
            range: Range {
                start: Position::new(old.start as u32, 0),
                end: Position::new(old.end as u32, 0),
            },
            new_text,
        });
    }

    edits
}
