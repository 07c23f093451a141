//! `=` to `:=` assignment rewriting
//!
//! Legacy code uses `=` both for assignment and for comparison. Within one
//! statement only the first plain `=` is the assignment; later ones are
//! comparisons. A statement that already contains `:=` has its assignment.
//! Conditions between keyword pairs (`IF ... THEN`, `WHILE ... DO`) are never
//! rewritten, also when they span several lines.

use std::ops::Range;

use super::ignore_region::{IgnoreRegions, RegionState, Segment};
use super::Rewrite;
use crate::config::KeywordPair;
use crate::source::{mask_strings, split_lines, SourceLine};

/// Rewrite the first assignment `=` in `range`, unless the statement has one
///
/// Returns the number of replacements (0 or 1).
fn rewrite_span(
    code: &str,
    masked: &str,
    range: Range<usize>,
    assigned: &mut bool,
    out: &mut String,
) -> usize {
    let bytes = masked.as_bytes();
    let mut last = range.start;
    let mut count = 0;

    for i in range.clone() {
        if bytes[i] != b'=' {
            continue;
        }
        let prev = i.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(i + 1).copied();
        if prev == Some(b':') {
            *assigned = true;
            continue;
        }
        if *assigned
            || matches!(prev, Some(b'=' | b'<' | b'>'))
            || matches!(next, Some(b'=' | b'>'))
        {
            continue;
        }
        out.push_str(&code[last..i]);
        out.push_str(":=");
        last = i + 1;
        *assigned = true;
        count += 1;
    }

    out.push_str(&code[last..range.end]);
    count
}

#[must_use]
pub fn rewrite_assignments(text: &str, ignore_pairs: &[KeywordPair]) -> Rewrite {
    let regions = IgnoreRegions::new(ignore_pairs);
    let mut state = RegionState::Closed;
    // Statements may continue over several lines
    let mut assigned = false;
    let mut out = String::with_capacity(text.len() + text.len() / 32);
    let mut total = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        if line.code.trim_end().ends_with('\\') {
            out.push_str(raw);
            continue;
        }

        let masked = mask_strings(line.code);
        let mut code = String::with_capacity(line.code.len() + 4);
        let mut line_changes = 0;

        for segment in regions.segment(&masked, &mut state) {
            match segment {
                Segment::Code(range) => {
                    line_changes += rewrite_span(line.code, &masked, range, &mut assigned, &mut code);
                }
                Segment::Ignored(range) => code.push_str(&line.code[range]),
                Segment::StatementEnd => assigned = false,
            }
        }

        if line_changes == 0 {
            out.push_str(raw);
        } else {
            out.push_str(&line.rejoin(&code));
            total += line_changes;
        }
    }

    if total == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out, total)
}
