//! Manual-fix annotator
//!
//! Constructs that have no automatic translation (jumps, numeric casts) are
//! left in place; a `// ### CONVERSION ERROR ###` notice is inserted above
//! the offending line so the user can find and fix them by hand. Text in
//! string literals, line comments and `(* *)` blocks is never matched.

use regex::Regex;

use super::{notice_line, repeats_notice, Rewrite};
use crate::config::ManualFix;
use crate::source::line::split_ending;
use crate::source::patterns::keyword_re;
use crate::source::{
    dominant_ending, leading_whitespace, mask_block_comments, mask_strings, split_lines,
    SourceDialect, SourceLine,
};

/// Insert a notice before every line whose code uses a table entry
///
/// The first matching entry decides the notice. Returns the number of notices inserted.
#[must_use]
pub fn annotate_manual_fixes(text: &str, fixes: &[ManualFix], dialect: SourceDialect) -> Rewrite {
    let patterns: Vec<(Regex, &str)> = fixes
        .iter()
        .filter(|f| !f.keyword.is_empty())
        .map(|f| (keyword_re(&f.keyword), f.message.as_str()))
        .collect();
    if patterns.is_empty() {
        return Rewrite::unchanged(text);
    }

    let fallback = dominant_ending(text);
    let mut out: Vec<String> = Vec::new();
    let mut inserted = 0;
    let mut in_block = false;

    for raw in split_lines(text) {
        let (body, ending) = split_ending(raw);
        let visible = mask_block_comments(body, dialect, &mut in_block);
        let line = SourceLine::parse_in(&visible, dialect);
        let code = mask_strings(line.code);

        if let Some((_, message)) = patterns.iter().find(|(re, _)| re.is_match(&code)) {
            if !repeats_notice(out.last(), message) {
                let indent = leading_whitespace(raw);
                let ending = ending.or(fallback).as_str();
                for message_line in message.lines() {
                    out.push(notice_line(indent, message_line, ending));
                }
                inserted += 1;
            }
        }
        out.push(raw.to_string());
    }

    if inserted == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out.concat(), inserted)
}
