//! Comment normalizer
//!
//! Turns block comments and legacy `;` comments into `//` line comments.
//!
//! - A line starting with `(*` gets `//` instead; a block spanning several
//!   lines becomes one `//` line per source line, with the ` *` continuation
//!   prefix and the closing `*)` removed.
//! - In legacy sources the `;` that opens a trailing comment becomes `//`.
//! - Blank lines sitting between two `//` lines are dropped.
//!
//! Lines that already contain `//` are left alone. When anything changes the
//! whole file is written with CRLF line endings, the save format of the
//! legacy toolchain.

use std::sync::LazyLock;

use regex::Regex;

use super::Rewrite;
use crate::source::line::split_ending;
use crate::source::patterns::build_re;
use crate::source::{comment_start, leading_whitespace, split_lines, LineEnding, SourceDialect};

/// A line opening a block comment: indentation, then `(*`
static BLOCK_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^(\s*)\(\*(.*)$"));

fn is_line_comment(line: &str) -> bool {
    line.trim_start().starts_with("//")
}

/// Remove a leading `*` continuation marker and the space after it
fn strip_continuation(rest: &str) -> &str {
    match rest.strip_prefix('*') {
        Some(after) => after.strip_prefix(' ').unwrap_or(after),
        None => rest,
    }
}

#[must_use]
pub fn normalize_comments(text: &str, dialect: SourceDialect) -> Rewrite {
    let lines = split_lines(text);
    let mut out: Vec<(String, LineEnding)> = Vec::with_capacity(lines.len());
    let mut in_block = false;
    let mut changes = 0;

    for (i, raw) in lines.iter().enumerate() {
        let (body, ending) = split_ending(raw);

        if body.trim().is_empty() {
            let prev_is_comment = out.last().is_some_and(|(b, _)| is_line_comment(b));
            let next_is_comment = lines.get(i + 1).is_some_and(|n| is_line_comment(n));
            if in_block || (prev_is_comment && next_is_comment) {
                changes += 1;
                continue;
            }
            out.push((body.to_string(), ending));
            continue;
        }

        if in_block {
            if body.contains("//") {
                if body.contains("*)") {
                    in_block = false;
                }
                out.push((body.to_string(), ending));
                continue;
            }

            let leading = leading_whitespace(body);
            let rest = &body[leading.len()..];
            let converted = if let Some(close) = rest.find("*)") {
                in_block = false;
                let content = rest[..close].trim_start();
                let content = content
                    .strip_prefix('*')
                    .map_or(content, str::trim_start);
                format!("{leading}//{content}{}", &rest[close + 2..])
            } else {
                format!("{leading}//{}", strip_continuation(rest))
            };
            out.push((converted, ending));
            changes += 1;
            continue;
        }

        if body.contains("//") {
            out.push((body.to_string(), ending));
            continue;
        }

        if let Some(caps) = BLOCK_OPEN_RE.captures(body) {
            let leading = &caps[1];
            let rest = &caps[2];
            let converted = match rest.find("*)") {
                Some(close) => format!("{leading}//{}{}", &rest[..close], &rest[close + 2..]),
                None => {
                    in_block = true;
                    format!("{leading}//{rest}")
                }
            };
            out.push((converted, ending));
            changes += 1;
            continue;
        }

        if dialect == SourceDialect::Legacy {
            if let Some(idx) = comment_start(body, dialect) {
                if body[idx..].starts_with(';') {
                    out.push((format!("{}//{}", &body[..idx], &body[idx + 1..]), ending));
                    changes += 1;
                    continue;
                }
            }
        }

        out.push((body.to_string(), ending));
    }

    if changes == 0 {
        return Rewrite::unchanged(text);
    }

    let normalized: String = out
        .into_iter()
        .map(|(body, ending)| {
            let eol = if ending == LineEnding::None {
                ""
            } else {
                LineEnding::CrLf.as_str()
            };
            body + eol
        })
        .collect();
    Rewrite::new(normalized, changes)
}
