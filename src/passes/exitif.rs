//! EXITIF expansion
//!
//! `EXITIF cond` becomes a three-line conditional exit:
//!
//! ```text
//! IF cond THEN
//!     EXIT;
//! END_IF
//! ```
//!
//! The unconditional `EXITIF TRUE` is already handled by the keyword table.

use std::sync::LazyLock;

use regex::Regex;

use super::Rewrite;
use crate::source::patterns::build_re;
use crate::source::{dominant_ending, split_lines, SourceLine};

static EXITIF_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^(\s*)EXITIF\b(.*)$"));

#[must_use]
pub fn rewrite_exitif(text: &str) -> Rewrite {
    let fallback = dominant_ending(text);
    let mut out = String::with_capacity(text.len());
    let mut total = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        let Some(caps) = EXITIF_RE.captures(line.code) else {
            out.push_str(raw);
            continue;
        };

        let rest = caps[2].trim();
        let condition = rest.strip_suffix(';').map_or(rest, str::trim_end);
        if condition.is_empty() {
            out.push_str(raw);
            continue;
        }

        let indent = &caps[1];
        let eol = line.ending.or(fallback).as_str();
        let block = format!(
            "{indent}IF {condition} THEN{eol}{indent}    EXIT;{eol}{indent}END_IF"
        );
        out.push_str(&line.join(&block));
        total += 1;
    }

    if total == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out, total)
}
