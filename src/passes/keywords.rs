//! Table-driven keyword substitution
//!
//! Legacy spellings (`ENDIF`, `ENDSELECT`, `LSL(`, double-quoted strings, ...)
//! are replaced by their Structured Text equivalents. Word tokens match
//! case-insensitively on word boundaries; punctuation-only tokens match
//! literally. Only the code part of a line is touched, and never the inside
//! of a string literal.

use regex::Regex;

use super::Rewrite;
use crate::config::Replacement;
use crate::source::patterns::{keyword_re, replace_in_code};
use crate::source::{split_lines, SourceLine};

#[must_use]
pub fn substitute_keywords(text: &str, table: &[Replacement]) -> Rewrite {
    let rules: Vec<(Regex, &str)> = table
        .iter()
        .filter(|r| !r.from.is_empty())
        .map(|r| (keyword_re(&r.from), r.to.as_str()))
        .collect();
    if rules.is_empty() {
        return Rewrite::unchanged(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut total = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        let mut code = line.code.to_string();
        let mut line_changes = 0;

        for (re, to) in &rules {
            let (replaced, n) =
                replace_in_code(&code, re, |_, matched| (matched != *to).then(|| (*to).to_string()));
            if n > 0 {
                code = replaced;
                line_changes += n;
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
