//! Statement terminator insertion
//!
//! Appends `;` to the code part of every statement line, right before a
//! trailing comment if there is one. Lines ending in `;` or a label colon,
//! and lines mentioning a block keyword (`IF`, `END_FOR`, `_CYCLIC`, ...),
//! are not terminated.
//!
//! A trailing `\` continuation marker is always removed, also on block
//! keyword lines, and a line that had one is never terminated. Trailing
//! whitespace at the end of the file is trimmed.

use super::{Breakdown, Rewrite};
use crate::source::patterns::any_keyword_re;
use crate::source::{mask_strings, split_lines, SourceLine};

/// Remove a continuation marker from trimmed code
fn strip_continuation(code: &str) -> (&str, bool) {
    match code.strip_suffix('\\') {
        Some(rest) => (rest.trim_end(), true),
        None => (code, false),
    }
}

#[must_use]
pub fn insert_semicolons(text: &str, ignore_keywords: &[String]) -> Rewrite {
    let ignore_re = any_keyword_re(ignore_keywords);
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut added = 0;
    let mut continuations = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        if line.is_blank() || line.is_comment_only() {
            out.push_str(raw);
            continue;
        }

        let trimmed = line.code.trim_end();
        let trailing = &line.code[trimmed.len()..];
        let (code, had_marker) = strip_continuation(trimmed);

        let ignored = ignore_re
            .as_ref()
            .is_some_and(|re| re.is_match(&mask_strings(code)));
        let terminate = !ignored
            && !had_marker
            && !code.is_empty()
            && !code.ends_with(';')
            && !code.ends_with(':');

        if had_marker {
            continuations += 1;
        }
        if terminate {
            added += 1;
        }
        if !had_marker && !terminate {
            out.push_str(raw);
            continue;
        }

        let terminator = if terminate { ";" } else { "" };
        if line.comment.is_empty() {
            out.push_str(&format!("{code}{terminator}{}", line.ending.as_str()));
        } else {
            out.push_str(&line.rejoin(&format!("{code}{terminator}{trailing}")));
        }
    }

    let eof_trimmed = out.len() != out.trim_end().len();
    if eof_trimmed {
        out.truncate(out.trim_end().len());
    }

    let changes = added + continuations + usize::from(eof_trimmed);
    if changes == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out, changes).with_breakdown(Breakdown::Semicolon {
        added,
        continuations,
        eof_trimmed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DialectTables;

    fn terminate(text: &str) -> Rewrite {
        insert_semicolons(text, &DialectTables::default().ignore_semicolon_keywords)
    }

    #[test]
    fn test_statement_gets_terminator() {
        let result = terminate("a := b\r\nc := d");
        assert_eq!(result.text, "a := b;\r\nc := d;");
        assert_eq!(
            result.breakdown,
            Breakdown::Semicolon {
                added: 2,
                continuations: 0,
                eof_trimmed: false
            }
        );
    }

    #[test]
    fn test_terminator_before_comment_keeps_spacing() {
        let result = terminate("x := 1   // set x\n");
        assert_eq!(result.text, "x := 1;   // set x");
    }

    #[test]
    fn test_label_and_terminated_lines_unchanged() {
        let input = "CASE s OF\n  0:\n    x := 1;\nEND_CASE";
        assert_eq!(terminate(input), Rewrite::unchanged(input));
    }

    #[test]
    fn test_block_keywords_not_terminated() {
        let input = "IF a THEN\n  b := 1;\nELSIF c THEN\nEND_IF";
        assert_eq!(terminate(input).changes, 0);
    }

    #[test]
    fn test_keyword_in_string_does_not_block() {
        let result = terminate("msg := 'IF'\n");
        assert_eq!(result.text, "msg := 'IF';");
    }

    #[test]
    fn test_continuation_marker_stripped() {
        let result = terminate("x := a + \\\n     b\nIF a AND \\ // more\n   b THEN\n");
        assert_eq!(
            result.text,
            "x := a +\n     b;\nIF a AND // more\n   b THEN"
        );
        assert_eq!(
            result.breakdown,
            Breakdown::Semicolon {
                added: 1,
                continuations: 2,
                eof_trimmed: true
            }
        );
    }

    #[test]
    fn test_eof_whitespace_trimmed_once() {
        let first = terminate("x := 1;\n\n  \n");
        assert_eq!(first.text, "x := 1;");
        assert_eq!(first.changes, 1);
        assert_eq!(terminate(&first.text).changes, 0);
    }

    #[test]
    fn test_blank_and_comment_lines_untouched() {
        let input = "// header\n\n  // note\nx := 1;";
        assert_eq!(terminate(input), Rewrite::unchanged(input));
    }
}
