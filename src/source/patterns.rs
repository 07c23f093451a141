/// Regex helpers for legacy and target dialect keywords
///
/// Static patterns are compiled once using `LazyLock`. Keyword patterns come
/// from the configurable dialect tables and are built per pass invocation.
use std::sync::LazyLock;

use regex::{Captures, Regex, RegexBuilder};

use super::char_filter::mask_strings;

/// Build a case-insensitive regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. All static patterns in this crate are
/// compile-time constants covered by tests, and keyword patterns are built
/// from escaped text, so a failure here is a programming error.
#[must_use]
pub fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

/// Identifier characters (a keyword never matches inside a longer identifier)
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Escape a keyword, letting internal spaces match any run of whitespace
fn escape_keyword(keyword: &str) -> String {
    keyword
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Pattern text for a keyword anchored at word boundaries
///
/// A boundary is only required on a side that ends in an identifier
/// character: `GOTO` becomes `\bGOTO\b`, `TIME(` becomes `\bTIME\(`.
#[must_use]
pub fn keyword_pattern(keyword: &str) -> String {
    let starts_word = keyword.chars().next().is_some_and(is_word_char);
    let ends_word = keyword.chars().last().is_some_and(is_word_char);
    format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        escape_keyword(keyword),
        if ends_word { r"\b" } else { "" }
    )
}

/// Case-insensitive word-boundary regex for a single keyword
#[must_use]
pub fn keyword_re(keyword: &str) -> Regex {
    build_re(&keyword_pattern(keyword))
}

/// Case-insensitive regex matching any of `keywords` as a whole word
///
/// Returns `None` for an empty list.
#[must_use]
pub fn any_keyword_re<S: AsRef<str>>(keywords: &[S]) -> Option<Regex> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(AsRef::as_ref)
        .filter(|k| !k.is_empty())
        .map(keyword_pattern)
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    Some(build_re(&format!("(?:{})", alternatives.join("|"))))
}

/// Apply `re` to a code segment without touching string literal contents
///
/// Matches are searched in a masked copy of `code`; the replacement closure
/// receives the captures of the masked text together with the original text
/// of the whole match. Returns the new code and the number of replacements.
pub fn replace_in_code<F>(code: &str, re: &Regex, mut replace: F) -> (String, usize)
where
    F: FnMut(&Captures<'_>, &str) -> Option<String>,
{
    let masked = mask_strings(code);
    let mut result = String::with_capacity(code.len());
    let mut last = 0;
    let mut count = 0;

    for caps in re.captures_iter(&masked) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if let Some(replacement) = replace(&caps, &code[whole.start()..whole.end()]) {
            result.push_str(&code[last..whole.start()]);
            result.push_str(&replacement);
            last = whole.end();
            count += 1;
        }
    }

    if count == 0 {
        return (code.to_string(), 0);
    }
    result.push_str(&code[last..]);
    (result, count)
}

// ===== STATIC PATTERNS =====

/// An ST single-quoted string literal (`''` and `$'` escapes)
pub const ST_STRING: &str = r"'(?:[^'$]|\$.|'')*'";

/// Statement terminator or loop-entry keyword (ends a statement)
pub static STATEMENT_END_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r";|\bDO\b"));

/// First identifier on a left-hand side
pub static BASE_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^\s*([A-Za-z_][A-Za-z0-9_]*)"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_pattern_word() {
        let re = keyword_re("GOTO");
        assert!(re.is_match("  goto label1"));
        assert!(!re.is_match("  gotoLabel"));
        assert!(!re.is_match("  MY_GOTO"));
    }

    #[test]
    fn test_keyword_pattern_call_form() {
        let re = keyword_re("INT(");
        assert!(re.is_match("x = INT(y)"));
        assert!(re.is_match("x = int(y)"));
        assert!(!re.is_match("x = UINT(y)"));
    }

    #[test]
    fn test_keyword_pattern_internal_space() {
        let re = keyword_re("ELSE IF");
        assert!(re.is_match("ELSE  IF a THEN"));
        assert!(!re.is_match("ELSIF a THEN"));
    }

    #[test]
    fn test_any_keyword_re() {
        let re = any_keyword_re(&["IF", "END_IF"]).unwrap();
        assert!(re.is_match("end_if"));
        assert!(!re.is_match("ELSIF"));
        assert!(any_keyword_re::<&str>(&[]).is_none());
    }

    #[test]
    fn test_replace_in_code_skips_strings() {
        let re = keyword_re("ENDIF");
        let (out, n) = replace_in_code("ENDIF s := 'ENDIF'", &re, |_, _| {
            Some("END_IF".to_string())
        });
        assert_eq!(out, "END_IF s := 'ENDIF'");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_statement_end_re() {
        assert!(STATEMENT_END_RE.is_match("a := 1;"));
        assert!(STATEMENT_END_RE.is_match("WHILE a DO"));
        assert!(!STATEMENT_END_RE.is_match("DONE := 1"));
    }

    #[test]
    fn test_st_string_literal() {
        let re = Regex::new(&format!("^{ST_STRING}$")).unwrap();
        assert!(re.is_match("'abc'"));
        assert!(re.is_match("'it''s'"));
        assert!(re.is_match("'a$'b'"));
        assert!(!re.is_match("'abc"));
    }
}
