//! Case normalization for reserved words and built-in functions
//!
//! Upper-cases a fixed vocabulary inside the code part of each line. A word
//! never matches inside a longer identifier (`COMMAND` does not contain `AND`).
//! Vocabulary entries written with a leading or trailing space only match
//! where the source has whitespace on that side. Only real changes are
//! counted, so text already in upper case reports zero.

use regex::Regex;

use super::Rewrite;
use crate::source::patterns::build_re;
use crate::source::{mask_strings, split_lines, SourceLine};

/// What must surround a vocabulary match on one side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Any,
    Whitespace,
    NotIdentifier,
}

impl Bound {
    fn accepts(self, neighbour: Option<char>) -> bool {
        match self {
            Bound::Any => true,
            Bound::Whitespace => neighbour.is_some_and(char::is_whitespace),
            Bound::NotIdentifier => {
                !neighbour.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
            }
        }
    }
}

struct Token {
    re: Regex,
    upper: String,
    left: Bound,
    right: Bound,
}

impl Token {
    fn new(word: &str) -> Option<Self> {
        let core = word.trim();
        if core.is_empty() {
            return None;
        }
        let (left, right) = if word.starts_with(' ') || word.ends_with(' ') {
            (
                if word.starts_with(' ') { Bound::Whitespace } else { Bound::Any },
                if word.ends_with(' ') { Bound::Whitespace } else { Bound::Any },
            )
        } else {
            let ends_word = core
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
            (
                Bound::NotIdentifier,
                if ends_word { Bound::NotIdentifier } else { Bound::Any },
            )
        };
        Some(Self {
            re: build_re(&regex::escape(core)),
            upper: core.to_uppercase(),
            left,
            right,
        })
    }

    /// Upper-case every bounded match in `code`, returning the new code and real changes
    fn apply(&self, code: &str) -> (String, usize) {
        let masked = mask_strings(code);
        let mut result = String::with_capacity(code.len());
        let mut last = 0;
        let mut changes = 0;

        for m in self.re.find_iter(&masked) {
            let before = masked[..m.start()].chars().next_back();
            let after = masked[m.end()..].chars().next();
            if !self.left.accepts(before) || !self.right.accepts(after) {
                continue;
            }
            if &code[m.start()..m.end()] != self.upper {
                result.push_str(&code[last..m.start()]);
                result.push_str(&self.upper);
                last = m.end();
                changes += 1;
            }
        }

        if changes == 0 {
            return (code.to_string(), 0);
        }
        result.push_str(&code[last..]);
        (result, changes)
    }
}

#[must_use]
pub fn uppercase_reserved(text: &str, vocabulary: &[String]) -> Rewrite {
    let tokens: Vec<Token> = vocabulary.iter().filter_map(|w| Token::new(w)).collect();
    if tokens.is_empty() {
        return Rewrite::unchanged(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut total = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        let mut code = line.code.to_string();
        let mut line_changes = 0;

        for token in &tokens {
            let (converted, n) = token.apply(&code);
            if n > 0 {
                code = converted;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DialectTables;

    fn upper(text: &str) -> Rewrite {
        uppercase_reserved(text, &DialectTables::default().uppercase)
    }

    #[test]
    fn test_keywords_upper_cased() {
        let result = upper("if a and not b then\n");
        assert_eq!(result.text, "IF a AND NOT b THEN\n");
        assert_eq!(result.changes, 4);
    }

    #[test]
    fn test_identifier_substrings_untouched() {
        let input = "command := doIt + todo_count;\n";
        assert_eq!(upper(input), Rewrite::unchanged(input));
    }

    #[test]
    fn test_call_form_needs_left_boundary_only() {
        let result = upper("x := abs(y) + sizeof(z);\n");
        assert_eq!(result.text, "x := ABS(y) + SIZEOF(z);\n");
        assert_eq!(result.changes, 2);
    }

    #[test]
    fn test_already_upper_counts_zero() {
        let input = "IF a THEN\n";
        assert_eq!(upper(input).changes, 0);
    }

    #[test]
    fn test_comment_and_string_untouched() {
        let input = "x := 'true or false'; // if then\n";
        assert_eq!(upper(input), Rewrite::unchanged(input));
    }

    #[test]
    fn test_whitespace_bounded_entry() {
        let vocabulary = vec![" or ".to_string()];
        let result = uppercase_reserved("a or b\nx := (a)or(b)\n", &vocabulary);
        assert_eq!(result.text, "a OR b\nx := (a)or(b)\n");
        assert_eq!(result.changes, 1);
    }

    #[test]
    fn test_for_loop_words() {
        let result = upper("for i := 10 downto 1 do\n");
        assert_eq!(result.text, "FOR i := 10 DOWNTO 1 DO\n");
    }
}
