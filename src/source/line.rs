//! Line and line-ending utilities shared by every pass
//!
//! A physical line is split once into its code segment, its comment segment
//! and its original terminator. Passes rewrite the code segment and put the
//! line back together with [`SourceLine::join`], so comment text and line
//! endings survive untouched.

use super::char_filter::comment_start;
use super::SourceDialect;

/// The exact terminator a line ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    None,
    Lf,
    CrLf,
}

impl LineEnding {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::None => "",
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Terminator to use for lines a pass inserts next to this one
    ///
    /// A final line without terminator borrows the file's dominant ending.
    #[must_use]
    pub fn or(self, fallback: LineEnding) -> LineEnding {
        if self == LineEnding::None {
            fallback
        } else {
            self
        }
    }
}

/// One physical line split into code, comment and terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Everything before the comment token (including trailing spaces)
    pub code: &'a str,
    /// The comment, starting with its token, or empty
    pub comment: &'a str,
    pub ending: LineEnding,
}

impl<'a> SourceLine<'a> {
    /// Split a target-dialect line (comments start at `//`)
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        Self::parse_in(raw, SourceDialect::Structured)
    }

    /// Split a line using the comment syntax of `dialect`
    #[must_use]
    pub fn parse_in(raw: &'a str, dialect: SourceDialect) -> Self {
        let (body, ending) = split_ending(raw);
        match comment_start(body, dialect) {
            Some(idx) => Self {
                code: &body[..idx],
                comment: &body[idx..],
                ending,
            },
            None => Self {
                code: body,
                comment: "",
                ending,
            },
        }
    }

    /// True when the line has neither code nor comment
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.code.trim().is_empty() && self.comment.is_empty()
    }

    /// True when the line carries only a comment
    #[must_use]
    pub fn is_comment_only(&self) -> bool {
        self.code.trim().is_empty() && !self.comment.is_empty()
    }

    /// Leading whitespace of the code segment
    #[must_use]
    pub fn indent(&self) -> &'a str {
        leading_whitespace(self.code)
    }

    /// Reassemble the line around a rewritten code segment
    ///
    /// The comment is re-attached verbatim with a single separating space
    /// when the new code does not already end in whitespace.
    #[must_use]
    pub fn join(&self, code: &str) -> String {
        let spacer = if self.comment.is_empty() || code.is_empty() || code.ends_with(' ') {
            ""
        } else {
            " "
        };
        format!("{code}{spacer}{}{}", self.comment, self.ending.as_str())
    }

    /// Reassemble the line keeping the original code/comment spacing
    #[must_use]
    pub fn rejoin(&self, code: &str) -> String {
        format!("{code}{}{}", self.comment, self.ending.as_str())
    }
}

/// Split a raw line into its body and terminator
#[must_use]
pub fn split_ending(raw: &str) -> (&str, LineEnding) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, LineEnding::CrLf)
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, LineEnding::Lf)
    } else {
        (raw, LineEnding::None)
    }
}

/// Split text into physical lines, keeping each terminator
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Leading whitespace of a string
#[must_use]
pub fn leading_whitespace(s: &str) -> &str {
    &s[..s.len() - s.trim_start().len()]
}

/// The terminator most lines of `text` use (CRLF wins ties)
#[must_use]
pub fn dominant_ending(text: &str) -> LineEnding {
    let crlf = text.matches("\r\n").count();
    let lf = text.matches('\n').count() - crlf;
    if crlf == 0 && lf > 0 {
        LineEnding::Lf
    } else {
        LineEnding::CrLf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code_and_comment() {
        let line = SourceLine::parse("  a := b;  // note\r\n");
        assert_eq!(line.code, "  a := b;  ");
        assert_eq!(line.comment, "// note");
        assert_eq!(line.ending, LineEnding::CrLf);
        assert_eq!(line.indent(), "  ");
    }

    #[test]
    fn test_parse_without_comment_or_ending() {
        let line = SourceLine::parse("a := b");
        assert_eq!(line.code, "a := b");
        assert_eq!(line.comment, "");
        assert_eq!(line.ending, LineEnding::None);
    }

    #[test]
    fn test_parse_legacy_semicolon_comment() {
        let line = SourceLine::parse_in("a = b ; set a\n", SourceDialect::Legacy);
        assert_eq!(line.code, "a = b ");
        assert_eq!(line.comment, "; set a");
        assert_eq!(line.ending, LineEnding::Lf);
    }

    #[test]
    fn test_join_adds_spacer() {
        let line = SourceLine::parse("INC(x)// up\n");
        assert_eq!(line.join("x := x + 1"), "x := x + 1 // up\n");
        assert_eq!(line.rejoin("x := x + 1"), "x := x + 1// up\n");
    }

    #[test]
    fn test_blank_and_comment_only() {
        assert!(SourceLine::parse("   \n").is_blank());
        assert!(SourceLine::parse("  // c\n").is_comment_only());
        assert!(!SourceLine::parse("x; // c\n").is_comment_only());
    }

    #[test]
    fn test_split_lines_keeps_endings() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a\r\n", "b\n", "c"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_dominant_ending() {
        assert_eq!(dominant_ending("a\nb\n"), LineEnding::Lf);
        assert_eq!(dominant_ending("a\r\nb\n"), LineEnding::CrLf);
        assert_eq!(dominant_ending("single"), LineEnding::CrLf);
    }
}
