/// `CharFilter` - Iterator that separates code from string literals and comments
///
/// Wraps a char iterator over one line and tracks whether we are inside a
/// string literal or a line comment. Every pass that must not touch literal
/// text or comment text goes through this filter so that all of them agree on
/// where those boundaries are.
use super::SourceDialect;

/// Type of string delimiter we're currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringDelimiter {
    #[default]
    None,
    Single, // '...'
    Double, // "..."
}

impl StringDelimiter {
    fn from_quote(c: char) -> Self {
        match c {
            '\'' => Self::Single,
            '"' => Self::Double,
            _ => Self::None,
        }
    }

    fn closes_with(self, c: char) -> bool {
        matches!((self, c), (Self::Single, '\'') | (Self::Double, '"'))
    }
}

/// Iterator adapter that filters out string contents and comments
///
/// Yields (byte position, character) pairs for code characters. Quote
/// delimiters themselves count as code; the characters between them do not.
/// Inside a string, `$` escapes the following character (`$'`, `$$`, `$N`).
pub struct CharFilter<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    dialect: SourceDialect,
    filter_comments: bool,
    filter_strings: bool,
    instring: StringDelimiter,
    escaped: bool,
    incomment: bool,
}

impl<'a> CharFilter<'a> {
    /// Create a new `CharFilter`
    ///
    /// # Arguments
    /// * `content` - The line to iterate over
    /// * `dialect` - Decides which tokens open a line comment
    /// * `filter_comments` - Whether to stop yielding once a comment starts
    /// * `filter_strings` - Whether to skip string literal contents
    #[must_use]
    pub fn new(
        content: &'a str,
        dialect: SourceDialect,
        filter_comments: bool,
        filter_strings: bool,
    ) -> Self {
        Self {
            chars: content.char_indices().peekable(),
            dialect,
            filter_comments,
            filter_strings,
            instring: StringDelimiter::None,
            escaped: false,
            incomment: false,
        }
    }

    /// Check if we're currently inside a string
    #[must_use]
    pub fn instring(&self) -> bool {
        self.instring != StringDelimiter::None
    }

    /// Check if a comment has started
    #[must_use]
    pub fn incomment(&self) -> bool {
        self.incomment
    }

    fn opens_comment(&mut self, c: char) -> bool {
        match c {
            '/' => self.chars.peek().is_some_and(|&(_, next)| next == '/'),
            ';' => self.dialect == SourceDialect::Legacy,
            _ => false,
        }
    }
}

impl Iterator for CharFilter<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (pos, c) = self.chars.next()?;

            if self.incomment {
                if self.filter_comments {
                    // Nothing after a line comment is code
                    return None;
                }
                return Some((pos, c));
            }

            if self.instring != StringDelimiter::None {
                if self.escaped {
                    self.escaped = false;
                } else if c == '$' {
                    self.escaped = true;
                } else if self.instring.closes_with(c) {
                    self.instring = StringDelimiter::None;
                    return Some((pos, c));
                }
                if self.filter_strings {
                    continue;
                }
                return Some((pos, c));
            }

            if c == '\'' || c == '"' {
                self.instring = StringDelimiter::from_quote(c);
                return Some((pos, c));
            }

            if self.opens_comment(c) {
                self.incomment = true;
                if self.filter_comments {
                    return None;
                }
            }

            return Some((pos, c));
        }
    }
}

/// Byte position where the line comment of `line` starts, if any
///
/// Comment tokens inside string literals are ignored.
#[must_use]
pub fn comment_start(line: &str, dialect: SourceDialect) -> Option<usize> {
    let mut filter = CharFilter::new(line, dialect, false, true);
    while let Some((pos, _)) = filter.next() {
        if filter.incomment() {
            return Some(pos);
        }
    }
    None
}

/// Replace the text of `(* ... *)` block comments with spaces
///
/// `in_block` is the block state on entry and is left as the state on exit,
/// so a block left open on one line keeps masking the following lines.
/// Block tokens inside string literals or after a line comment are not
/// recognised. The result has the same byte length as the input.
#[must_use]
pub fn mask_block_comments(line: &str, dialect: SourceDialect, in_block: &mut bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.char_indices().peekable();
    let mut instring = StringDelimiter::None;
    let mut escaped = false;

    while let Some((pos, c)) = chars.next() {
        if *in_block {
            if c == '*' && chars.peek().is_some_and(|&(_, next)| next == ')') {
                chars.next();
                *in_block = false;
                out.push_str("  ");
            } else {
                out.push_str(&" ".repeat(c.len_utf8()));
            }
            continue;
        }

        if instring != StringDelimiter::None {
            if escaped {
                escaped = false;
            } else if c == '$' {
                escaped = true;
            } else if instring.closes_with(c) {
                instring = StringDelimiter::None;
            }
            out.push(c);
            continue;
        }

        match c {
            '\'' | '"' => {
                instring = StringDelimiter::from_quote(c);
                out.push(c);
            }
            '(' if chars.peek().is_some_and(|&(_, next)| next == '*') => {
                chars.next();
                *in_block = true;
                out.push_str("  ");
            }
            '/' if chars.peek().is_some_and(|&(_, next)| next == '/') => {
                out.push_str(&line[pos..]);
                break;
            }
            ';' if dialect == SourceDialect::Legacy => {
                out.push_str(&line[pos..]);
                break;
            }
            _ => out.push(c),
        }
    }
    out
}

/// Get a vector indicating which byte positions hold code
/// (i.e., outside string literal contents and comments)
#[must_use]
pub fn code_positions(line: &str) -> Vec<bool> {
    let mut code = vec![false; line.len()];
    for (pos, c) in CharFilter::new(line, SourceDialect::Structured, true, true) {
        code[pos..pos + c.len_utf8()].fill(true);
    }
    code
}

/// Replace the contents of string literals with spaces
///
/// The result has the same byte length as the input so match positions found
/// in the masked text can be applied to the original.
#[must_use]
pub fn mask_strings(code: &str) -> String {
    let positions = code_positions(code);
    code.char_indices()
        .map(|(pos, c)| {
            if positions[pos] {
                c.to_string()
            } else {
                " ".repeat(c.len_utf8())
            }
        })
        .collect()
}
