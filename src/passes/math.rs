//! INC/DEC expansion
//!
//! A statement consisting only of `INC(x)` or `DEC(x)` becomes an explicit
//! assignment `x := x + 1` / `x := x - 1`. Calls embedded in larger
//! expressions are left alone.

use std::sync::LazyLock;

use regex::Regex;

use super::Rewrite;
use crate::source::patterns::build_re;
use crate::source::{split_lines, SourceLine};

static INC_DEC_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^(\s*)(INC|DEC)\s*\(\s*([^)]+?)\s*\)\s*(;?)\s*$"));

#[must_use]
pub fn expand_inc_dec(text: &str) -> Rewrite {
    let mut out = String::with_capacity(text.len());
    let mut total = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        let Some(caps) = INC_DEC_RE.captures(line.code) else {
            out.push_str(raw);
            continue;
        };

        let (indent, target, terminator) = (&caps[1], &caps[3], &caps[4]);
        let op = if caps[2].eq_ignore_ascii_case("INC") { '+' } else { '-' };
        out.push_str(&line.join(&format!("{indent}{target} := {target} {op} 1{terminator}")));
        total += 1;
    }

    if total == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inc_and_dec() {
        let result = expand_inc_dec("  INC(counter)\r\n  dec( idx );\r\n");
        assert_eq!(
            result.text,
            "  counter := counter + 1\r\n  idx := idx - 1;\r\n"
        );
        assert_eq!(result.changes, 2);
    }

    #[test]
    fn test_trailing_comment_kept() {
        let result = expand_inc_dec("INC(a.b[1])// step\n");
        assert_eq!(result.text, "a.b[1] := a.b[1] + 1 // step\n");
    }

    #[test]
    fn test_embedded_call_untouched() {
        let input = "x := INC(y) + 1;\nINCREMENT(z);\n";
        assert_eq!(expand_inc_dec(input), Rewrite::unchanged(input));
    }
}
