//! SELECT/STATE/WHEN/NEXT rewriter
//!
//! | Legacy         | Structured Text                  |
//! |----------------|----------------------------------|
//! | `SELECT s`     | `CASE s OF`                      |
//! | `STATE v`      | `v:`                             |
//! | `WHEN cond`    | `IF cond THEN`                   |
//! | `NEXT v`       | `s := v` followed by `END_IF`    |
//!
//! Everything after the rewritten keyword (terminator, trailing comment) is
//! kept in its original order. Open CASE blocks are tracked on a stack so a
//! `NEXT` assigns the selector of the innermost enclosing SELECT; a `NEXT`
//! outside any SELECT is left as it is.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Rewrite;
use crate::source::patterns::build_re;
use crate::source::{dominant_ending, split_lines, SourceLine};

static SELECT_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^(\s*)SELECT\b\s+([^\s;]+)"));
static STATE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^(\s*)STATE\b\s+([^\s;]+)"));
static NEXT_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^(\s*)NEXT\b\s+([^\s;]+)"));
static WHEN_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^(\s*)WHEN\b\s*"));
static CASE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^\s*CASE\b.*\bOF\b"));
static CASE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^\s*(?:END_CASE|ENDCASE|ENDSELECT)\b"));

/// Captures of a keyword line whose operand is not an assignment operator
///
/// `state := 1` uses `STATE` as a variable name, not as a keyword.
fn keyword_line<'c>(re: &Regex, code: &'c str) -> Option<Captures<'c>> {
    re.captures(code)
        .filter(|caps| !caps[2].starts_with(':') && !caps[2].starts_with('='))
}

fn is_assignment(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.starts_with(":=") || (rest.starts_with('=') && !rest.starts_with("=="))
}

/// Split the text after `WHEN` into condition and tail (spaces, optional `;`)
fn split_condition(rest: &str) -> (&str, &str) {
    let trimmed = rest.trim_end();
    let body = trimmed.strip_suffix(';').map_or(trimmed, str::trim_end);
    (body.trim(), &rest[body.len()..])
}

#[must_use]
pub fn rewrite_select(text: &str) -> Rewrite {
    let fallback = dominant_ending(text);
    let mut out = String::with_capacity(text.len());
    // One entry per open CASE block: the selector for SELECT blocks, None for native CASE
    let mut open_blocks: Vec<Option<String>> = Vec::new();
    let mut total = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        let code = line.code;

        if let Some(caps) = keyword_line(&SELECT_RE, code) {
            let (indent, selector) = (&caps[1], &caps[2]);
            let tail = &code[caps.get(0).map_or(0, |m| m.end())..];
            out.push_str(&line.rejoin(&format!("{indent}CASE {selector} OF{tail}")));
            open_blocks.push(Some(selector.to_string()));
            total += 1;
            continue;
        }

        if let Some(caps) = keyword_line(&STATE_RE, code) {
            let (indent, value) = (&caps[1], &caps[2]);
            let tail = &code[caps.get(0).map_or(0, |m| m.end())..];
            out.push_str(&line.rejoin(&format!("{indent}{value}:{tail}")));
            total += 1;
            continue;
        }

        if let Some(m) = WHEN_RE.captures(code) {
            let end = m.get(0).map_or(0, |g| g.end());
            let rest = &code[end..];
            let (condition, tail) = split_condition(rest);
            if !condition.is_empty() && !is_assignment(rest) {
                out.push_str(&line.rejoin(&format!("{}IF {condition} THEN{tail}", &m[1])));
                total += 1;
                continue;
            }
        }

        if let Some(caps) = keyword_line(&NEXT_RE, code) {
            let selector = open_blocks.iter().rev().find_map(Option::as_ref);
            if let Some(selector) = selector {
                let (indent, value) = (&caps[1], &caps[2]);
                let tail = &code[caps.get(0).map_or(0, |m| m.end())..];
                let eol = line.ending.or(fallback).as_str();
                out.push_str(&format!(
                    "{indent}{selector} := {value}{tail}{}{eol}",
                    line.comment
                ));
                out.push_str(&format!("{indent}END_IF{}", line.ending.as_str()));
                total += 1;
                continue;
            }
        }

        if CASE_OPEN_RE.is_match(code) {
            open_blocks.push(None);
        } else if CASE_CLOSE_RE.is_match(code) {
            open_blocks.pop();
        }
        out.push_str(raw);
    }

    if total == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out, total)
}
