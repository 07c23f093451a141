//! LOOP/ENDLOOP conversion
//!
//! A counted `LOOP i = 1 TO 10 DO` becomes `FOR`, `ENDLOOP` becomes
//! `END_FOR` and a descending `DOWNTO` becomes `TO` on the converted line.
//! An endless `LOOP` with nothing after it has no direct equivalent: the line
//! is kept and an error notice is put above it.

use std::sync::LazyLock;

use regex::Regex;

use super::{notice_line, repeats_notice, Breakdown, Rewrite};
use crate::source::patterns::{build_re, replace_in_code};
use crate::source::{dominant_ending, split_lines, SourceLine};

pub const ENDLESS_LOOP_NOTICE: &str = "### CONVERSION ERROR ### This code snippet can not be \
     converted automatically. Use REPEAT...END_REPEAT or WHILE...END_WHILE instead.";

static ENDLESS_LOOP_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^\s*LOOP\b[\s;\\]*$"));
static LOOP_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\bLOOP\b"));
static ENDLOOP_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\bENDLOOP\b"));
static DOWNTO_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\bDOWNTO\b"));

#[must_use]
pub fn rewrite_loops(text: &str) -> Rewrite {
    let fallback = dominant_ending(text);
    let mut out: Vec<String> = Vec::new();
    let mut conversions = 0;
    let mut warnings = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);

        if ENDLESS_LOOP_RE.is_match(line.code) {
            if !repeats_notice(out.last(), ENDLESS_LOOP_NOTICE) {
                let eol = line.ending.or(fallback).as_str();
                out.push(notice_line(line.indent(), ENDLESS_LOOP_NOTICE, eol));
                warnings += 1;
            }
            out.push(raw.to_string());
            continue;
        }

        let (code, ends) = replace_in_code(line.code, &ENDLOOP_RE, |_, _| Some("END_FOR".into()));
        let (code, starts) = replace_in_code(&code, &LOOP_RE, |_, _| Some("FOR".into()));
        let (code, downs) = if starts > 0 {
            replace_in_code(&code, &DOWNTO_RE, |_, _| Some("TO".into()))
        } else {
            (code, 0)
        };

        if ends + starts + downs == 0 {
            out.push(raw.to_string());
        } else {
            out.push(line.rejoin(&code));
            conversions += ends + starts;
        }
    }

    if conversions + warnings == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out.concat(), conversions + warnings)
        .with_breakdown(Breakdown::Loop { conversions, warnings })
}
