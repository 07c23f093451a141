//! Radix literal conversion
//!
//! `$FF` becomes `16#FF` and `%1010` becomes `2#1010`. The digits must end at
//! a word boundary, so `$FFx` is not a literal and stays as it is.

use std::sync::LazyLock;

use regex::Regex;

use super::{Breakdown, Rewrite};
use crate::source::patterns::{build_re, replace_in_code};
use crate::source::{split_lines, SourceLine};

static HEX_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\$([0-9A-F]+)\b"));
static BIN_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"%([01]+)\b"));

#[must_use]
pub fn convert_radix_literals(text: &str) -> Rewrite {
    let mut out = String::with_capacity(text.len());
    let mut hex = 0;
    let mut binary = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        let (code, h) = replace_in_code(line.code, &HEX_RE, |_, matched| {
            Some(format!("16#{}", &matched[1..]))
        });
        let (code, b) = replace_in_code(&code, &BIN_RE, |_, matched| {
            Some(format!("2#{}", &matched[1..]))
        });

        if h + b == 0 {
            out.push_str(raw);
        } else {
            out.push_str(&line.rejoin(&code));
            hex += h;
            binary += b;
        }
    }

    if hex + binary == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out, hex + binary).with_breakdown(Breakdown::Radix { hex, binary })
}
