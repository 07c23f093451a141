//! Function block call syntax
//!
//! Legacy code calls a function block instance as `inst FUB Type(...)`. In
//! Structured Text the instance is called directly, so everything from the
//! ` FUB ` marker onward is dropped and `();` is appended.

use std::sync::LazyLock;

use regex::Regex;

use super::Rewrite;
use crate::source::patterns::build_re;
use crate::source::{mask_strings, split_lines, SourceLine};

static FUB_RE: LazyLock<Regex> = LazyLock::new(|| build_re(" FUB "));

#[must_use]
pub fn rewrite_fub_calls(text: &str) -> Rewrite {
    let mut out = String::with_capacity(text.len());
    let mut total = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        let Some(marker) = FUB_RE.find(&mask_strings(line.code)).map(|m| m.start()) else {
            out.push_str(raw);
            continue;
        };

        let mut code = line.code[..marker].trim_end().to_string();
        if !code.is_empty() && !code.ends_with("();") {
            code.push_str("();");
        }
        out.push_str(&line.join(&code));
        total += 1;
    }

    if total == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out, total)
}
