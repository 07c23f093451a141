//! String literal to `ADR(...)` wrapping
//!
//! Two passes share this module:
//!
//! - [`wrap_typed_assignments`] looks at assignments of a bare string literal
//!   and decides from the declared type of the target what to do: `STRING`
//!   targets stay as they are, `UDINT` targets get `ADR('...')`, anything
//!   else gets a warning comment above the line. Conditions spanning
//!   several lines are left alone.
//! - [`wrap_whitelisted_arguments`] wraps every string literal that starts an
//!   argument of a whitelisted low-level function (`strcpy`, `memset`, ...),
//!   regardless of types.

use std::sync::LazyLock;

use regex::Regex;

use super::ignore_region::{IgnoreRegions, RegionState, Segment};
use super::{notice_line, repeats_notice, Rewrite};
use crate::config::KeywordPair;
use crate::declarations::{TypeLookup, VarKind};
use crate::source::patterns::{build_re, BASE_VAR_RE, ST_STRING};
use crate::source::{dominant_ending, leading_whitespace, mask_strings, split_lines, SourceLine};

pub const UNKNOWN_TYPE_WARNING: &str = "### CONVERSION WARNING ### The data type of the variable \
     could not be determined. Make sure the variable is of type STRING or add ADR(...) if necessary.";

/// `target := 'literal'` alone on a line; a plain `=` is accepted as well
static STRING_ASSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"^(\s*)([^=:<>']*?)(:?=)(\s*)({ST_STRING})(\s*;?)\s*$"
    ))
});

/// A string literal at the very start of the input
static LEADING_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!("^{ST_STRING}")));

/// Wrap or flag string literal assignments by the declared type of the target
///
/// Lines inside a keyword-pair condition (`IF ... THEN` over several lines)
/// hold comparisons, not assignments, and are skipped.
#[must_use]
pub fn wrap_typed_assignments(
    text: &str,
    declarations: &dyn TypeLookup,
    condition_pairs: &[KeywordPair],
) -> Rewrite {
    let fallback = dominant_ending(text);
    let regions = IgnoreRegions::new(condition_pairs);
    let mut state = RegionState::Closed;
    let mut out: Vec<String> = Vec::new();
    let mut total = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        let opened_before = state != RegionState::Closed;
        let segments = regions.segment(&mask_strings(line.code), &mut state);
        let in_condition =
            opened_before || segments.iter().any(|s| matches!(s, Segment::Ignored(_)));

        let Some(caps) = STRING_ASSIGN_RE
            .captures(line.code)
            .filter(|_| !in_condition)
        else {
            out.push(raw.to_string());
            continue;
        };

        let kind = BASE_VAR_RE
            .captures(&caps[2])
            .map_or(VarKind::Unknown, |base| declarations.classify(&base[1]));

        match kind {
            VarKind::Textual => out.push(raw.to_string()),
            VarKind::AddressSized => {
                let Some(literal) = caps.get(5) else {
                    out.push(raw.to_string());
                    continue;
                };
                let code = format!(
                    "{}ADR({}){}",
                    &line.code[..literal.start()],
                    literal.as_str(),
                    &line.code[literal.end()..]
                );
                out.push(line.rejoin(&code));
                total += 1;
            }
            VarKind::Unknown => {
                if !repeats_notice(out.last(), UNKNOWN_TYPE_WARNING) {
                    let eol = line.ending.or(fallback).as_str();
                    out.push(notice_line(&caps[1], UNKNOWN_TYPE_WARNING, eol));
                    total += 1;
                }
                out.push(raw.to_string());
            }
        }
    }

    if total == 0 {
        return Rewrite::unchanged(text);
    }
    Rewrite::new(out.concat(), total)
}

/// Byte index of the `)` closing the `(` at `open`
fn matching_paren(masked: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in masked.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Wrap literals that start an argument (list start or right after a comma)
///
/// `masked` is `args` with string contents blanked out, so commas inside
/// literals are not taken as separators. Spacing before a literal is kept.
fn wrap_argument_literals(args: &str, masked: &str) -> (String, usize) {
    let boundaries =
        std::iter::once(0).chain(masked.match_indices(',').map(|(i, _)| i + 1));

    let mut out = String::with_capacity(args.len() + 16);
    let mut last = 0;
    let mut count = 0;

    for start in boundaries {
        let literal_start = start + leading_whitespace(&args[start..]).len();
        let Some(literal) = LEADING_LITERAL_RE.find(&args[literal_start..]) else {
            continue;
        };
        out.push_str(&args[last..literal_start]);
        out.push_str("ADR(");
        out.push_str(literal.as_str());
        out.push(')');
        last = literal_start + literal.end();
        count += 1;
    }

    if count == 0 {
        return (args.to_string(), 0);
    }
    out.push_str(&args[last..]);
    (out, count)
}

#[must_use]
pub fn wrap_whitelisted_arguments(text: &str, functions: &[String]) -> Rewrite {
    let names: Vec<String> = functions
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| regex::escape(f))
        .collect();
    if names.is_empty() {
        return Rewrite::unchanged(text);
    }
    let call_re = build_re(&format!(r"\b(?:{})\s*\(", names.join("|")));

    let mut out = String::with_capacity(text.len());
    let mut total = 0;

    for raw in split_lines(text) {
        let line = SourceLine::parse(raw);
        let mut code = line.code.to_string();
        let mut changed = false;
        let mut pos = 0;

        loop {
            let masked = mask_strings(&code);
            let Some(call) = call_re.find_at(&masked, pos) else {
                break;
            };
            let open = call.end() - 1;
            let Some(close) = matching_paren(&masked, open) else {
                break;
            };

            let (args, n) = wrap_argument_literals(&code[open + 1..close], &masked[open + 1..close]);
            if n > 0 {
                code = format!("{}{args}{}", &code[..=open], &code[close..]);
                changed = true;
            }
            // Calls nested in the argument list are visited too
            pos = open + 1;
        }

        if changed {
            out.push_str(&line.rejoin(&code));
            total += 1;
        } else {
            out.push_str(raw);
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
    use crate::declarations::SiblingDeclarations;

    fn lookup() -> SiblingDeclarations {
        SiblingDeclarations::from_sources(vec![
            "VAR\n  sName : STRING[20];\n  pText : UDINT;\n  count : INT;\nEND_VAR\n".to_string(),
        ])
    }

    fn typed(text: &str) -> Rewrite {
        let pairs = crate::config::DialectTables::default().ignore_equals_pairs;
        wrap_typed_assignments(text, &lookup(), &pairs)
    }

    fn whitelist() -> Vec<String> {
        crate::config::DialectTables::default().adr_functions
    }

    #[test]
    fn test_string_target_untouched() {
        let input = "sName := 'hello';\n";
        assert_eq!(typed(input), Rewrite::unchanged(input));
    }

    #[test]
    fn test_udint_target_wrapped() {
        let result = typed("  pText := 'it''s';  // msg\r\n");
        assert_eq!(result.text, "  pText := ADR('it''s');  // msg\r\n");
        assert_eq!(result.changes, 1);
    }

    #[test]
    fn test_legacy_equals_accepted() {
        let result = typed("pText = 'x'\n");
        assert_eq!(result.text, "pText = ADR('x')\n");
    }

    #[test]
    fn test_unknown_type_gets_warning_once() {
        let first = typed("    count := 'a';\n");
        assert_eq!(
            first.text,
            format!("    // {UNKNOWN_TYPE_WARNING}\n    count := 'a';\n")
        );
        assert_eq!(first.changes, 1);
        assert_eq!(typed(&first.text).changes, 0);
    }

    #[test]
    fn test_member_access_uses_base_variable() {
        let result = typed("pText.x := 'v';\n");
        assert_eq!(result.text, "pText.x := ADR('v');\n");
    }

    #[test]
    fn test_not_a_plain_literal_assignment() {
        let input = "pText := ADR('v');\ns := 'a' + 'b';\nIF s = 'a' THEN\n";
        assert_eq!(typed(input), Rewrite::unchanged(input));
    }

    #[test]
    fn test_comparison_inside_condition_untouched() {
        let input = "IF a = 1 AND\n    s = 'x'\nTHEN\n    count := 'a';\nEND_IF\n";
        let result = typed(input);
        assert_eq!(result.changes, 1);
        assert_eq!(
            result.text,
            format!(
                "IF a = 1 AND\n    s = 'x'\nTHEN\n    // {UNKNOWN_TYPE_WARNING}\n    count := 'a';\nEND_IF\n"
            )
        );
    }

    #[test]
    fn test_condition_opening_line_untouched() {
        let input = "WHILE s = 'x'\nDO\n";
        assert_eq!(typed(input), Rewrite::unchanged(input));
    }

    #[test]
    fn test_whitelisted_call_arguments() {
        let result = wrap_whitelisted_arguments("strcpy(ADR(buf), 'abc');\n", &whitelist());
        assert_eq!(result.text, "strcpy(ADR(buf), ADR('abc'));\n");
        assert_eq!(result.changes, 1);
    }

    #[test]
    fn test_first_argument_and_spacing() {
        let result = wrap_whitelisted_arguments("x := strlen( 'a,b' );\n", &whitelist());
        assert_eq!(result.text, "x := strlen( ADR('a,b') );\n");
    }

    #[test]
    fn test_several_calls_on_one_line() {
        let result = wrap_whitelisted_arguments(
            "a := strcmp(s, 'x'); b := MEMCMP(p, 'y', 1); // strcpy('z')\n",
            &whitelist(),
        );
        assert_eq!(
            result.text,
            "a := strcmp(s, ADR('x')); b := MEMCMP(p, ADR('y'), 1); // strcpy('z')\n"
        );
        assert_eq!(result.changes, 1);
    }

    #[test]
    fn test_nested_call_arguments() {
        let result =
            wrap_whitelisted_arguments("strcat(dst, strlen('ab'), 'cd');\n", &whitelist());
        assert_eq!(result.text, "strcat(dst, strlen(ADR('ab')), ADR('cd'));\n");
    }

    #[test]
    fn test_other_functions_and_wrapped_literals_untouched() {
        let input = "myCopy(a, 'x');\nstrcpy(a, ADR('x'));\nstrcpy(a, b + 'c');\n";
        assert_eq!(wrap_whitelisted_arguments(input, &whitelist()), Rewrite::unchanged(input));
    }

    #[test]
    fn test_unbalanced_parentheses_skipped() {
        let input = "strcpy(a, 'x'\n";
        assert_eq!(wrap_whitelisted_arguments(input, &whitelist()), Rewrite::unchanged(input));
    }
}
