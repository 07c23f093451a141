//! Rewrite passes that turn Automation Basic text into Structured Text.
//!
//! Every pass is a total function over the whole file text:
//! `(text, context) -> Rewrite`. A pass never fails; the worst case is zero
//! matches. Passes run in the fixed order of [`PassKind::ALL`] because later
//! passes depend on the syntax produced by earlier ones (the SELECT rewriter
//! must run before the semicolon inserter, the semicolon inserter before the
//! assignment rewriter).

pub mod case_convert;
pub mod comments;
pub mod equals;
pub mod exitif;
pub mod function_blocks;
pub mod ignore_region;
pub mod keywords;
pub mod loops;
pub mod manual;
pub mod math;
pub mod numbers;
pub mod select;
pub mod semicolon;
pub mod string_adr;

use std::fmt;

use crate::config::DialectTables;
use crate::declarations::TypeLookup;
use crate::source::SourceDialect;

/// Pass-specific counters reported next to the total change count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Breakdown {
    #[default]
    Total,
    /// Hexadecimal and binary literal conversions
    Radix { hex: usize, binary: usize },
    /// Loop keyword conversions and diagnostics inserted
    Loop { conversions: usize, warnings: usize },
    /// Terminators added, continuation markers removed, trailing EOF whitespace trimmed
    Semicolon {
        added: usize,
        continuations: usize,
        eof_trimmed: bool,
    },
}

/// Result of running one pass over a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub changes: usize,
    pub breakdown: Breakdown,
}

impl Rewrite {
    /// A pass that found nothing to do
    #[must_use]
    pub fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            changes: 0,
            breakdown: Breakdown::Total,
        }
    }

    #[must_use]
    pub fn new(text: String, changes: usize) -> Self {
        Self {
            text,
            changes,
            breakdown: Breakdown::Total,
        }
    }

    #[must_use]
    pub fn with_breakdown(mut self, breakdown: Breakdown) -> Self {
        self.breakdown = breakdown;
        self
    }
}

/// Everything a pass may consult besides the text itself
pub struct PassContext<'a> {
    pub tables: &'a DialectTables,
    /// Notation the file was written in when it entered the pipeline
    pub dialect: SourceDialect,
    pub declarations: &'a dyn TypeLookup,
}

/// The rewrite passes, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    ManualFix,
    Comments,
    Keywords,
    UpperCase,
    Numbers,
    Select,
    Loop,
    IncDec,
    ExitIf,
    Semicolon,
    FunctionBlocks,
    StringAdr,
    StringAdrWhitelist,
    Equals,
}

impl PassKind {
    /// All passes in the order they are applied
    pub const ALL: [PassKind; 14] = [
        PassKind::ManualFix,
        PassKind::Comments,
        PassKind::Keywords,
        PassKind::UpperCase,
        PassKind::Numbers,
        PassKind::Select,
        PassKind::Loop,
        PassKind::IncDec,
        PassKind::ExitIf,
        PassKind::Semicolon,
        PassKind::FunctionBlocks,
        PassKind::StringAdr,
        PassKind::StringAdrWhitelist,
        PassKind::Equals,
    ];

    /// Key used in the `[passes]` table of the config file
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            PassKind::ManualFix => "manual",
            PassKind::Comments => "comment",
            PassKind::Keywords => "keywords",
            PassKind::UpperCase => "uppercase",
            PassKind::Numbers => "numbers",
            PassKind::Select => "select",
            PassKind::Loop => "loop",
            PassKind::IncDec => "math",
            PassKind::ExitIf => "exitif",
            PassKind::Semicolon => "semicolon",
            PassKind::FunctionBlocks => "functionblocks",
            PassKind::StringAdr => "string_adr",
            PassKind::StringAdrWhitelist => "string_adr_whitelist",
            PassKind::Equals => "equals",
        }
    }

    /// Command-line switch that disables this pass
    #[must_use]
    pub fn disable_flag(self) -> &'static str {
        match self {
            PassKind::ManualFix => "no-manual",
            PassKind::Comments => "no-comment",
            PassKind::Keywords => "no-keywords",
            PassKind::UpperCase => "no-uppercase",
            PassKind::Numbers => "no-numbers",
            PassKind::Select => "no-select",
            PassKind::Loop => "no-loop",
            PassKind::IncDec => "no-math",
            PassKind::ExitIf => "no-exitif",
            PassKind::Semicolon => "no-semicolon",
            PassKind::FunctionBlocks => "no-functionblocks",
            PassKind::StringAdr => "no-string-adr",
            PassKind::StringAdrWhitelist => "no-string-adr-whitelist",
            PassKind::Equals => "no-equals",
        }
    }

    /// Help text for the disable switch
    #[must_use]
    pub fn disable_help(self) -> &'static str {
        match self {
            PassKind::ManualFix => "Disable manual fix notices insertion",
            PassKind::Comments => "Disable comment conversion",
            PassKind::Keywords => "Disable keyword replacements",
            PassKind::UpperCase => "Disable uppercase conversion",
            PassKind::Numbers => "Disable number format conversion",
            PassKind::Select => "Disable SELECT/STATE/WHEN/NEXT transformation",
            PassKind::Loop => "Disable LOOP/ENDLOOP conversion",
            PassKind::IncDec => "Disable INC/DEC conversion",
            PassKind::ExitIf => "Disable EXITIF conversion",
            PassKind::Semicolon => "Disable semicolon insertion",
            PassKind::FunctionBlocks => "Disable function block syntax fix",
            PassKind::StringAdr => "Disable conditional ADR wrapping for string assignments",
            PassKind::StringAdrWhitelist => {
                "Disable ADR wrapping in whitelisted function arguments"
            }
            PassKind::Equals => "Disable equals to assignment conversion",
        }
    }

    /// Run this pass over `text`
    #[must_use]
    pub fn apply(self, text: &str, ctx: &PassContext<'_>) -> Rewrite {
        let tables = ctx.tables;
        match self {
            PassKind::ManualFix => {
                manual::annotate_manual_fixes(text, &tables.manual_fixes, ctx.dialect)
            }
            PassKind::Comments => comments::normalize_comments(text, ctx.dialect),
            PassKind::Keywords => {
                keywords::substitute_keywords(text, &tables.keyword_replacements)
            }
            PassKind::UpperCase => case_convert::uppercase_reserved(text, &tables.uppercase),
            PassKind::Numbers => numbers::convert_radix_literals(text),
            PassKind::Select => select::rewrite_select(text),
            PassKind::Loop => loops::rewrite_loops(text),
            PassKind::IncDec => math::expand_inc_dec(text),
            PassKind::ExitIf => exitif::rewrite_exitif(text),
            PassKind::Semicolon => {
                semicolon::insert_semicolons(text, &tables.ignore_semicolon_keywords)
            }
            PassKind::FunctionBlocks => function_blocks::rewrite_fub_calls(text),
            PassKind::StringAdr => string_adr::wrap_typed_assignments(
                text,
                ctx.declarations,
                &tables.ignore_equals_pairs,
            ),
            PassKind::StringAdrWhitelist => {
                string_adr::wrap_whitelisted_arguments(text, &tables.adr_functions)
            }
            PassKind::Equals => equals::rewrite_assignments(text, &tables.ignore_equals_pairs),
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Build a diagnostic comment line
pub(crate) fn notice_line(indent: &str, message: &str, ending: &str) -> String {
    format!("{indent}// {message}{ending}")
}

/// True when the last emitted line already carries `message`
///
/// Diagnostic-inserting passes use this so that a notice is never stacked on
/// top of an identical one, which keeps re-runs from inserting anything new.
pub(crate) fn repeats_notice(previous: Option<&String>, message: &str) -> bool {
    let last_line = message.lines().last().unwrap_or(message);
    previous.is_some_and(|line| {
        let trimmed = line.trim();
        trimmed.starts_with("//") && trimmed.contains(last_line)
    })
}
