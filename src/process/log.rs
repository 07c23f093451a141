//! Running log of a conversion run
//!
//! Every file separator, rename, per-pass change count and skipped file is
//! recorded as a [`LogEntry`]. With echo enabled the entries are also printed
//! to stderr as they arrive.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;

use super::pipeline::PassOutcome;
use crate::error::Result;
use crate::passes::{Breakdown, PassKind};

/// Width of the separator line written before each file
const SEPARATOR_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

impl LogEntry {
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Ordered log entries of one run
#[derive(Debug, Default)]
pub struct ChangeLog {
    entries: Vec<LogEntry>,
    echo: bool,
}

impl ChangeLog {
    /// Create an empty log; `echo` prints each entry to stderr when recorded
    #[must_use]
    pub fn new(echo: bool) -> Self {
        Self {
            entries: Vec::new(),
            echo,
        }
    }

    pub fn record(&mut self, entry: LogEntry) {
        if self.echo {
            eprintln!("{entry}");
        }
        self.entries.push(entry);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(LogEntry::new(Severity::Info, message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.record(LogEntry::new(Severity::Warning, message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(LogEntry::new(Severity::Error, message));
    }

    /// Separator and header written before each file
    pub fn file_header(&mut self, path: &Path) {
        self.info("─".repeat(SEPARATOR_WIDTH));
        self.info(format!("Processing: {}", path.display()));
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries with the given severity
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    /// Write all entries to `path`, one per line
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(&entry.to_string());
            text.push('\n');
        }
        fs::write(path, text)
            .with_context(|| format!("Failed to write log file: {}", path.display()))
    }
}

/// Log entries describing what one pass did to a file
///
/// Passes that changed nothing produce no entries.
#[must_use]
pub fn pass_entries(outcome: &PassOutcome, path: &Path) -> Vec<LogEntry> {
    if outcome.changes == 0 {
        return Vec::new();
    }
    let p = path.display();
    let n = outcome.changes;
    let info = |message: String| LogEntry::new(Severity::Info, message);

    match (outcome.kind, outcome.breakdown) {
        (PassKind::ManualFix, _) => vec![LogEntry::new(
            Severity::Warning,
            format!("{n} manual fix notices added in: {p}"),
        )],
        (PassKind::Numbers, Breakdown::Radix { hex, binary }) => {
            let message = match (hex, binary) {
                (0, b) => format!("{b} binary number conversions (% -> 2#) in: {p}"),
                (h, 0) => format!("{h} hex number conversions ($ -> 16#) in: {p}"),
                (h, b) => {
                    format!("{h} hex ($ -> 16#) and {b} binary (% -> 2#) conversions in: {p}")
                }
            };
            vec![info(message)]
        }
        (PassKind::Loop, Breakdown::Loop { conversions, warnings }) => vec![info(format!(
            "{conversions} LOOP/ENDLOOP conversions, {warnings} warnings inserted in: {p}"
        ))],
        (
            PassKind::Semicolon,
            Breakdown::Semicolon {
                added,
                continuations,
                eof_trimmed,
            },
        ) => {
            let mut entries = Vec::new();
            if added > 0 {
                entries.push(info(format!("{added} semicolons added in: {p}")));
            }
            if continuations > 0 {
                entries.push(info(format!(
                    "{continuations} line continuation markers removed in: {p}"
                )));
            }
            if eof_trimmed {
                entries.push(info(format!(
                    "Trailing whitespace removed from end of file: {p}"
                )));
            }
            entries
        }
        (kind, _) => {
            let what = match kind {
                PassKind::Comments => "comments changed",
                PassKind::Keywords => "keyword replacements",
                PassKind::UpperCase => "upper-case replacements",
                PassKind::Select => "SELECT/STATE/WHEN/NEXT transformations",
                PassKind::IncDec => "INC/DEC conversions",
                PassKind::ExitIf => "EXITIF rewrites to 'IF ... THEN'",
                PassKind::FunctionBlocks => "lines updated by fix_functionblocks",
                PassKind::StringAdr => "conditional ADR conversions/warnings",
                PassKind::StringAdrWhitelist => {
                    "ADR conversions for whitelisted function arguments"
                }
                PassKind::Equals => "equals replaced by ':='",
                PassKind::Numbers => "number conversions",
                PassKind::Loop => "LOOP/ENDLOOP conversions",
                PassKind::Semicolon => "semicolon changes",
                PassKind::ManualFix => "manual fix notices added",
            };
            vec![info(format!("{n} {what} in: {p}"))]
        }
    }
}
