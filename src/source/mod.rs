//! Source text model shared by all rewrite passes.
//!
//! This module provides the line-level infrastructure:
//! - [`CharFilter`]: Iterator adapter that identifies strings, comments, and code regions
//! - [`SourceLine`]: A physical line split into code, comment and terminator
//! - [`patterns`]: Keyword regex builders and shared static patterns
//! - [`encoding`]: The single-byte codec used for every file read and write
//!
//! Every pass splits lines through [`SourceLine`] so that comment boundaries
//! and line endings are treated identically everywhere.

pub mod char_filter;
pub mod encoding;
pub mod line;
pub mod patterns;

use std::path::Path;

pub use char_filter::{
    comment_start, mask_block_comments, mask_strings, CharFilter, StringDelimiter,
};
pub use line::{dominant_ending, leading_whitespace, split_lines, LineEnding, SourceLine};

/// Which notation a file is written in when it enters the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceDialect {
    /// Automation Basic: `;` opens a line comment
    #[default]
    Legacy,
    /// Structured Text: `;` terminates a statement
    Structured,
}

impl SourceDialect {
    /// Dialect implied by a file extension (`.ab` or `.st`, any case)
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("ab") {
            Some(Self::Legacy)
        } else if ext.eq_ignore_ascii_case("st") {
            Some(Self::Structured)
        } else {
            None
        }
    }
}
