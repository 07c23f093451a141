//! File processing and conversion pipeline.
//!
//! This module orchestrates the conversion of Automation Basic sources:
//!
//! **Per file:**
//! - Rename `.ab` to `.st` and update the program/library descriptor
//! - Decode the single-byte text and load sibling declaration files
//! - Run every enabled pass in order ([`convert_source`])
//! - Write the file back only when its content hash changed
//!
//! **Per run:**
//! - Validate the target (source file or project root with `*.apj`)
//! - Collect `.ab` files below `Logical/`, honouring exclude patterns
//! - Record every step in a [`ChangeLog`]
//!
//! The main entry point is [`convert_path`].

pub mod log;
pub mod pipeline;
pub mod project;
pub mod rename;

pub use log::{pass_entries, ChangeLog, LogEntry, Severity};
pub use pipeline::{content_digest, convert_source, Conversion, PassOutcome};
pub use project::{convert_path, process_file, RunSummary};
pub use rename::rename_legacy_source;
