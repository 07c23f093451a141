//! ab2st - Automation Basic to Structured Text converter
//!
//! Rewrites legacy Automation Basic (`.ab`) PLC programs into IEC 61131-3
//! Structured Text (`.st`) through a fixed sequence of text rewrite passes.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod declarations;
pub mod error;
pub mod passes;
pub mod process;
pub mod source;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use declarations::{NoDeclarations, SiblingDeclarations, TypeLookup, VarKind};
pub use error::{ConvertError, Result};
pub use passes::{PassKind, Rewrite};
pub use process::{convert_path, convert_source, ChangeLog, RunSummary};
pub use source::SourceDialect;
