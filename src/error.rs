//! Error types and result aliases for ab2st.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used throughout the crate
//! - [`ConvertError`]: preconditions that make a file or target unconvertible

use std::path::PathBuf;

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// A file or target that cannot be converted
///
/// These skip one file (or the whole target) and are reported, they never
/// abort a batch that is already running.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("IEC.prg or IEC.lby not found in directory: {}", dir.display())]
    MissingDescriptor { dir: PathBuf },

    #[error("Target file already exists: {}", path.display())]
    TargetExists { path: PathBuf },

    #[error("Unsupported file type (expected .ab or .st): {}", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("No Automation Studio project file (*.apj) found in: {}", dir.display())]
    NotAProject { dir: PathBuf },

    #[error("Text cannot be encoded as windows-1252: {}", path.display())]
    Encoding { path: PathBuf },
}
