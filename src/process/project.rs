//! Conversion of a single file or a whole project
//!
//! A file target must be `.ab` (renamed, then converted) or `.st`
//! (converted in place). A directory target must be a project root holding an
//! `*.apj` file; every `.ab` file below its `Logical/` directory is
//! converted. One failing file is logged and skipped, the rest of the batch
//! still runs.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use glob::Pattern;
use walkdir::WalkDir;

use super::log::{pass_entries, ChangeLog};
use super::pipeline::{content_digest, convert_source};
use super::rename::{parent_dir, rename_legacy_source};
use crate::config::Config;
use crate::declarations::SiblingDeclarations;
use crate::error::{ConvertError, Result};
use crate::source::encoding::{decode, encode};
use crate::source::SourceDialect;

/// Directory below the project root that holds the program sources
const LOGICAL_DIR: &str = "Logical";

/// Totals of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub total_changes: usize,
}

/// Check if a path matches any exclusion pattern
///
/// Patterns are tried against the full path, the file name and every
/// path component.
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();
    patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
            || path.components().any(|component| match component {
                Component::Normal(c) => pattern.matches(&c.to_string_lossy()),
                _ => false,
            })
    })
}

/// The `*.apj` project file in `dir`, if any
#[must_use]
pub fn find_project_file(dir: &Path) -> Option<PathBuf> {
    let pattern = format!("{}/*.apj", Pattern::escape(&dir.to_string_lossy()));
    glob::glob(&pattern)
        .ok()?
        .filter_map(std::result::Result::ok)
        .find(|p| p.is_file())
}

/// All legacy sources below `logical`, sorted, minus the excluded ones
#[must_use]
pub fn collect_legacy_sources(logical: &Path, excludes: &[Pattern]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(logical)
        .follow_links(true)
        .max_depth(256)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.is_file()
                && SourceDialect::from_path(path) == Some(SourceDialect::Legacy)
                && !is_excluded(path, excludes)
        })
        .collect();
    files.sort();
    files
}

/// Convert one file, returning its change count
///
/// Legacy files are renamed first; a failed rename leaves the file as it
/// was. The file is only written back when its bytes actually change.
pub fn process_file(path: &Path, config: &Config, log: &mut ChangeLog) -> Result<usize> {
    log.file_header(path);

    let dialect = SourceDialect::from_path(path).ok_or_else(|| ConvertError::UnsupportedExtension {
        path: path.to_path_buf(),
    })?;
    let working = match dialect {
        SourceDialect::Legacy => {
            rename_legacy_source(path, &config.tables.descriptor_files, log)?
        }
        SourceDialect::Structured => path.to_path_buf(),
    };

    let bytes =
        fs::read(&working).with_context(|| format!("Failed to read: {}", working.display()))?;
    let text = decode(&bytes);

    let declarations =
        SiblingDeclarations::load(parent_dir(&working), &config.tables.declaration_extensions)?;

    let conversion = convert_source(&text, dialect, config, &declarations);
    for outcome in &conversion.outcomes {
        for entry in pass_entries(outcome, &working) {
            log.record(entry);
        }
    }

    let encoded = encode(&conversion.text).ok_or_else(|| ConvertError::Encoding {
        path: working.clone(),
    })?;
    if content_digest(&encoded) != content_digest(&bytes) {
        fs::write(&working, encoded)
            .with_context(|| format!("Failed to write: {}", working.display()))?;
    }

    Ok(conversion.total_changes())
}

/// Convert `target` (a source file or a project directory)
///
/// Fails only when the target itself is unusable; per-file problems are
/// logged as errors and counted as skipped.
pub fn convert_path(
    target: &Path,
    config: &Config,
    excludes: &[String],
    log: &mut ChangeLog,
) -> Result<RunSummary> {
    let disabled = config.passes.disabled();
    if !disabled.is_empty() {
        let names: Vec<&str> = disabled.iter().map(|k| k.key()).collect();
        log.info(format!("Disabled conversions: {}", names.join(", ")));
    }

    let files = if target.is_file() {
        if SourceDialect::from_path(target).is_none() {
            return Err(ConvertError::UnsupportedExtension {
                path: target.to_path_buf(),
            }
            .into());
        }
        log.info(format!("Processing single file: {}", target.display()));
        vec![target.to_path_buf()]
    } else if target.is_dir() {
        let project_file = find_project_file(target).ok_or_else(|| ConvertError::NotAProject {
            dir: target.to_path_buf(),
        })?;
        log.info(format!("Project path validated: {}", target.display()));
        log.info(format!("Using project file: {}", project_file.display()));

        let logical = target.join(LOGICAL_DIR);
        if logical.is_dir() {
            let patterns: Vec<Pattern> =
                excludes.iter().filter_map(|p| Pattern::new(p).ok()).collect();
            collect_legacy_sources(&logical, &patterns)
        } else {
            log.warning(format!("{LOGICAL_DIR} directory not found in: {}", target.display()));
            Vec::new()
        }
    } else {
        anyhow::bail!("Path does not exist: {}", target.display());
    };

    let mut summary = RunSummary::default();
    for path in &files {
        match process_file(path, config, log) {
            Ok(changes) => {
                summary.files_processed += 1;
                summary.total_changes += changes;
            }
            Err(e) => {
                summary.files_skipped += 1;
                log.error(format!("Skipped {}: {e:#}", path.display()));
            }
        }
    }

    log.info(format!(
        "Processing complete. Files processed: {}, Total changes: {}",
        summary.files_processed, summary.total_changes
    ));
    if summary.files_skipped > 0 {
        log.error(format!(
            "{} files could not be converted",
            summary.files_skipped
        ));
    }
    Ok(summary)
}
