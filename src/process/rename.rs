//! `.ab` to `.st` renaming
//!
//! A legacy source is only renamed when its directory carries a program or
//! library descriptor (`IEC.prg`, `IEC.lby`). Every `name.ab` reference in
//! that descriptor is rewritten to `name.st` once the file itself has moved.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;

use super::log::ChangeLog;
use crate::error::{ConvertError, Result};
use crate::source::encoding::{decode, encode};
use crate::source::patterns::build_re;

static AB_REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"(\b[\w/\\.-]+)\.ab\b"));

/// First descriptor from `names` that exists in `dir`
#[must_use]
pub fn find_descriptor(dir: &Path, names: &[String]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Rewrite `*.ab` references to `*.st`, returning the new text and the count
#[must_use]
pub fn update_references(text: &str) -> (String, usize) {
    let count = AB_REFERENCE_RE.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    let updated = AB_REFERENCE_RE.replace_all(text, "${1}.st").into_owned();
    (updated, count)
}

/// Directory holding `path`; a bare file name lives in `.`
#[must_use]
pub fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Rename a legacy source to `.st`, then update its descriptor
///
/// Returns the new path. Fails without touching anything when the target
/// already exists or no descriptor is found. The file is moved before the
/// descriptor is written; a failed descriptor write moves it back, so the
/// descriptor never names a file that does not exist.
pub fn rename_legacy_source(
    path: &Path,
    descriptor_names: &[String],
    log: &mut ChangeLog,
) -> Result<PathBuf> {
    let target = path.with_extension("st");
    if target.exists() {
        return Err(ConvertError::TargetExists { path: target }.into());
    }

    let dir = parent_dir(path);
    let Some(descriptor) = find_descriptor(dir, descriptor_names) else {
        return Err(ConvertError::MissingDescriptor {
            dir: dir.to_path_buf(),
        }
        .into());
    };

    let bytes = fs::read(&descriptor)
        .with_context(|| format!("Failed to read descriptor: {}", descriptor.display()))?;
    let (updated, count) = update_references(&decode(&bytes));
    let encoded = if count > 0 {
        let encoded = encode(&updated).ok_or_else(|| ConvertError::Encoding {
            path: descriptor.clone(),
        })?;
        Some(encoded)
    } else {
        None
    };

    fs::rename(path, &target).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            path.display(),
            target.display()
        )
    })?;

    if let Some(encoded) = encoded {
        if let Err(e) = fs::write(&descriptor, encoded) {
            let _ = fs::rename(&target, path);
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to write descriptor: {}", descriptor.display())));
        }
        log.info(format!(
            "{count} IEC references updated in: {}",
            descriptor.display()
        ));
    }

    log.info(format!(
        "Renamed file: {} to {}",
        path.display(),
        target.display()
    ));
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ab2st_rename_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn descriptor_names() -> Vec<String> {
        vec!["IEC.prg".to_string(), "IEC.lby".to_string()]
    }

    #[test]
    fn test_update_references() {
        let text = "<File>Main.ab</File>\n<File>sub/Init.AB</File>\n<File>Main.abc</File>\n";
        let (updated, count) = update_references(text);
        assert_eq!(count, 2);
        assert_eq!(
            updated,
            "<File>Main.st</File>\n<File>sub/Init.st</File>\n<File>Main.abc</File>\n"
        );
    }

    #[test]
    fn test_rename_with_descriptor() {
        let dir = scratch_dir("ok");
        fs::write(dir.join("Main.ab"), "x = 1\n").unwrap();
        fs::write(dir.join("IEC.lby"), "<Object>Main.ab</Object>\n").unwrap();

        let mut log = ChangeLog::new(false);
        let target = rename_legacy_source(&dir.join("Main.ab"), &descriptor_names(), &mut log).unwrap();

        assert_eq!(target, dir.join("Main.st"));
        assert!(target.is_file());
        assert!(!dir.join("Main.ab").exists());
        assert_eq!(
            fs::read_to_string(dir.join("IEC.lby")).unwrap(),
            "<Object>Main.st</Object>\n"
        );
        assert_eq!(log.entries().len(), 2);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_descriptor() {
        let dir = scratch_dir("missing");
        fs::write(dir.join("Main.ab"), "x = 1\n").unwrap();

        let mut log = ChangeLog::new(false);
        let err = rename_legacy_source(&dir.join("Main.ab"), &descriptor_names(), &mut log)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::MissingDescriptor { .. })
        ));
        assert!(dir.join("Main.ab").is_file());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("Main.ab")), Path::new("."));
        assert_eq!(parent_dir(Path::new("Prog/Main.ab")), Path::new("Prog"));
    }

    #[test]
    fn test_failed_rename_keeps_descriptor() {
        let dir = scratch_dir("norename");
        fs::write(dir.join("IEC.prg"), "<File>Ghost.ab</File>\n").unwrap();

        let mut log = ChangeLog::new(false);
        let result = rename_legacy_source(&dir.join("Ghost.ab"), &descriptor_names(), &mut log);
        assert!(result.is_err());
        assert_eq!(
            fs::read_to_string(dir.join("IEC.prg")).unwrap(),
            "<File>Ghost.ab</File>\n"
        );
        assert!(log.entries().is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_existing_target_is_not_overwritten() {
        let dir = scratch_dir("exists");
        fs::write(dir.join("Main.ab"), "x = 1\n").unwrap();
        fs::write(dir.join("Main.st"), "keep").unwrap();
        fs::write(dir.join("IEC.prg"), "Main.ab\n").unwrap();

        let mut log = ChangeLog::new(false);
        let err = rename_legacy_source(&dir.join("Main.ab"), &descriptor_names(), &mut log)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::TargetExists { .. })
        ));
        assert_eq!(fs::read_to_string(dir.join("IEC.prg")).unwrap(), "Main.ab\n");
        assert_eq!(fs::read_to_string(dir.join("Main.st")).unwrap(), "keep");
        let _ = fs::remove_dir_all(&dir);
    }
}
