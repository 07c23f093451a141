//! Project conversion tests
//!
//! These tests build small Automation Studio projects in the temp directory
//! and run the file-level conversion over them: renaming, descriptor update,
//! declaration lookup, encoding and logging.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs;
use std::path::{Path, PathBuf};

use ab2st::process::Severity;
use ab2st::{convert_path, ChangeLog, Config, ConvertError};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ab2st_project_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

const MAIN_AB: &[u8] = b"; Main program \xb0C\r\n\
_CYCLIC\r\n\
pText = \"hello\"\r\n\
sName = \"world\"\r\n\
strcpy(ADR(buffer), \"abc\")\r\n\
IF a = 1 THEN\r\n\
\x20   b = %101\r\n\
ENDIF\r\n";

const VARS: &[u8] = b"VAR\r\n    pText : UDINT;\r\n    sName : STRING[80];\r\nEND_VAR\r\n";

const IEC_PRG: &[u8] =
    b"<Program>\r\n  <Files>\r\n    <File>Main.ab</File>\r\n    <File>Vars.var</File>\r\n  </Files>\r\n</Program>\r\n";

/// Project root with one convertible program, one excluded program and one
/// program folder without a descriptor
fn sample_project(name: &str) -> PathBuf {
    let root = scratch(name);
    write(&root.join("Sample.apj"), b"<Project />\r\n");

    let prog = root.join("Logical").join("Prog");
    write(&prog.join("Main.ab"), MAIN_AB);
    write(&prog.join("Vars.var"), VARS);
    write(&prog.join("IEC.prg"), IEC_PRG);

    let tests = root.join("Logical").join("Tests");
    write(&tests.join("Old.ab"), b"x = 1\r\n");
    write(&tests.join("IEC.prg"), b"<File>Old.ab</File>\r\n");

    write(
        &root.join("Logical").join("Lib").join("Helper.ab"),
        b"y = 2\r\n",
    );
    root
}

fn messages(log: &ChangeLog) -> Vec<&str> {
    log.entries().iter().map(|e| e.message.as_str()).collect()
}

#[test]
fn test_convert_project() {
    let root = sample_project("full");
    let mut log = ChangeLog::new(false);
    let summary = convert_path(&root, &Config::default(), &["Tests".to_string()], &mut log).unwrap();

    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.files_skipped, 1);
    assert!(summary.total_changes > 0);

    let prog = root.join("Logical").join("Prog");
    assert!(!prog.join("Main.ab").exists());
    let bytes = fs::read(prog.join("Main.st")).unwrap();
    assert!(bytes.contains(&0xb0));
    assert!(bytes.windows(2).any(|w| w == b"\r\n"));

    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    assert_eq!(
        lines,
        vec![
            "// Main program \u{b0}C",
            "_CYCLIC",
            "pText := ADR('hello');",
            "sName := 'world';",
            "strcpy(ADR(buffer), ADR('abc'));",
            "IF a = 1 THEN",
            "b := 2#101;",
            "END_IF",
        ]
    );

    let descriptor = fs::read_to_string(prog.join("IEC.prg")).unwrap();
    assert!(descriptor.contains("<File>Main.st</File>"));
    assert!(descriptor.contains("<File>Vars.var</File>"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_excluded_and_failing_files_are_untouched() {
    let root = sample_project("untouched");
    let mut log = ChangeLog::new(false);
    convert_path(&root, &Config::default(), &["Tests".to_string()], &mut log).unwrap();

    let logical = root.join("Logical");
    assert!(logical.join("Tests").join("Old.ab").exists());
    assert!(!logical.join("Tests").join("Old.st").exists());
    assert_eq!(
        fs::read(logical.join("Lib").join("Helper.ab")).unwrap(),
        b"y = 2\r\n"
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_project_log() {
    let root = sample_project("log");
    let mut log = ChangeLog::new(false);
    convert_path(&root, &Config::default(), &["Tests".to_string()], &mut log).unwrap();

    let messages = messages(&log);
    assert!(messages[0].starts_with("Project path validated: "));
    assert!(messages[1].starts_with("Using project file: "));
    assert!(messages.iter().any(|m| m.starts_with("Renamed file: ")));
    assert!(messages
        .iter()
        .any(|m| m.starts_with("1 IEC references updated in: ")));
    assert!(messages
        .iter()
        .any(|m| m.starts_with("1 hex number conversions") || m.starts_with("1 binary number")));
    assert!(messages
        .iter()
        .any(|m| m.contains("IEC.prg or IEC.lby not found in directory")));
    assert_eq!(
        *messages.last().unwrap(),
        "1 files could not be converted"
    );
    assert!(messages
        .iter()
        .any(|m| m.starts_with("Processing complete. Files processed: 1, Total changes: ")));
    assert_eq!(log.count(Severity::Error), 2);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_second_run_is_a_no_op() {
    let root = sample_project("rerun");
    let config = Config::default();
    let excludes = vec!["Tests".to_string(), "Lib".to_string()];

    let mut log = ChangeLog::new(false);
    convert_path(&root, &config, &excludes, &mut log).unwrap();
    let main_st = root.join("Logical").join("Prog").join("Main.st");
    let first = fs::read(&main_st).unwrap();

    let mut log = ChangeLog::new(false);
    let summary = convert_path(&main_st, &config, &[], &mut log).unwrap();
    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.total_changes, 0);
    assert_eq!(fs::read(&main_st).unwrap(), first);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_single_structured_file() {
    let root = scratch("single");
    let file = root.join("Task.st");
    write(&file, b"x := 1\r\ny = 2\r\n");

    let mut log = ChangeLog::new(false);
    let summary = convert_path(&file, &Config::default(), &[], &mut log).unwrap();
    assert_eq!(summary.files_processed, 1);
    assert_eq!(fs::read_to_string(&file).unwrap(), "x := 1;\r\ny := 2;");
    assert!(messages(&log)[0].starts_with("Processing single file: "));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_single_legacy_file_without_descriptor() {
    let root = scratch("nodesc");
    let file = root.join("Lone.ab");
    write(&file, b"x = 1\r\n");

    let mut log = ChangeLog::new(false);
    let summary = convert_path(&file, &Config::default(), &[], &mut log).unwrap();
    assert_eq!(summary.files_processed, 0);
    assert_eq!(summary.files_skipped, 1);
    assert!(file.exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_directory_without_project_file() {
    let root = scratch("noapj");
    let mut log = ChangeLog::new(false);
    let err = convert_path(&root, &Config::default(), &[], &mut log).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::NotAProject { .. })
    ));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_unsupported_file_type() {
    let root = scratch("badext");
    let file = root.join("notes.txt");
    write(&file, b"hello\r\n");
    let mut log = ChangeLog::new(false);
    let err = convert_path(&file, &Config::default(), &[], &mut log).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::UnsupportedExtension { .. })
    ));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_disabled_passes_are_logged() {
    let root = scratch("disabled");
    let file = root.join("Task.st");
    write(&file, b"x = 1\r\n");

    let mut config = Config::default();
    config.passes.set(ab2st::PassKind::Equals, false);
    let mut log = ChangeLog::new(false);
    convert_path(&file, &config, &[], &mut log).unwrap();

    assert!(messages(&log)[0].starts_with("Disabled conversions: "));
    assert_eq!(fs::read_to_string(&file).unwrap(), "x = 1;");

    let _ = fs::remove_dir_all(&root);
}
