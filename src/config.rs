//! Configuration management for ab2st.
//!
//! This module provides the [`Config`] struct which controls the conversion:
//! - [`PassToggles`]: one switch per rewrite pass (all enabled by default)
//! - [`DialectTables`]: the dialect-specific keyword tables the passes consult
//!
//! Configuration can be loaded from TOML files (`ab2st.toml`) and is then
//! overridden by CLI arguments. Config files are auto-discovered by searching
//! the target's ancestor directories up to the filesystem root, plus the
//! user's home directory. Once processing starts the configuration is never
//! mutated.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::passes::PassKind;

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["ab2st.toml"];

/// Guidance attached to every unconvertible cast
const CAST_MESSAGE: &str = "### CONVERSION ERROR ### The cast can not be automatically converted, \
determine the correct datatype and then use the convert library to cast the value.";

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    // Try HOME environment variable first (works on Unix and some Windows setups)
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Fallback for Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

fn default_true() -> bool {
    true
}

/// Enable/disable switch for each rewrite pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassToggles {
    #[serde(default = "default_true")]
    pub manual: bool,
    #[serde(default = "default_true")]
    pub comment: bool,
    #[serde(default = "default_true")]
    pub keywords: bool,
    #[serde(default = "default_true")]
    pub uppercase: bool,
    #[serde(default = "default_true")]
    pub numbers: bool,
    #[serde(default = "default_true")]
    pub select: bool,
    #[serde(default = "default_true", rename = "loop")]
    pub loops: bool,
    #[serde(default = "default_true")]
    pub math: bool,
    #[serde(default = "default_true")]
    pub exitif: bool,
    #[serde(default = "default_true")]
    pub semicolon: bool,
    #[serde(default = "default_true")]
    pub functionblocks: bool,
    #[serde(default = "default_true")]
    pub string_adr: bool,
    #[serde(default = "default_true")]
    pub string_adr_whitelist: bool,
    #[serde(default = "default_true")]
    pub equals: bool,
}

impl Default for PassToggles {
    fn default() -> Self {
        PassToggles {
            manual: true,
            comment: true,
            keywords: true,
            uppercase: true,
            numbers: true,
            select: true,
            loops: true,
            math: true,
            exitif: true,
            semicolon: true,
            functionblocks: true,
            string_adr: true,
            string_adr_whitelist: true,
            equals: true,
        }
    }
}

impl PassToggles {
    fn slot(&mut self, kind: PassKind) -> &mut bool {
        match kind {
            PassKind::ManualFix => &mut self.manual,
            PassKind::Comments => &mut self.comment,
            PassKind::Keywords => &mut self.keywords,
            PassKind::UpperCase => &mut self.uppercase,
            PassKind::Numbers => &mut self.numbers,
            PassKind::Select => &mut self.select,
            PassKind::Loop => &mut self.loops,
            PassKind::IncDec => &mut self.math,
            PassKind::ExitIf => &mut self.exitif,
            PassKind::Semicolon => &mut self.semicolon,
            PassKind::FunctionBlocks => &mut self.functionblocks,
            PassKind::StringAdr => &mut self.string_adr,
            PassKind::StringAdrWhitelist => &mut self.string_adr_whitelist,
            PassKind::Equals => &mut self.equals,
        }
    }

    #[must_use]
    pub fn is_enabled(&self, kind: PassKind) -> bool {
        match kind {
            PassKind::ManualFix => self.manual,
            PassKind::Comments => self.comment,
            PassKind::Keywords => self.keywords,
            PassKind::UpperCase => self.uppercase,
            PassKind::Numbers => self.numbers,
            PassKind::Select => self.select,
            PassKind::Loop => self.loops,
            PassKind::IncDec => self.math,
            PassKind::ExitIf => self.exitif,
            PassKind::Semicolon => self.semicolon,
            PassKind::FunctionBlocks => self.functionblocks,
            PassKind::StringAdr => self.string_adr,
            PassKind::StringAdrWhitelist => self.string_adr_whitelist,
            PassKind::Equals => self.equals,
        }
    }

    pub fn set(&mut self, kind: PassKind, enabled: bool) {
        *self.slot(kind) = enabled;
    }

    /// Disabled passes, in pipeline order
    #[must_use]
    pub fn disabled(&self) -> Vec<PassKind> {
        PassKind::ALL
            .into_iter()
            .filter(|kind| !self.is_enabled(*kind))
            .collect()
    }
}

/// A construct that cannot be converted automatically and the notice to insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualFix {
    pub keyword: String,
    pub message: String,
}

/// A legacy token and its Structured Text replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// Start/end keywords delimiting a span where `=` stays a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordPair {
    pub start: String,
    pub end: String,
}

fn manual(keyword: &str, message: &str) -> ManualFix {
    ManualFix {
        keyword: keyword.to_string(),
        message: message.to_string(),
    }
}

fn replacement(from: &str, to: &str) -> Replacement {
    Replacement {
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn pair(start: &str, end: &str) -> KeywordPair {
    KeywordPair {
        start: start.to_string(),
        end: end.to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Dialect-specific keyword data consulted by the passes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectTables {
    /// Constructs that get a manual-fix notice (first matching entry wins)
    pub manual_fixes: Vec<ManualFix>,
    /// Keyword substitutions, applied in order
    pub keyword_replacements: Vec<Replacement>,
    /// Spans in which `=` is never turned into `:=`
    pub ignore_equals_pairs: Vec<KeywordPair>,
    /// Lines containing one of these keywords never get a terminator
    pub ignore_semicolon_keywords: Vec<String>,
    /// Reserved words and built-ins forced to upper case
    pub uppercase: Vec<String>,
    /// Functions whose string-literal arguments are passed by address
    pub adr_functions: Vec<String>,
    /// Descriptor files listing a folder's sources (first existing one is used)
    pub descriptor_files: Vec<String>,
    /// Extensions of sibling declaration files used for type lookup
    pub declaration_extensions: Vec<String>,
}

impl Default for DialectTables {
    fn default() -> Self {
        let mut manual_fixes = vec![manual(
            "GOTO",
            "### CONVERSION ERROR ### Goto is not supported in structure text.",
        )];
        manual_fixes.extend(
            [
                "TIME(", "BOOL(", "WORD(", "REAL(", "UDINT(", "UINT(", "USINT(", "SINT(",
                "DINT(", "INT(", "INT16(", "INT32(", "UINT16(", "UNT32(",
            ]
            .iter()
            .map(|cast| manual(cast, CAST_MESSAGE)),
        );

        DialectTables {
            manual_fixes,
            keyword_replacements: vec![
                replacement("\"", "'"),
                replacement("ENDIF", "END_IF"),
                replacement("ENDSELECT", "END_CASE"),
                replacement("EXITIF TRUE", "EXIT"),
                replacement("ELSE IF", "ELSIF"),
                replacement("LSL(", "SHL("),
                replacement("LSR(", "SHR("),
                replacement("ACTION", ""),
                replacement("ENDACTION", ""),
                replacement("ELSEACTION", "ELSE"),
                replacement("ENDCASE", "END_CASE"),
            ],
            ignore_equals_pairs: vec![
                pair("IF", "THEN"),
                pair("ELSIF", "THEN"),
                pair("WHILE", "DO"),
                pair("EXITIF", "THEN"),
            ],
            ignore_semicolon_keywords: strings(&[
                "IF",
                "THEN",
                "ELSE",
                "ELSIF",
                "END_IF",
                "FOR",
                "END_FOR",
                "WHILE",
                "END_WHILE",
                "CASE",
                "END_CASE",
                "_INIT",
                "_EXIT",
                "_CYCLIC",
                "_PROGRAM",
                "END_PROGRAM",
                "FUNCTION_BLOCK",
                "END_FUNCTION_BLOCK",
                "FUNCTION",
                "END_FUNCTION",
            ]),
            uppercase: strings(&[
                "TRUE", "FALSE", "ACCESS", "MOD", "AND", "NOT", "IF", "THEN", "ELSE", "ELSIF",
                "END_IF", "FOR", "END_FOR", "WHILE", "END_WHILE", "_INIT", "_EXIT", "_CYCLIC",
                "_PROGRAM", "EDGE", "EDGEPOS", "EDGENEG", "ABS(", "ACOS(", "ADR(", "ADRINST(",
                "ASIN(", "ASR(", "ATAN(", "COS(", "EXP(", "EXPT(", "LIMIT(", "LN(", "LOG(",
                "MAX(", "MIN(", "MUX(", "ROL(", "ROR(", "SEL(", "SHL(", "SHR(", "SIN(",
                "SIZEOF(", "SQRT(", "TAN(", "TRUNC(", "DOWNTO", "DO", "OR", "TO", "XOR", "CASE",
                "OF",
            ]),
            adr_functions: strings(&[
                "strcpy",
                "strlen",
                "strcmp",
                "strcat",
                "brsstrcpy",
                "brsstrlen",
                "brsstrcmp",
                "brsstrcat",
                "memset",
                "memcpy",
                "memcmp",
            ]),
            descriptor_files: strings(&["IEC.prg", "IEC.lby"]),
            declaration_extensions: strings(&["var", "fun"]),
        }
    }
}

/// Main configuration struct for ab2st
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Which passes run
    #[serde(default)]
    pub passes: PassToggles,

    /// Keyword data the passes consult
    #[serde(default)]
    pub tables: DialectTables,
}

/// Partial pass toggles for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialPassToggles {
    pub manual: Option<bool>,
    pub comment: Option<bool>,
    pub keywords: Option<bool>,
    pub uppercase: Option<bool>,
    pub numbers: Option<bool>,
    pub select: Option<bool>,
    #[serde(rename = "loop")]
    pub loops: Option<bool>,
    pub math: Option<bool>,
    pub exitif: Option<bool>,
    pub semicolon: Option<bool>,
    pub functionblocks: Option<bool>,
    pub string_adr: Option<bool>,
    pub string_adr_whitelist: Option<bool>,
    pub equals: Option<bool>,
}

/// Partial tables for TOML parsing (a present table replaces the default)
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialTables {
    pub manual_fixes: Option<Vec<ManualFix>>,
    pub keyword_replacements: Option<Vec<Replacement>>,
    pub ignore_equals_pairs: Option<Vec<KeywordPair>>,
    pub ignore_semicolon_keywords: Option<Vec<String>>,
    pub uppercase: Option<Vec<String>>,
    pub adr_functions: Option<Vec<String>>,
    pub descriptor_files: Option<Vec<String>>,
    pub declaration_extensions: Option<Vec<String>>,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    #[serde(default)]
    pub passes: PartialPassToggles,
    #[serde(default)]
    pub tables: PartialTables,
}

impl Config {
    /// Validate the dialect tables
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        let tables = &self.tables;
        if let Some(p) = tables
            .ignore_equals_pairs
            .iter()
            .find(|p| p.start.trim().is_empty() || p.end.trim().is_empty())
        {
            return Some(format!(
                "ignore_equals_pairs entry ({:?}, {:?}) has an empty keyword",
                p.start, p.end
            ));
        }
        if tables.adr_functions.iter().any(|f| f.trim().is_empty()) {
            return Some("adr_functions contains an empty function name".to_string());
        }
        if tables.descriptor_files.is_empty() {
            return Some("descriptor_files must name at least one file".to_string());
        }
        if tables.manual_fixes.iter().any(|f| f.message.trim().is_empty()) {
            return Some("manual_fixes entries need a message".to_string());
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        let p = &partial.passes;
        let toggles = [
            (PassKind::ManualFix, p.manual),
            (PassKind::Comments, p.comment),
            (PassKind::Keywords, p.keywords),
            (PassKind::UpperCase, p.uppercase),
            (PassKind::Numbers, p.numbers),
            (PassKind::Select, p.select),
            (PassKind::Loop, p.loops),
            (PassKind::IncDec, p.math),
            (PassKind::ExitIf, p.exitif),
            (PassKind::Semicolon, p.semicolon),
            (PassKind::FunctionBlocks, p.functionblocks),
            (PassKind::StringAdr, p.string_adr),
            (PassKind::StringAdrWhitelist, p.string_adr_whitelist),
            (PassKind::Equals, p.equals),
        ];
        for (kind, value) in toggles {
            if let Some(v) = value {
                self.passes.set(kind, v);
            }
        }

        let t = &partial.tables;
        if let Some(v) = &t.manual_fixes {
            self.tables.manual_fixes.clone_from(v);
        }
        if let Some(v) = &t.keyword_replacements {
            self.tables.keyword_replacements.clone_from(v);
        }
        if let Some(v) = &t.ignore_equals_pairs {
            self.tables.ignore_equals_pairs.clone_from(v);
        }
        if let Some(v) = &t.ignore_semicolon_keywords {
            self.tables.ignore_semicolon_keywords.clone_from(v);
        }
        if let Some(v) = &t.uppercase {
            self.tables.uppercase.clone_from(v);
        }
        if let Some(v) = &t.adr_functions {
            self.tables.adr_functions.clone_from(v);
        }
        if let Some(v) = &t.descriptor_files {
            self.tables.descriptor_files.clone_from(v);
        }
        if let Some(v) = &t.declaration_extensions {
            self.tables.declaration_extensions.clone_from(v);
        }
    }

    /// Discover config files from the ancestors of a given path
    ///
    /// Searches from the target directory up to the root, then adds home directory config.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        // Add home directory config first (lowest priority)
        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        // Start from the file's parent directory (or the path itself if it's a directory)
        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            // Path doesn't exist, use current directory
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Reverse so we go from root to current (less specific to more specific)
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Returns default config if no files found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let mut config = Self::default();
        for path in &Self::discover_config_files(start_path) {
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => config.apply_partial(&partial),
                    Err(e) => eprintln!("Warning: failed to parse {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: failed to read {}: {e}", path.display()),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(PassKind::ALL.iter().all(|k| config.passes.is_enabled(*k)));
        assert!(config.passes.disabled().is_empty());
        assert_eq!(config.tables.manual_fixes.len(), 15);
        assert_eq!(config.tables.descriptor_files, vec!["IEC.prg", "IEC.lby"]);
    }

    #[test]
    fn test_semicolon_keywords_keep_while_pair_separate() {
        let tables = DialectTables::default();
        assert!(tables.ignore_semicolon_keywords.contains(&"WHILE".to_string()));
        assert!(tables
            .ignore_semicolon_keywords
            .contains(&"END_WHILE".to_string()));
    }

    #[test]
    fn test_toggle_set_and_disabled_order() {
        let mut toggles = PassToggles::default();
        toggles.set(PassKind::Equals, false);
        toggles.set(PassKind::Comments, false);
        assert!(!toggles.is_enabled(PassKind::Equals));
        assert_eq!(
            toggles.disabled(),
            vec![PassKind::Comments, PassKind::Equals]
        );
    }

    #[test]
    fn test_config_apply_partial() {
        let partial: PartialConfig = toml::from_str(
            r#"
            [passes]
            loop = false
            semicolon = false

            [tables]
            adr_functions = ["strcpy"]
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_partial(&partial);
        assert!(!config.passes.loops);
        assert!(!config.passes.semicolon);
        assert!(config.passes.equals);
        assert_eq!(config.tables.adr_functions, vec!["strcpy"]);
        // Untouched tables keep their defaults
        assert_eq!(config.tables.keyword_replacements.len(), 11);
    }

    #[test]
    fn test_config_apply_partial_preserves_unset() {
        let mut config = Config::default();
        config.passes.math = false;

        let partial: PartialConfig = toml::from_str("[passes]\nnumbers = false\n").unwrap();
        config.apply_partial(&partial);
        assert!(!config.passes.math);
        assert!(!config.passes.numbers);
    }

    #[test]
    fn test_partial_table_of_pairs() {
        let partial: PartialConfig = toml::from_str(
            r#"
            [[tables.ignore_equals_pairs]]
            start = "UNTIL"
            end = "END_REPEAT"
            "#,
        )
        .unwrap();
        let mut config = Config::default();
        config.apply_partial(&partial);
        assert_eq!(
            config.tables.ignore_equals_pairs,
            vec![pair("UNTIL", "END_REPEAT")]
        );
    }

    #[test]
    fn test_from_discovered_files_returns_default_when_empty() {
        let path = PathBuf::from("/nonexistent/unique/path/Main.ab");
        let config = Config::from_discovered_files(&path);
        assert!(config.passes.comment);
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_none());
    }

    #[test]
    fn test_validate_empty_pair_keyword() {
        let mut config = Config::default();
        config.tables.ignore_equals_pairs.push(pair("REPEAT", " "));
        assert!(config
            .validate()
            .unwrap()
            .contains("ignore_equals_pairs"));
    }

    #[test]
    fn test_validate_empty_whitelist_entry() {
        let mut config = Config::default();
        config.tables.adr_functions.push(String::new());
        assert!(config.validate().is_some());
    }

    #[test]
    fn test_validate_no_descriptor_names() {
        let mut config = Config::default();
        config.tables.descriptor_files.clear();
        assert!(config.validate().unwrap().contains("descriptor_files"));
    }
}
