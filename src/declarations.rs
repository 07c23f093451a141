//! Best-effort variable type lookup in sibling declaration files.
//!
//! This is not a symbol table. A variable is classified by scanning every
//! declaration file next to the source for lines that mention the name as a
//! whole word, and looking for a type marker on those same lines. The
//! rewrite passes only see the [`TypeLookup`] trait, so a real declaration
//! parser can replace [`SiblingDeclarations`] without touching them.

use std::path::Path;

use glob::Pattern;
use regex::Regex;

use crate::source::encoding::decode;
use crate::source::patterns::keyword_re;
use crate::Result;

/// What the declaration files say about a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Declared as a string; literals are assigned by value
    Textual,
    /// Declared as an address-sized integer; literals need `ADR(...)`
    AddressSized,
    /// Not declared, or declared with neither marker on the line
    Unknown,
}

/// Classify a variable by name
pub trait TypeLookup {
    fn classify(&self, name: &str) -> VarKind;
}

/// Lookup used when no declaration files are available
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeclarations;

impl TypeLookup for NoDeclarations {
    fn classify(&self, _name: &str) -> VarKind {
        VarKind::Unknown
    }
}

/// Declaration file contents found next to a source file
#[derive(Debug, Clone, Default)]
pub struct SiblingDeclarations {
    sources: Vec<String>,
    string_re: Option<Regex>,
    udint_re: Option<Regex>,
}

impl SiblingDeclarations {
    /// Wrap already-loaded declaration texts
    #[must_use]
    pub fn from_sources(sources: Vec<String>) -> Self {
        Self {
            sources,
            string_re: Some(keyword_re("STRING")),
            udint_re: Some(keyword_re("UDINT")),
        }
    }

    /// Load every `*.<ext>` file in `dir` for the given extensions
    ///
    /// Files that cannot be read are skipped.
    pub fn load(dir: &Path, extensions: &[String]) -> Result<Self> {
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let escaped = Pattern::escape(&dir.to_string_lossy());
        let mut sources = Vec::new();
        for ext in extensions {
            let pattern = format!("{escaped}/*.{}", ext.trim_start_matches('.'));
            for path in glob::glob(&pattern)?.filter_map(std::result::Result::ok) {
                if let Ok(bytes) = std::fs::read(&path) {
                    sources.push(decode(&bytes));
                }
            }
        }
        Ok(Self::from_sources(sources))
    }
}

impl TypeLookup for SiblingDeclarations {
    fn classify(&self, name: &str) -> VarKind {
        let (Some(string_re), Some(udint_re)) = (&self.string_re, &self.udint_re) else {
            return VarKind::Unknown;
        };
        if name.is_empty() {
            return VarKind::Unknown;
        }
        let name_re = keyword_re(name);

        let mut is_string = false;
        let mut is_udint = false;
        for line in self.sources.iter().flat_map(|s| s.lines()) {
            if name_re.is_match(line) {
                is_string |= string_re.is_match(line);
                is_udint |= udint_re.is_match(line);
            }
        }

        if is_string {
            VarKind::Textual
        } else if is_udint {
            VarKind::AddressSized
        } else {
            VarKind::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decls(text: &str) -> SiblingDeclarations {
        SiblingDeclarations::from_sources(vec![text.to_string()])
    }

    #[test]
    fn test_classify_string() {
        let d = decls("VAR\n    sName : STRING[80];\nEND_VAR\n");
        assert_eq!(d.classify("sName"), VarKind::Textual);
        assert_eq!(d.classify("SNAME"), VarKind::Textual);
    }

    #[test]
    fn test_classify_udint() {
        let d = decls("VAR\n    pText : UDINT;\nEND_VAR\n");
        assert_eq!(d.classify("pText"), VarKind::AddressSized);
    }

    #[test]
    fn test_string_wins_over_udint() {
        let d = SiblingDeclarations::from_sources(vec![
            "x : UDINT;".to_string(),
            "x : STRING[10];".to_string(),
        ]);
        assert_eq!(d.classify("x"), VarKind::Textual);
    }

    #[test]
    fn test_unknown_type_or_name() {
        let d = decls("VAR\n    count : INT;\nEND_VAR\n");
        assert_eq!(d.classify("count"), VarKind::Unknown);
        assert_eq!(d.classify("missing"), VarKind::Unknown);
    }

    #[test]
    fn test_whole_word_match() {
        let d = decls("nameLength : UDINT;");
        assert_eq!(d.classify("name"), VarKind::Unknown);
    }

    #[test]
    fn test_default_has_no_patterns() {
        assert_eq!(
            SiblingDeclarations::default().classify("x"),
            VarKind::Unknown
        );
        assert_eq!(NoDeclarations.classify("x"), VarKind::Unknown);
    }
}
