//! Single-text conversion pipeline
//!
//! Runs every enabled pass over one source text in the fixed order of
//! [`PassKind::ALL`], feeding each pass the output of the previous one. A
//! pass whose output hashes to the same digest as its input counts as zero
//! changes and its output is dropped, so a zero count always means the text
//! is untouched.

use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::declarations::TypeLookup;
use crate::passes::{Breakdown, PassContext, PassKind};
use crate::source::SourceDialect;

/// What one pass did to the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    pub kind: PassKind,
    pub changes: usize,
    pub breakdown: Breakdown,
}

/// Converted text plus the outcome of every pass that ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub text: String,
    pub outcomes: Vec<PassOutcome>,
}

impl Conversion {
    /// Sum of the change counts of all passes
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.outcomes.iter().map(|o| o.changes).sum()
    }

    /// Outcome of a given pass, if it ran
    #[must_use]
    pub fn outcome(&self, kind: PassKind) -> Option<&PassOutcome> {
        self.outcomes.iter().find(|o| o.kind == kind)
    }
}

/// SHA-256 digest of a byte sequence
#[must_use]
pub fn content_digest(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Convert one source text
///
/// `dialect` is the notation the text is written in on entry. `declarations`
/// answers type questions for the conditional ADR pass.
#[must_use]
pub fn convert_source(
    text: &str,
    dialect: SourceDialect,
    config: &Config,
    declarations: &dyn TypeLookup,
) -> Conversion {
    let ctx = PassContext {
        tables: &config.tables,
        dialect,
        declarations,
    };
    let mut current = text.to_string();
    let mut outcomes = Vec::new();

    for kind in PassKind::ALL {
        if !config.passes.is_enabled(kind) {
            continue;
        }
        let rewrite = kind.apply(&current, &ctx);
        let unchanged = content_digest(rewrite.text.as_bytes()) == content_digest(current.as_bytes());

        let outcome = if unchanged {
            PassOutcome {
                kind,
                changes: 0,
                breakdown: Breakdown::Total,
            }
        } else {
            current = rewrite.text;
            PassOutcome {
                kind,
                changes: rewrite.changes.max(1),
                breakdown: rewrite.breakdown,
            }
        };
        outcomes.push(outcome);
    }

    Conversion {
        text: current,
        outcomes,
    }
}
