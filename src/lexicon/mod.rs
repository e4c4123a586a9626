//! Toxic-lexicon pattern catalog and matcher
//!
//! The catalog is a read-only table of `{id, tier, rule}` entries, one per
//! lexical root. Each rule is a regular expression covering the root's
//! morphological variants, so inflected forms collapse to one [`MatchId`].
//! Matching is case-insensitive; short roots carry explicit word boundaries
//! in their rules to avoid hits inside unrelated words.
//!
//! A built-in catalog covers the Tatar/Russian deployment; an external TOML
//! catalog can replace it entirely.

mod builtin;

pub use builtin::builtin_catalog;

use crate::models::{MatchId, MatchSet};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Severity tier of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Obfuscated spellings of strong profanity (often missed by word lists).
    Disguised,
    /// Strong profanity.
    Strong,
    /// Vulgar but not profane.
    Vulgar,
    /// Mild expletives.
    Mild,
    /// Insults and slurs.
    Offensive,
    /// Target-language (Tatar) offensive roots.
    Native,
    /// Cross-lingual code-switch constructions.
    CodeSwitch,
}

/// One catalog entry before compilation.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternRule {
    pub id: MatchId,
    pub tier: Tier,
    pub rule: String,
}

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {0}", path = .1)]
    Parse(#[source] toml::de::Error, String),
    #[error("invalid rule for pattern '{id}': {source}")]
    BadRule {
        id: MatchId,
        source: Box<regex::Error>,
    },
    #[error("duplicate pattern id '{0}'")]
    DuplicateId(MatchId),
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(rename = "pattern")]
    patterns: Vec<PatternRule>,
}

/// Compiled pattern matcher.
///
/// Stateless after construction; `detect` is total and deterministic.
pub struct Matcher {
    compiled: Vec<(MatchId, Tier, Regex)>,
}

impl Matcher {
    /// Compile a catalog. Malformed rules fail here, never at match time.
    pub fn new(rules: Vec<PatternRule>) -> Result<Self, LexiconError> {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut seen: std::collections::HashSet<MatchId> = std::collections::HashSet::new();
        for rule in rules {
            if !seen.insert(rule.id.clone()) {
                return Err(LexiconError::DuplicateId(rule.id));
            }
            let re = RegexBuilder::new(&rule.rule)
                .case_insensitive(true)
                .build()
                .map_err(|e| LexiconError::BadRule {
                    id: rule.id.clone(),
                    source: Box::new(e),
                })?;
            compiled.push((rule.id, rule.tier, re));
        }
        debug!(patterns = compiled.len(), "lexicon compiled");
        Ok(Self { compiled })
    }

    /// Compile the built-in default catalog.
    pub fn builtin() -> Self {
        // Built-in rules are compile-checked by tests; construction cannot fail.
        Self::new(builtin_catalog()).expect("built-in catalog is valid")
    }

    /// Load and compile a catalog from a TOML file.
    pub fn from_toml(path: &Path) -> Result<Self, LexiconError> {
        let text = std::fs::read_to_string(path).map_err(|e| LexiconError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: CatalogFile = toml::from_str(&text)
            .map_err(|e| LexiconError::Parse(e, path.display().to_string()))?;
        Self::new(file.patterns)
    }

    /// Scan a text and return the set of matched pattern ids.
    ///
    /// Overlapping hits from different tiers are each reported; consumers
    /// care about presence and count, not span geometry. Never errors;
    /// unmatched or empty text yields the empty set.
    pub fn detect(&self, text: &str) -> MatchSet {
        let mut hits = MatchSet::new();
        if text.is_empty() {
            return hits;
        }
        for (id, _tier, re) in &self.compiled {
            if re.is_match(text) {
                hits.insert(id.clone());
            }
        }
        hits
    }

    /// Catalog entries as (id, tier) pairs, in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = (&MatchId, Tier)> {
        self.compiled.iter().map(|(id, tier, _)| (id, *tier))
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
