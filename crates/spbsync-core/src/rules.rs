//! Filename routing rules
//!
//! A [`RuleSet`] is an ordered list of `{pattern, target_folder}` pairs
//! loaded from the `FILENAME_PATTERNS` JSON document. Rules are evaluated
//! in list order and the first match wins. All patterns are compiled
//! eagerly at load time; the whole configuration is rejected on the first
//! invalid entry, so a malformed pattern can never surface per-file at
//! runtime.

use std::collections::BTreeSet;

use regex::Regex;
use serde::Deserialize;

use crate::domain::SyncError;

/// Raw JSON shape of a single rule entry
#[derive(Debug, Deserialize)]
struct RawRule {
    pattern: String,
    target_folder: String,
}

/// A single compiled routing rule
#[derive(Debug)]
pub struct FilenameRule {
    pattern: Regex,
    target_folder: String,
}

impl FilenameRule {
    /// The destination sub-folder this rule routes matches to.
    pub fn target_folder(&self) -> &str {
        &self.target_folder
    }

    /// The original pattern text, for logging.
    pub fn pattern_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Ordered, immutable set of filename routing rules
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<FilenameRule>,
}

impl RuleSet {
    /// Parses and compiles the rule set from the `FILENAME_PATTERNS` JSON
    /// array.
    ///
    /// Fails with [`SyncError::Config`] on malformed JSON, a missing or
    /// empty field, or an invalid regular expression. The first invalid
    /// entry rejects the whole configuration.
    pub fn parse(json: &str) -> Result<Self, SyncError> {
        let raw: Vec<RawRule> = serde_json::from_str(json).map_err(|e| {
            SyncError::Config(format!("FILENAME_PATTERNS is not a valid JSON array: {e}"))
        })?;

        if raw.is_empty() {
            return Err(SyncError::Config(
                "FILENAME_PATTERNS must contain at least one rule".to_string(),
            ));
        }

        let mut rules = Vec::with_capacity(raw.len());
        for (index, entry) in raw.into_iter().enumerate() {
            if entry.pattern.is_empty() || entry.target_folder.is_empty() {
                return Err(SyncError::Config(format!(
                    "rule {index}: 'pattern' and 'target_folder' must be non-empty"
                )));
            }
            let pattern = Regex::new(&entry.pattern).map_err(|e| {
                SyncError::Config(format!(
                    "rule {index}: invalid pattern '{}': {e}",
                    entry.pattern
                ))
            })?;
            rules.push(FilenameRule {
                pattern,
                target_folder: entry.target_folder,
            });
        }

        Ok(Self { rules })
    }

    /// Classifies a filename against the rules in list order.
    ///
    /// Returns the target folder of the first matching rule, or `None`
    /// when no rule applies (the file is excluded from the sync).
    /// Pure function of the filename and the rule set.
    pub fn match_target(&self, filename: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(filename))
            .map(|rule| rule.target_folder.as_str())
    }

    /// Distinct target folders in a stable order, used as the listing
    /// prefixes on the destination side.
    pub fn target_folders(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .map(|rule| rule.target_folder.as_str())
            .collect()
    }

    /// Number of rules in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterator over the compiled rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &FilenameRule> {
        self.rules.iter()
    }
}
