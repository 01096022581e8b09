//! Rulebook: every data table the engines read
//!
//! A rulebook is loaded once at startup and handed to each engine's
//! constructor. Sections missing from an override file fall back to the
//! compiled-in tables.

pub(crate) mod builtin;

use std::collections::BTreeSet;
use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::keywords::KeywordIndex;
use crate::moderation::ModerationVocabulary;
use crate::tagging::{TaggingRules, Trigger};

#[derive(Debug, Error)]
pub enum RulebookError {
    #[error("Rulebook file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read rulebook {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rulebook {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid rulebook: {0}")]
    Invalid(String),
}

/// Complete rule data for moderation, tagging and keyword search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rulebook {
    pub moderation: ModerationVocabulary,
    pub tagging: TaggingRules,
    pub keywords: KeywordIndex,
}

impl Rulebook {
    /// The compiled-in tables
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Check structural invariants; reports every problem found, not just the first
    pub fn validate(&self) -> Result<(), RulebookError> {
        let patterns = Patterns::new()?;
        let mut problems = Vec::new();
        self.validate_moderation(&mut problems);
        self.validate_tagging(&patterns, &mut problems);
        self.validate_keywords(&patterns, &mut problems);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(RulebookError::Invalid(problems.join("; ")))
        }
    }

    /// Hex SHA-256 of the canonical JSON form, recorded in migration reports
    pub fn fingerprint(&self) -> String {
        // Struct fields serialize in declaration order and maps are BTreeMaps,
        // so the JSON form is stable for equal rulebooks
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let digest = Sha256::digest(&canonical);
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn validate_moderation(&self, problems: &mut Vec<String>) {
        let m = &self.moderation;
        check_terms("moderation.blocked_terms", &m.blocked_terms, problems);
        check_terms("moderation.flagged_phrases", &m.flagged_phrases, problems);
        check_terms("moderation.url_markers", &m.url_markers, problems);
        check_terms("moderation.allowed_domains", &m.allowed_domains, problems);

        if !(m.caps_ratio > 0.0 && m.caps_ratio <= 1.0) {
            problems.push(format!(
                "moderation.caps_ratio must be in (0, 1], got {}",
                m.caps_ratio
            ));
        }
        if m.blocked_message.trim().is_empty() {
            problems.push("moderation.blocked_message must not be empty".to_string());
        }
    }

    fn validate_tagging(&self, patterns: &Patterns, problems: &mut Vec<String>) {
        let t = &self.tagging;

        if t.max_tags == 0 {
            problems.push("tagging.max_tags must be greater than zero".to_string());
        }

        for tag in [&t.lease_tag, &t.large_property.tag, &t.studio.tag] {
            patterns.check_tag(tag, problems);
        }
        if t.studio.bedrooms >= t.large_property.bedrooms {
            problems.push(format!(
                "tagging.studio.bedrooms ({}) must be below tagging.large_property.bedrooms ({})",
                t.studio.bedrooms, t.large_property.bedrooms
            ));
        }

        let mut previous: Option<f64> = None;
        for band in &t.price_ladder {
            patterns.check_tag(&band.tag, problems);
            if let Some(bound) = band.below {
                if !bound.is_finite() || previous.is_some_and(|p| bound <= p) {
                    problems.push(format!(
                        "tagging.price_ladder: bounds must be finite and strictly ascending ({})",
                        band.tag
                    ));
                }
                previous = Some(bound);
            }
        }
        match t.price_ladder.split_last() {
            None => problems.push("tagging.price_ladder must not be empty".to_string()),
            Some((last, rest)) => {
                if last.below.is_some() {
                    problems.push("tagging.price_ladder: last band must be unbounded".to_string());
                }
                if let Some(band) = rest.iter().find(|b| b.below.is_none()) {
                    problems.push(format!(
                        "tagging.price_ladder: only the last band may be unbounded ({})",
                        band.tag
                    ));
                }
            }
        }

        let mut seen = BTreeSet::new();
        for rule in &t.rules {
            patterns.check_tag(&rule.tag, problems);
            if !seen.insert(rule.tag.as_str()) {
                problems.push(format!("tagging.rules: duplicate rule for {}", rule.tag));
            }
            if rule.trigger.phrases().iter().any(|p| p.trim().is_empty()) {
                problems.push(format!("tagging.rules: empty phrase in {}", rule.tag));
            }
            if let Trigger::Together { groups } = &rule.trigger {
                if groups.is_empty() || groups.iter().any(Vec::is_empty) {
                    problems.push(format!("tagging.rules: empty phrase group in {}", rule.tag));
                }
            }
        }
    }

    fn validate_keywords(&self, patterns: &Patterns, problems: &mut Vec<String>) {
        for (tag, synonyms) in self.keywords.entries() {
            if !patterns.index_key.is_match(tag) {
                problems.push(format!(
                    "keywords: '{}' must be a bare tag name without '#'",
                    tag
                ));
            }
            if synonyms.iter().any(|s| s.trim().is_empty()) {
                problems.push(format!("keywords: empty synonym for {}", tag));
            }
        }
    }
}

struct Patterns {
    tag: Regex,
    index_key: Regex,
}

impl Patterns {
    fn new() -> Result<Self, RulebookError> {
        let compile =
            |p: &str| Regex::new(p).map_err(|e| RulebookError::Invalid(e.to_string()));
        Ok(Self {
            tag: compile(r"^#[A-Za-z0-9]+$")?,
            index_key: compile(r"^[A-Za-z0-9]+$")?,
        })
    }

    fn check_tag(&self, tag: &str, problems: &mut Vec<String>) {
        if !self.tag.is_match(tag) {
            problems.push(format!("'{}' is not a valid tag (expected #Name)", tag));
        }
    }
}

fn check_terms(section: &str, terms: &[String], problems: &mut Vec<String>) {
    if terms.iter().any(|t| t.trim().is_empty()) {
        problems.push(format!("{} contains an empty entry", section));
    }
}
