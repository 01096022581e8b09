//! Moderation decision engine
//!
//! Each text field runs through a fixed sequence of checks; the first check
//! that fires decides the field's verdict. Title and description verdicts are
//! then combined, with the title taking precedence.

use serde::{Deserialize, Serialize};

use crate::model::{Field, Verdict};
use crate::text::{PreparedText, TermMatcher};

/// Replacement for link-bearing tokens in reviewer previews
const LINK_PLACEHOLDER: &str = "[link removed]";

/// Word lists and thresholds used by the moderation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationVocabulary {
    /// Terms that block publication outright (matched with evasion variants)
    pub blocked_terms: Vec<String>,
    /// Scam, fair-housing and contact-redirect phrases that trigger review
    pub flagged_phrases: Vec<String>,
    /// Substrings that mark text as containing a link
    pub url_markers: Vec<String>,
    /// The platform's own domains; links to these are not flagged
    pub allowed_domains: Vec<String>,
    /// Uppercase-to-letter ratio above which text is flagged
    pub caps_ratio: f64,
    /// Caps check only applies to text longer than this many characters
    pub caps_min_length: usize,
    /// Message shown to submitters whose text was blocked
    pub blocked_message: String,
    /// Enables the vowel-stripped fallback when matching blocked terms
    pub vowel_stripped_matching: bool,
}

impl Default for ModerationVocabulary {
    fn default() -> Self {
        crate::rulebook::builtin::moderation_vocabulary()
    }
}

/// Per-field checks in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldCheck {
    BlockedTerm,
    SuspiciousUrl,
    FlaggedPhrase,
    ExcessiveCaps,
}

const CHECK_ORDER: [FieldCheck; 4] = [
    FieldCheck::BlockedTerm,
    FieldCheck::SuspiciousUrl,
    FieldCheck::FlaggedPhrase,
    FieldCheck::ExcessiveCaps,
];

/// Classifies listing text as approved, flagged or blocked
#[derive(Debug, Clone)]
pub struct ModerationEngine {
    vocabulary: ModerationVocabulary,
    matcher: TermMatcher,
    blocked_terms: Vec<String>,
    flagged_phrases: Vec<String>,
    url_markers: Vec<String>,
    allowed_domains: Vec<String>,
}

impl ModerationEngine {
    pub fn new(vocabulary: ModerationVocabulary) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Self {
            matcher: TermMatcher::new(vocabulary.vowel_stripped_matching),
            blocked_terms: lower(&vocabulary.blocked_terms),
            flagged_phrases: lower(&vocabulary.flagged_phrases),
            url_markers: lower(&vocabulary.url_markers),
            allowed_domains: lower(&vocabulary.allowed_domains),
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> &ModerationVocabulary {
        &self.vocabulary
    }

    /// Verdict for a single piece of text
    pub fn classify(&self, text: &str) -> Verdict {
        let prepared = PreparedText::new(text);
        CHECK_ORDER
            .iter()
            .find_map(|check| self.run_check(*check, text, &prepared))
            .unwrap_or(Verdict::Approved)
    }

    /// Combined verdict for a title and optional description.
    ///
    /// A block on either field wins, title first; otherwise a flag on either
    /// field wins, title first; otherwise approved. Empty descriptions are
    /// not checked.
    pub fn classify_post(&self, title: &str, description: Option<&str>) -> Verdict {
        let title_verdict = self.classify(title);
        if title_verdict.is_blocked() {
            tracing::debug!(field = "title", "Post blocked");
            return self.blocked_for(Field::Title);
        }

        let description_verdict = match description.map(str::trim) {
            Some(text) if !text.is_empty() => self.classify(text),
            _ => Verdict::Approved,
        };
        if description_verdict.is_blocked() {
            tracing::debug!(field = "description", "Post blocked");
            return self.blocked_for(Field::Description);
        }

        if title_verdict.is_flagged() {
            return title_verdict;
        }
        if description_verdict.is_flagged() {
            return description_verdict;
        }

        Verdict::Approved
    }

    fn blocked_for(&self, field: Field) -> Verdict {
        Verdict::Blocked {
            reason: format!("{}: {}", field.label(), self.vocabulary.blocked_message),
        }
    }

    fn run_check(&self, check: FieldCheck, text: &str, prepared: &PreparedText) -> Option<Verdict> {
        match check {
            FieldCheck::BlockedTerm => self.check_blocked_terms(prepared),
            FieldCheck::SuspiciousUrl => self.check_urls(text, prepared),
            FieldCheck::FlaggedPhrase => self.check_flagged_phrases(text, prepared),
            FieldCheck::ExcessiveCaps => self.check_caps(text),
        }
    }

    fn check_blocked_terms(&self, prepared: &PreparedText) -> Option<Verdict> {
        // The matched term is deliberately not carried into the verdict or logs
        self.blocked_terms
            .iter()
            .any(|term| self.matcher.contains(prepared, term))
            .then(|| Verdict::Blocked {
                reason: self.vocabulary.blocked_message.clone(),
            })
    }

    fn check_urls(&self, text: &str, prepared: &PreparedText) -> Option<Verdict> {
        let lower = prepared.raw_lower();
        if !self.contains_link(lower) {
            return None;
        }
        if self.allowed_domains.iter().any(|d| lower.contains(d.as_str())) {
            return None;
        }

        Some(Verdict::FlaggedForReview {
            reason: "Contains external link".to_string(),
            filtered_text: self.strip_links(text),
        })
    }

    fn check_flagged_phrases(&self, text: &str, prepared: &PreparedText) -> Option<Verdict> {
        let lower = prepared.raw_lower();
        self.flagged_phrases
            .iter()
            .find(|phrase| lower.contains(phrase.as_str()))
            .map(|phrase| Verdict::FlaggedForReview {
                reason: format!("Contains flagged phrase: {}", phrase),
                filtered_text: text.trim().to_string(),
            })
    }

    fn check_caps(&self, text: &str) -> Option<Verdict> {
        if text.chars().count() <= self.vocabulary.caps_min_length {
            return None;
        }

        let letters = text.chars().filter(|c| c.is_alphabetic()).count();
        if letters == 0 {
            return None;
        }
        let upper = text.chars().filter(|c| c.is_uppercase()).count();

        ((upper as f64 / letters as f64) > self.vocabulary.caps_ratio).then(|| {
            Verdict::FlaggedForReview {
                reason: "Excessive capitalization".to_string(),
                filtered_text: text.trim().to_string(),
            }
        })
    }

    fn contains_link(&self, lower: &str) -> bool {
        self.url_markers.iter().any(|m| lower.contains(m.as_str()))
    }

    fn strip_links(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| {
                if self.contains_link(&token.to_lowercase()) {
                    LINK_PLACEHOLDER
                } else {
                    token
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ModerationEngine {
    fn default() -> Self {
        Self::new(ModerationVocabulary::default())
    }
}
