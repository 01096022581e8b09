//! Domain models and value objects

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Structured and free-text attributes of a property listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingAttributes {
    /// City name as entered by the lister
    #[serde(default)]
    pub city: Option<String>,
    /// Asking price (or rent) in whole currency units
    #[serde(default)]
    pub price: Option<f64>,
    /// Bedroom count
    #[serde(default)]
    pub bedrooms: Option<u32>,
    /// Listing type, e.g. "sale", "rental", "lease"
    #[serde(default)]
    pub listing_type: Option<String>,
    /// Listing headline
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
}

/// A listing as held by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Store-assigned identifier
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub listing_type: Option<String>,
    /// Stored discovery tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Feature flags set by other parts of the product (e.g. `paid_open_house`)
    #[serde(default)]
    pub features: Vec<String>,
}

impl ListingRecord {
    /// Tagging-relevant attributes of this record
    pub fn attributes(&self) -> ListingAttributes {
        ListingAttributes {
            city: self.city.clone(),
            price: self.price,
            bedrooms: self.bedrooms,
            listing_type: self.listing_type.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Which submitted text field a verdict refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Description,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
        }
    }
}

/// Outcome of moderating one or more text fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// Safe to publish
    Approved,
    /// Publication refused; the submitter must edit
    Blocked { reason: String },
    /// Publication allowed but queued for manual review
    FlaggedForReview {
        reason: String,
        filtered_text: String,
    },
}

impl Verdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Blocked { .. })
    }

    pub fn is_flagged(&self) -> bool {
        matches!(self, Verdict::FlaggedForReview { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Approved => None,
            Verdict::Blocked { reason } | Verdict::FlaggedForReview { reason, .. } => Some(reason),
        }
    }

    /// Short status label for logs and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Blocked { .. } => "blocked",
            Verdict::FlaggedForReview { .. } => "flagged_for_review",
        }
    }
}

/// An image attached to a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedImage {
    /// Original filename, if the client supplied one
    #[serde(default)]
    pub filename: Option<String>,
    /// Raw file bytes
    #[serde(default)]
    pub bytes: Vec<u8>,
}

/// A full listing submission: text, attributes and images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSubmission {
    #[serde(flatten)]
    pub attributes: ListingAttributes,
    #[serde(default)]
    pub images: Vec<SubmittedImage>,
}

/// A rejected image within a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRejection {
    /// Position of the image in the submission
    pub index: usize,
    pub filename: Option<String>,
    pub reason: String,
}

/// Result of screening a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningOutcome {
    pub verdict: Verdict,
    /// Discovery tags; empty when the text was blocked
    pub tags: Vec<String>,
    pub image_errors: Vec<ImageRejection>,
}

impl ScreeningOutcome {
    /// Whether the listing may go live (possibly pending review)
    pub fn is_publishable(&self) -> bool {
        !self.verdict.is_blocked() && self.image_errors.is_empty()
    }
}

/// A record the migration job could not update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub id: String,
    pub error: String,
}

/// Which migration job produced a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationJob {
    /// Recompute every listing's tags from the current rules
    RegenerateTags,
    /// Append a literal tag to listings matching a predicate
    PatchTag { tag: String },
}

/// Summary of a migration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub job: MigrationJob,
    /// Fingerprint of the rulebook the run used
    pub rulebook_hash: String,
    pub dry_run: bool,
    /// Records read from the store
    pub scanned: usize,
    /// Records the job applied to
    pub matched: usize,
    /// Records written (or that would be written in a dry run)
    pub updated: usize,
    /// Matched records left untouched because no change was needed
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<RecordFailure>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
}
