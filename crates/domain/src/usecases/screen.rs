//! Submission screening use case

use crate::{
    image::{ImageLimits, ImageValidator},
    model::{ImageRejection, ListingSubmission, ScreeningOutcome},
    moderation::ModerationEngine,
    rulebook::Rulebook,
    tagging::TagEngine,
};

/// Runs a full listing submission through moderation, image checks and tagging
#[derive(Debug, Clone)]
pub struct ScreenListing {
    moderation: ModerationEngine,
    images: ImageValidator,
    tagger: TagEngine,
}

impl ScreenListing {
    pub fn new(moderation: ModerationEngine, images: ImageValidator, tagger: TagEngine) -> Self {
        Self {
            moderation,
            images,
            tagger,
        }
    }

    /// Build every engine from one rulebook
    pub fn from_rulebook(rulebook: &Rulebook, limits: ImageLimits) -> Self {
        Self::new(
            ModerationEngine::new(rulebook.moderation.clone()),
            ImageValidator::new(limits),
            TagEngine::new(rulebook.tagging.clone()),
        )
    }

    pub fn screen(&self, submission: &ListingSubmission) -> ScreeningOutcome {
        let attributes = &submission.attributes;
        let verdict = self
            .moderation
            .classify_post(&attributes.title, attributes.description.as_deref());

        let image_errors: Vec<ImageRejection> = submission
            .images
            .iter()
            .enumerate()
            .filter_map(|(index, image)| {
                self.images
                    .validate(&image.bytes, image.filename.as_deref())
                    .err()
                    .map(|err| ImageRejection {
                        index,
                        filename: image.filename.clone(),
                        reason: err.to_string(),
                    })
            })
            .collect();

        let tags = if verdict.is_blocked() {
            Vec::new()
        } else {
            self.tagger.generate_tags(attributes)
        };

        tracing::debug!(
            verdict = verdict.label(),
            tag_count = tags.len(),
            images = submission.images.len(),
            rejected_images = image_errors.len(),
            "Screened submission"
        );

        ScreeningOutcome {
            verdict,
            tags,
            image_errors,
        }
    }
}

impl Default for ScreenListing {
    fn default() -> Self {
        Self::from_rulebook(&Rulebook::builtin(), ImageLimits::default())
    }
}
