//! Screen command - run a full submission through moderation, image checks and tagging

use anyhow::{Context, Result};
use listing_guard_domain::usecases::ScreenListing;
use listing_guard_domain::{ListingAttributes, ListingSubmission, ScreeningOutcome, SubmittedImage};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::args::ScreenArgs;
use crate::commands::moderate::print_verdict;
use crate::commands::rules::load_rulebook;
use crate::config::AppConfig;

/// Submission file layout: listing attributes plus image file references
#[derive(Debug, Deserialize)]
struct SubmissionFile {
    #[serde(flatten)]
    attributes: ListingAttributes,
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    /// Relative paths resolve against the submission file's directory
    path: PathBuf,
    /// Upload filename; defaults to the file's own name
    #[serde(default)]
    name: Option<String>,
}

pub async fn execute(args: ScreenArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let rulebook = load_rulebook(&config).await?;
    let screener = ScreenListing::from_rulebook(&rulebook, config.images);

    let submission = read_submission(&args.file).await?;
    let outcome = screener.screen(&submission);

    tracing::info!(
        status = outcome.verdict.label(),
        tags = outcome.tags.len(),
        image_errors = outcome.image_errors.len(),
        "Screened submission"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    if !outcome.is_publishable() {
        std::process::exit(1);
    }

    Ok(())
}

async fn read_submission(path: &Path) -> Result<ListingSubmission> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read submission: {}", path.display()))?;
    let file: SubmissionFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse submission: {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut images = Vec::with_capacity(file.images.len());
    for image in file.images {
        let image_path = base.join(&image.path);
        let bytes = tokio::fs::read(&image_path)
            .await
            .with_context(|| format!("Failed to read image: {}", image_path.display()))?;
        let filename = image.name.or_else(|| {
            image
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        });
        images.push(SubmittedImage { filename, bytes });
    }

    Ok(ListingSubmission {
        attributes: file.attributes,
        images,
    })
}

fn print_outcome(outcome: &ScreeningOutcome) {
    print_verdict(&outcome.verdict);

    if outcome.tags.is_empty() {
        println!("Tags: none");
    } else {
        println!("Tags: {}", outcome.tags.join(" "));
    }

    for rejection in &outcome.image_errors {
        println!(
            "Image {} ({}): {}",
            rejection.index,
            rejection.filename.as_deref().unwrap_or("unnamed"),
            rejection.reason
        );
    }

    println!();
    if outcome.is_publishable() {
        println!("✓ Publishable");
    } else {
        println!("✗ Not publishable");
    }
}
