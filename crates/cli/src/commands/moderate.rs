//! Moderate command - classify a listing's title and description

use anyhow::Result;
use listing_guard_domain::{ModerationEngine, Verdict};
use std::path::PathBuf;

use crate::args::ModerateArgs;
use crate::commands::rules::load_rulebook;
use crate::config::AppConfig;

pub async fn execute(args: ModerateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let rulebook = load_rulebook(&config).await?;
    let engine = ModerationEngine::new(rulebook.moderation);

    let verdict = engine.classify_post(&args.title, args.description.as_deref());
    tracing::debug!(status = verdict.label(), "Moderation complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_verdict(&verdict);
    }

    Ok(())
}

pub(crate) fn print_verdict(verdict: &Verdict) {
    println!("Verdict: {}", verdict.label());
    match verdict {
        Verdict::Approved => {}
        Verdict::Blocked { reason } => println!("Reason: {}", reason),
        Verdict::FlaggedForReview {
            reason,
            filtered_text,
        } => {
            println!("Reason: {}", reason);
            println!("Filtered: {}", filtered_text);
        }
    }
}
