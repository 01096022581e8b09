//! Rules command - validate, export and fingerprint rule tables

use anyhow::{Context, Result};
use listing_guard_adapters::rulebook::{FsRulebookRepo, render_rulebook};
use listing_guard_domain::{Rulebook, RulebookRepo};
use std::path::{Path, PathBuf};

use crate::args::{RulesArgs, RulesCommands};
use crate::config::AppConfig;

pub async fn execute(args: RulesArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.command {
        RulesCommands::Validate { path } => validate_rules(path, config_path).await,
        RulesCommands::Export => export_rules(),
        RulesCommands::Fingerprint => fingerprint_rules(config_path).await,
    }
}

/// The active rulebook: the configured file when set, otherwise the builtin tables
pub(crate) async fn load_rulebook(config: &AppConfig) -> Result<Rulebook> {
    match &config.general.rulebook_path {
        Some(path) => load_rulebook_file(path).await,
        None => Ok(Rulebook::builtin()),
    }
}

async fn load_rulebook_file(path: &Path) -> Result<Rulebook> {
    let repo = FsRulebookRepo::new(path).context("Failed to open rulebook")?;
    repo.load()
        .await
        .with_context(|| format!("Failed to load rulebook: {}", path.display()))
}

async fn validate_rules(path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let (source, result) = match path {
        Some(path) => (path.display().to_string(), load_rulebook_file(&path).await),
        None => {
            let config = AppConfig::load(config_path.as_deref())?;
            let source = config
                .general
                .rulebook_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "builtin".to_string());
            (source, load_rulebook(&config).await)
        }
    };

    match result {
        Ok(rulebook) => {
            println!("✓ Rulebook valid: {}", source);
            println!("  Blocked terms: {}", rulebook.moderation.blocked_terms.len());
            println!("  Flagged phrases: {}", rulebook.moderation.flagged_phrases.len());
            println!("  Tag rules: {}", rulebook.tagging.rules.len());
            println!("  Price bands: {}", rulebook.tagging.price_ladder.len());
            println!("  Keyword entries: {}", rulebook.keywords.entries().len());
            println!("  Fingerprint: {}", rulebook.fingerprint());
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Validation failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn export_rules() -> Result<()> {
    let rendered =
        render_rulebook(&Rulebook::builtin()).context("Failed to render builtin rulebook")?;
    print!("{}", rendered);
    Ok(())
}

async fn fingerprint_rules(config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let rulebook = load_rulebook(&config).await?;
    println!("{}", rulebook.fingerprint());
    Ok(())
}
