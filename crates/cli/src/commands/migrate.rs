//! Migrate command - retroactive re-tagging and targeted tag patches

use anyhow::{Context, Result};
use listing_guard_adapters::store::SqliteListingStore;
use listing_guard_domain::usecases::MigrationJobs;
use listing_guard_domain::{MigrationJob, MigrationReport, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::{MigrateArgs, MigrateCommands};
use crate::commands::rules::load_rulebook;
use crate::config::AppConfig;

pub async fn execute(args: MigrateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let rulebook = load_rulebook(&config).await?;
    let db_path = args.db.unwrap_or_else(|| config.general.store_db_path.clone());

    let store = SqliteListingStore::new(&db_path)
        .await
        .with_context(|| format!("Failed to open listing store: {}", db_path.display()))?;

    let jobs = MigrationJobs::new(
        Arc::new(store),
        Arc::new(SystemClock),
        &rulebook,
        config.migration.to_run_config(args.dry_run),
    );

    let report = match args.command {
        MigrateCommands::Retag => jobs
            .regenerate_tags()
            .await
            .context("Tag regeneration failed")?,
        MigrateCommands::Patch { feature, tag } => jobs
            .patch_tag(&tag, |record| record.has_feature(&feature))
            .await
            .context("Tag patch failed")?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &MigrationReport) {
    let job = match &report.job {
        MigrationJob::RegenerateTags => "regenerate tags".to_string(),
        MigrationJob::PatchTag { tag } => format!("patch tag {}", tag),
    };

    println!("Migration: {}", job);
    if report.dry_run {
        println!("  Mode: dry run (nothing written)");
    }
    println!("  Run: {}", report.run_id);
    println!("  Rulebook: {}", report.rulebook_hash);
    println!("  Scanned: {}", report.scanned);
    println!("  Matched: {}", report.matched);
    println!("  Updated: {}", report.updated);
    println!("  Skipped: {}", report.skipped);
    println!("  Failed: {}", report.failed);

    for failure in &report.failures {
        println!("  ✗ {}: {}", failure.id, failure.error);
    }
}
