//! Import command - load JSON Lines listings into the listing store

use anyhow::{Context, Result};
use listing_guard_adapters::store::SqliteListingStore;
use listing_guard_domain::{ListingRecord, ListingStore};
use std::path::PathBuf;

use crate::args::ImportArgs;
use crate::config::AppConfig;

pub async fn execute(args: ImportArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let db_path = args.db.unwrap_or(config.general.store_db_path);

    let content = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read listings: {}", args.file.display()))?;

    // Parse everything before touching the store so a bad line imports nothing
    let mut records = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: ListingRecord = serde_json::from_str(line).with_context(|| {
            format!("Invalid listing on line {} of {}", number + 1, args.file.display())
        })?;
        records.push(record);
    }

    let store = SqliteListingStore::new(&db_path)
        .await
        .with_context(|| format!("Failed to open listing store: {}", db_path.display()))?;

    for record in &records {
        store
            .upsert(record)
            .await
            .with_context(|| format!("Failed to store listing {}", record.id))?;
    }

    tracing::info!(
        count = records.len(),
        db = %db_path.display(),
        "Imported listings"
    );
    println!("Imported {} listings into {}", records.len(), db_path.display());

    Ok(())
}
