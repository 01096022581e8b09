//! Search command - resolve a free-text query to tags through the keyword index

use anyhow::Result;
use std::path::PathBuf;

use crate::args::SearchArgs;
use crate::commands::rules::load_rulebook;
use crate::config::AppConfig;

pub async fn execute(args: SearchArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let index = load_rulebook(&config).await?.keywords;

    let results: Vec<String> = if args.all {
        index.all_keywords()
    } else {
        let query = args.query.unwrap_or_default();
        index
            .find_matching_tags(&query)
            .into_iter()
            .map(|tag| format!("#{}", tag))
            .collect()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No matches");
    } else {
        for item in &results {
            println!("{}", item);
        }
    }

    Ok(())
}
