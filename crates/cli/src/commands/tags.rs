//! Tags command - generate discovery tags for a listing

use anyhow::Result;
use listing_guard_domain::{ListingAttributes, TagEngine};
use std::path::PathBuf;

use crate::args::TagsArgs;
use crate::commands::rules::load_rulebook;
use crate::config::AppConfig;

pub async fn execute(args: TagsArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let rulebook = load_rulebook(&config).await?;
    let engine = TagEngine::new(rulebook.tagging);

    let listing = ListingAttributes {
        city: args.city,
        price: args.price,
        bedrooms: args.bedrooms,
        listing_type: args.listing_type,
        title: args.title,
        description: args.description,
    };

    let tags = engine.generate_tags(&listing);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
    } else if tags.is_empty() {
        println!("No tags");
    } else {
        for tag in &tags {
            println!("{}", tag);
        }
    }

    Ok(())
}
