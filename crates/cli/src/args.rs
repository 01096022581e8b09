//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// listing-guard: moderation, image checks and discovery tags for property listings
#[derive(Parser, Debug)]
#[command(name = "listing-guard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Moderate a listing title and description
    Moderate(ModerateArgs),

    /// Validate an image file against upload limits
    CheckImage(CheckImageArgs),

    /// Generate discovery tags for a listing
    Tags(TagsArgs),

    /// Look up tags matching a search query
    Search(SearchArgs),

    /// Screen a full submission (text, attributes and images)
    Screen(ScreenArgs),

    /// Import listings into the listing store
    Import(ImportArgs),

    /// Run a retroactive migration job over stored listings
    Migrate(MigrateArgs),

    /// Inspect and validate rule tables
    Rules(RulesArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct ModerateArgs {
    /// Listing title
    #[arg(long)]
    pub title: String,

    /// Listing description
    #[arg(long)]
    pub description: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckImageArgs {
    /// Image file to check
    #[arg(long)]
    pub file: PathBuf,

    /// Filename to validate the extension against (defaults to the file's name)
    #[arg(long)]
    pub name: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TagsArgs {
    /// Listing headline
    #[arg(long)]
    pub title: String,

    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,

    /// City name
    #[arg(long)]
    pub city: Option<String>,

    /// Asking price (or monthly rent)
    #[arg(long)]
    pub price: Option<f64>,

    /// Bedroom count
    #[arg(long)]
    pub bedrooms: Option<u32>,

    /// Listing type, e.g. sale, rental, lease
    #[arg(long)]
    pub listing_type: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free-text query
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub query: Option<String>,

    /// List every searchable keyword instead
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ScreenArgs {
    /// JSON submission file; image paths are relative to it
    #[arg(long)]
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON Lines file, one listing record per line
    #[arg(long)]
    pub file: PathBuf,

    /// Override listing store database path
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommands,

    /// Override listing store database path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Compute changes without writing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Output the run report as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum MigrateCommands {
    /// Recompute every listing's tags from the current rules
    Retag,

    /// Append a tag to every listing that has a feature flag
    Patch {
        /// Feature flag selecting the listings, e.g. paid_open_house
        #[arg(long)]
        feature: String,

        /// Tag to append, e.g. #OpenHouse
        #[arg(long)]
        tag: String,
    },
}

#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommands,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// Validate a rulebook file (or the configured/builtin rulebook)
    Validate {
        /// Rulebook file to validate
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Print the builtin rulebook as TOML
    Export,

    /// Print the fingerprint of the active rulebook
    Fingerprint,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration after environment overrides
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
