//! listing-guard CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; the flag wins over the configured level
    let log_level = match &cli.log_level {
        Some(level) => level.clone(),
        None => AppConfig::configured_log_level(cli.config.as_deref()),
    };
    init_logging(&log_level)?;

    // Execute command
    match cli.command {
        Commands::Moderate(args) => commands::moderate::execute(args, cli.config).await,
        Commands::CheckImage(args) => commands::check_image::execute(args, cli.config).await,
        Commands::Tags(args) => commands::tags::execute(args, cli.config).await,
        Commands::Search(args) => commands::search::execute(args, cli.config).await,
        Commands::Screen(args) => commands::screen::execute(args, cli.config).await,
        Commands::Import(args) => commands::import::execute(args, cli.config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, cli.config).await,
        Commands::Rules(args) => commands::rules::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args, cli.config).await,
        Commands::Doctor(args) => commands::doctor::execute(args, cli.config).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
