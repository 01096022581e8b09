//! Config command - write a starter file or print the effective settings

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::args::{ConfigArgs, ConfigCommands};
use crate::config::AppConfig;

pub async fn execute(args: ConfigArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => write_starter(&path, force),
        ConfigCommands::Show { json } => show_effective(config_path.as_deref(), json),
    }
}

/// Writes the example TOML; without `force` an existing file is never touched.
fn write_starter(path: &Path, force: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => anyhow::bail!(
            "Config file already exists: {} (pass --force to replace it)",
            path.display()
        ),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", path.display()));
        }
    };
    file.write_all(AppConfig::example_toml().as_bytes())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    let defaults = AppConfig::default();
    tracing::info!(path = %path.display(), "Wrote starter config");
    println!("Created config file: {}", path.display());
    println!("  listing store: {}", defaults.general.store_db_path.display());
    println!("  rulebook:      builtin (set general.rulebook_path to override)");
    println!();
    println!("Check the result with 'listing-guard --config {} doctor'", path.display());

    Ok(())
}

/// Prints the config after file and `LISTING_GUARD__*` environment layering.
fn show_effective(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = AppConfig::load(config_path)?;

    let rendered = if json {
        serde_json::to_string_pretty(&config)?
    } else {
        toml::to_string_pretty(&config).context("Failed to render configuration as TOML")?
    };
    println!("{}", rendered.trim_end());

    Ok(())
}
