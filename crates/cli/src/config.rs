//! Configuration loading and management

use anyhow::{Context, Result};
use listing_guard_domain::ImageLimits;
use listing_guard_domain::usecases::MigrationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub images: ImageLimits,

    #[serde(default)]
    pub migration: MigrationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Rulebook TOML overriding the builtin tables; builtin when unset
    #[serde(default)]
    pub rulebook_path: Option<PathBuf>,

    #[serde(default = "default_store_db_path")]
    pub store_db_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default)]
    pub dry_run: bool,
}

impl MigrationSettings {
    /// Domain-level run configuration; `force_dry_run` comes from the command line
    pub fn to_run_config(&self, force_dry_run: bool) -> MigrationConfig {
        MigrationConfig {
            page_size: self.page_size.max(1),
            max_concurrent: self.max_concurrent.max(1),
            dry_run: self.dry_run || force_dry_run,
        }
    }
}

// Default value functions
fn default_store_db_path() -> PathBuf {
    PathBuf::from("./listings.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_max_concurrent() -> usize {
    1
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            rulebook_path: None,
            store_db_path: default_store_db_path(),
            log_level: default_log_level(),
        }
    }
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_concurrent: default_max_concurrent(),
            dry_run: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("LISTING_GUARD")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("images.allowed_extensions"),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// `general.log_level` from the layered config, or `info` when it cannot be loaded.
    ///
    /// Load errors are left for the command itself to report once logging is up.
    pub fn configured_log_level(config_path: Option<&Path>) -> String {
        Self::load(config_path)
            .map(|config| config.general.log_level)
            .unwrap_or_else(|_| default_log_level())
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# listing-guard configuration

[general]
# Rulebook overriding the builtin moderation and tagging tables.
# Generate a starting point with: listing-guard rules export > rules.toml
# rulebook_path = "./rules.toml"
store_db_path = "./listings.sqlite"
log_level = "info"

[images]
min_bytes = 1024
max_bytes = 10485760
allowed_extensions = ["jpg", "jpeg", "png", "heic"]
min_dimension = 100
max_dimension = 4096

[migration]
page_size = 100
max_concurrent = 1
dry_run = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.general.rulebook_path, None);
        assert_eq!(config.general.store_db_path, PathBuf::from("./listings.sqlite"));
        assert_eq!(config.images, ImageLimits::default());
        assert_eq!(config.migration.page_size, 100);
        assert!(!config.migration.dry_run);
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: AppConfig = toml::from_str("[images]\nmax_dimension = 2048\n").unwrap();
        assert_eq!(config.images.max_dimension, 2048);
        assert_eq!(config.images.min_dimension, 100);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.migration.max_concurrent, 1);
    }

    #[test]
    fn test_configured_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").unwrap();

        assert_eq!(AppConfig::configured_log_level(Some(&path)), "debug");
        // unreadable config falls back rather than failing before logging starts
        let missing = dir.path().join("missing.toml");
        assert_eq!(AppConfig::configured_log_level(Some(&missing)), "info");
    }

    #[test]
    fn test_run_config_dry_run_flag_wins() {
        let settings = MigrationSettings::default();
        assert!(!settings.to_run_config(false).dry_run);
        assert!(settings.to_run_config(true).dry_run);

        let zeroed = MigrationSettings {
            page_size: 0,
            max_concurrent: 0,
            dry_run: true,
        };
        let run = zeroed.to_run_config(false);
        assert_eq!(run.page_size, 1);
        assert_eq!(run.max_concurrent, 1);
        assert!(run.dry_run);
    }
}
