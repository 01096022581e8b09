//! Filesystem-based rulebook repository

use async_trait::async_trait;
use listing_guard_domain::{Rulebook, RulebookError, RulebookRepo};
use std::path::{Path, PathBuf};

/// Loads a TOML rulebook from disk
pub struct FsRulebookRepo {
    path: PathBuf,
}

impl FsRulebookRepo {
    /// Create a new filesystem rulebook repo
    pub fn new(path: impl AsRef<Path>) -> Result<Self, RulebookError> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(RulebookError::NotFound(path));
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse and validate rulebook TOML; `path` is only used in error messages
pub fn parse_rulebook(content: &str, path: &Path) -> Result<Rulebook, RulebookError> {
    let rulebook: Rulebook = toml::from_str(content).map_err(|e| RulebookError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    rulebook.validate()?;
    Ok(rulebook)
}

/// Render a rulebook as TOML that `parse_rulebook` accepts
pub fn render_rulebook(rulebook: &Rulebook) -> Result<String, RulebookError> {
    toml::to_string_pretty(rulebook).map_err(|e| RulebookError::Invalid(e.to_string()))
}

#[async_trait]
impl RulebookRepo for FsRulebookRepo {
    async fn load(&self) -> Result<Rulebook, RulebookError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| RulebookError::Io {
                path: self.path.clone(),
                source,
            })?;

        let rulebook = parse_rulebook(&content, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            rules = rulebook.tagging.rules.len(),
            blocked_terms = rulebook.moderation.blocked_terms.len(),
            fingerprint = %rulebook.fingerprint(),
            "Loaded rulebook"
        );

        Ok(rulebook)
    }
}
