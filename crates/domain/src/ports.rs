//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::ListingRecord;
use crate::rulebook::Rulebook;

pub use crate::rulebook::RulebookError;

/// Error type for listing store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for the record store holding published listings
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Up to `limit` records with id greater than `after_id`, in ascending id order
    async fn fetch_page(
        &self,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ListingRecord>, StoreError>;

    /// Get a single record
    async fn get(&self, id: &str) -> Result<Option<ListingRecord>, StoreError>;

    /// Insert or replace a record
    async fn upsert(&self, record: &ListingRecord) -> Result<(), StoreError>;

    /// Overwrite the tags of an existing record
    async fn update_tags(&self, id: &str, tags: &[String]) -> Result<(), StoreError>;
}

/// Port for loading the rulebook
#[async_trait]
pub trait RulebookRepo: Send + Sync {
    /// Load and validate the rulebook from the configured source
    async fn load(&self) -> Result<Rulebook, RulebookError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
