//! In-memory listing store for testing and offline mode

use async_trait::async_trait;
use listing_guard_domain::{ListingRecord, ListingStore, StoreError};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

/// In-memory listing store implementation, ordered by id
pub struct InMemoryListingStore {
    records: RwLock<BTreeMap<String, ListingRecord>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store pre-populated with `records`
    pub fn with_records(records: impl IntoIterator<Item = ListingRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id.clone(), r)).collect()),
        }
    }
}

impl Default for InMemoryListingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn fetch_page(
        &self,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ListingRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let lower = match after_id {
            Some(after) => Bound::Excluded(after),
            None => Bound::Unbounded,
        };
        Ok(records
            .range::<str, _>((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<ListingRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(records.get(id).cloned())
    }

    async fn upsert(&self, record: &ListingRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn update_tags(&self, id: &str, tags: &[String]) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.tags = tags.to_vec();
        Ok(())
    }
}
