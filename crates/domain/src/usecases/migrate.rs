//! Retroactive migration jobs - re-tag or patch every stored listing

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::{
    model::{ListingRecord, MigrationJob, MigrationReport, RecordFailure},
    ports::{Clock, ListingStore, StoreError},
    rulebook::Rulebook,
    tagging::TagEngine,
};

/// Configuration for migration runs
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Records fetched per page
    pub page_size: usize,
    /// Maximum concurrent record updates within a page
    pub max_concurrent: usize,
    /// Compute changes without writing them
    pub dry_run: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_concurrent: 1,
            dry_run: false,
        }
    }
}

/// Errors that abort a migration run
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Failed to fetch listings after {after_id:?}: {message}")]
    Fetch {
        after_id: Option<String>,
        message: String,
    },
    #[error("Invalid tag '{0}': must be '#' followed by non-whitespace characters")]
    InvalidTag(String),
}

/// What a job wants done with one record
enum Plan {
    /// Job does not apply
    Ignore,
    /// Job applies but the record is already up to date
    Unchanged,
    /// Replace the record's tags
    Write(Vec<String>),
}

/// Batch drivers over the listing store
pub struct MigrationJobs<S, Cl>
where
    S: ListingStore + ?Sized,
    Cl: Clock + ?Sized,
{
    store: Arc<S>,
    clock: Arc<Cl>,
    tagger: TagEngine,
    rulebook_hash: String,
    config: MigrationConfig,
}

impl<S, Cl> MigrationJobs<S, Cl>
where
    S: ListingStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<Cl>, rulebook: &Rulebook, config: MigrationConfig) -> Self {
        Self {
            store,
            clock,
            tagger: TagEngine::new(rulebook.tagging.clone()),
            rulebook_hash: rulebook.fingerprint(),
            config,
        }
    }

    /// Recompute every listing's tags from its stored attributes
    pub async fn regenerate_tags(&self) -> Result<MigrationReport, MigrationError> {
        self.run(MigrationJob::RegenerateTags, |record| {
            let tags = self.tagger.generate_tags(&record.attributes());
            if tags == record.tags {
                Plan::Unchanged
            } else {
                Plan::Write(tags)
            }
        })
        .await
    }

    /// Append `tag` to every listing matching `predicate` that lacks it
    pub async fn patch_tag<P>(&self, tag: &str, predicate: P) -> Result<MigrationReport, MigrationError>
    where
        P: Fn(&ListingRecord) -> bool,
    {
        let tag = tag.trim();
        if tag.len() < 2 || !tag.starts_with('#') || tag.chars().any(char::is_whitespace) {
            return Err(MigrationError::InvalidTag(tag.to_string()));
        }

        let job = MigrationJob::PatchTag {
            tag: tag.to_string(),
        };
        self.run(job, |record| {
            if !predicate(record) {
                Plan::Ignore
            } else if record.tags.iter().any(|t| t == tag) {
                Plan::Unchanged
            } else {
                let mut tags = record.tags.clone();
                tags.push(tag.to_string());
                Plan::Write(tags)
            }
        })
        .await
    }

    async fn run<F>(&self, job: MigrationJob, plan: F) -> Result<MigrationReport, MigrationError>
    where
        F: Fn(&ListingRecord) -> Plan,
    {
        let run_id = Uuid::new_v4();
        let started_at = self.clock.now();
        let page_size = self.config.page_size.max(1);
        let max_concurrent = self.config.max_concurrent.max(1);

        tracing::info!(
            run_id = %run_id,
            job = ?job,
            rulebook_hash = %self.rulebook_hash,
            dry_run = self.config.dry_run,
            page_size,
            max_concurrent,
            "Starting migration"
        );

        let mut report = MigrationReport {
            run_id,
            job,
            rulebook_hash: self.rulebook_hash.clone(),
            dry_run: self.config.dry_run,
            scanned: 0,
            matched: 0,
            updated: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
            started_at,
            finished_at: started_at,
        };

        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .store
                .fetch_page(cursor.as_deref(), page_size)
                .await
                .map_err(|e| MigrationError::Fetch {
                    after_id: cursor.clone(),
                    message: e.to_string(),
                })?;

            let Some(last) = page.last() else {
                break;
            };
            let next_cursor = last.id.clone();
            let more = page.len() >= page_size;
            report.scanned += page.len();

            let mut writes = Vec::new();
            for record in &page {
                match plan(record) {
                    Plan::Ignore => {}
                    Plan::Unchanged => {
                        report.matched += 1;
                        report.skipped += 1;
                    }
                    Plan::Write(tags) => {
                        report.matched += 1;
                        writes.push((record.id.clone(), tags));
                    }
                }
            }

            let results: Vec<(String, Result<(), StoreError>)> = stream::iter(writes)
                .map(|(id, tags)| self.apply(id, tags))
                .buffer_unordered(max_concurrent)
                .collect()
                .await;

            for (id, result) in results {
                match result {
                    Ok(()) => report.updated += 1,
                    Err(e) => {
                        tracing::warn!(id = %id, error = %e, "Failed to update listing, continuing");
                        report.failed += 1;
                        report.failures.push(RecordFailure {
                            id,
                            error: e.to_string(),
                        });
                    }
                }
            }

            tracing::debug!(
                after_id = ?cursor,
                records = page.len(),
                scanned = report.scanned,
                "Processed page"
            );

            if !more {
                break;
            }
            cursor = Some(next_cursor);
        }

        report.failures.sort_by(|a, b| a.id.cmp(&b.id));
        report.finished_at = self.clock.now();

        tracing::info!(
            run_id = %report.run_id,
            scanned = report.scanned,
            matched = report.matched,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            "Migration finished"
        );

        Ok(report)
    }

    async fn apply(&self, id: String, tags: Vec<String>) -> (String, Result<(), StoreError>) {
        if self.config.dry_run {
            tracing::info!(id = %id, tags = ?tags, "[DRY RUN] Would update tags");
            return (id, Ok(()));
        }
        let result = self.store.update_tags(&id, &tags).await;
        (id, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::OffsetDateTime;

    struct FakeStore {
        records: Mutex<BTreeMap<String, ListingRecord>>,
        failing_updates: BTreeSet<String>,
        fail_fetch_after: Option<usize>,
        fetches: AtomicUsize,
        writes: AtomicUsize,
    }

    impl FakeStore {
        fn new(records: Vec<ListingRecord>) -> Self {
            Self {
                records: Mutex::new(records.into_iter().map(|r| (r.id.clone(), r)).collect()),
                failing_updates: BTreeSet::new(),
                fail_fetch_after: None,
                fetches: AtomicUsize::new(0),
                writes: AtomicUsize::new(0),
            }
        }

        fn tags(&self, id: &str) -> Vec<String> {
            self.records.lock().unwrap()[id].tags.clone()
        }
    }

    #[async_trait]
    impl ListingStore for FakeStore {
        async fn fetch_page(
            &self,
            after_id: Option<&str>,
            limit: usize,
        ) -> Result<Vec<ListingRecord>, StoreError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch_after.is_some_and(|after| n >= after) {
                return Err(StoreError::Database("connection reset".to_string()));
            }
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|r| after_id.is_none_or(|after| r.id.as_str() > after))
                .take(limit)
                .cloned()
                .collect())
        }

        async fn get(&self, id: &str) -> Result<Option<ListingRecord>, StoreError> {
            Ok(self.records.lock().unwrap().get(id).cloned())
        }

        async fn upsert(&self, record: &ListingRecord) -> Result<(), StoreError> {
            self.records
                .lock()
                .unwrap()
                .insert(record.id.clone(), record.clone());
            Ok(())
        }

        async fn update_tags(&self, id: &str, tags: &[String]) -> Result<(), StoreError> {
            if self.failing_updates.contains(id) {
                return Err(StoreError::Database("disk full".to_string()));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            match self.records.lock().unwrap().get_mut(id) {
                Some(record) => {
                    record.tags = tags.to_vec();
                    Ok(())
                }
                None => Err(StoreError::NotFound(id.to_string())),
            }
        }
    }

    struct FakeClock {
        time: OffsetDateTime,
    }

    impl Clock for FakeClock {
        fn now(&self) -> OffsetDateTime {
            self.time
        }
    }

    fn record(id: &str, title: &str, features: &[&str]) -> ListingRecord {
        ListingRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            city: Some("Tampa".to_string()),
            price: Some(350_000.0),
            bedrooms: Some(2),
            listing_type: None,
            tags: vec!["#Stale".to_string()],
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn listings() -> Vec<ListingRecord> {
        vec![
            record("l1", "Waterfront home with dock", &["paid_open_house"]),
            record("l2", "Cozy starter home", &[]),
            record("l3", "Historic home in the historic district", &["paid_open_house"]),
            record("l4", "Plain listing", &[]),
            record("l5", "Heated pool and golf", &[]),
        ]
    }

    fn jobs(store: Arc<FakeStore>, config: MigrationConfig) -> MigrationJobs<FakeStore, FakeClock> {
        let clock = Arc::new(FakeClock {
            time: OffsetDateTime::UNIX_EPOCH,
        });
        MigrationJobs::new(store, clock, &Rulebook::builtin(), config)
    }

    fn small_pages() -> MigrationConfig {
        MigrationConfig {
            page_size: 2,
            max_concurrent: 2,
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn test_regenerate_tags_rewrites_every_record() {
        let store = Arc::new(FakeStore::new(listings()));
        let report = jobs(Arc::clone(&store), small_pages())
            .regenerate_tags()
            .await
            .unwrap();

        assert_eq!(report.job, MigrationJob::RegenerateTags);
        assert_eq!(report.scanned, 5);
        assert_eq!(report.matched, 5);
        assert_eq!(report.updated, 5);
        assert_eq!(report.failed, 0);
        assert_eq!(report.rulebook_hash, Rulebook::builtin().fingerprint());
        assert_eq!(report.started_at, OffsetDateTime::UNIX_EPOCH);

        let tags = store.tags("l1");
        assert_eq!(tags[0], "#Tampa");
        assert_eq!(tags[1], "#Under400K");
        assert!(tags.contains(&"#Waterfront".to_string()));
        assert!(!tags.contains(&"#Stale".to_string()));
        assert_eq!(store.tags("l4"), vec!["#Tampa".to_string(), "#Under400K".to_string()]);
    }

    #[tokio::test]
    async fn test_regenerate_tags_is_idempotent() {
        let store = Arc::new(FakeStore::new(listings()));
        let jobs = jobs(Arc::clone(&store), small_pages());

        jobs.regenerate_tags().await.unwrap();
        let first: Vec<_> = ["l1", "l2", "l3", "l4", "l5"].iter().map(|id| store.tags(id)).collect();

        let report = jobs.regenerate_tags().await.unwrap();
        let second: Vec<_> = ["l1", "l2", "l3", "l4", "l5"].iter().map(|id| store.tags(id)).collect();

        assert_eq!(first, second);
        assert_eq!(report.updated, 0);
        assert_eq!(report.skipped, 5);
    }

    #[tokio::test]
    async fn test_record_failure_does_not_abort_run() {
        let mut store = FakeStore::new(listings());
        store.failing_updates.insert("l2".to_string());
        let store = Arc::new(store);

        let report = jobs(Arc::clone(&store), small_pages())
            .regenerate_tags()
            .await
            .unwrap();

        assert_eq!(report.scanned, 5);
        assert_eq!(report.updated, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].id, "l2");
        assert!(report.failures[0].error.contains("disk full"));
        assert_eq!(store.tags("l2"), vec!["#Stale".to_string()]);
        assert!(!store.tags("l5").contains(&"#Stale".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_run() {
        let mut store = FakeStore::new(listings());
        store.fail_fetch_after = Some(1);
        let store = Arc::new(store);

        let result = jobs(Arc::clone(&store), small_pages()).regenerate_tags().await;
        match result {
            Err(MigrationError::Fetch { after_id, .. }) => {
                assert_eq!(after_id.as_deref(), Some("l2"));
            }
            other => panic!("expected fetch error, got {:?}", other.map(|r| r.scanned)),
        }
        // the first page was still written
        assert!(!store.tags("l1").contains(&"#Stale".to_string()));
    }

    #[tokio::test]
    async fn test_patch_tag_targets_feature_and_is_idempotent() {
        let mut records = listings();
        records[2].tags.push("#OpenHouse".to_string());
        let store = Arc::new(FakeStore::new(records));
        let jobs = jobs(Arc::clone(&store), small_pages());

        let report = jobs
            .patch_tag("#OpenHouse", |r| r.has_feature("paid_open_house"))
            .await
            .unwrap();

        assert_eq!(report.scanned, 5);
        assert_eq!(report.matched, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            store.tags("l1"),
            vec!["#Stale".to_string(), "#OpenHouse".to_string()]
        );
        assert_eq!(store.tags("l2"), vec!["#Stale".to_string()]);

        let again = jobs
            .patch_tag("#OpenHouse", |r| r.has_feature("paid_open_house"))
            .await
            .unwrap();
        assert_eq!(again.updated, 0);
        assert_eq!(again.skipped, 2);
        assert_eq!(
            store.tags("l1"),
            vec!["#Stale".to_string(), "#OpenHouse".to_string()]
        );
    }

    #[tokio::test]
    async fn test_patch_tag_rejects_malformed_tag() {
        let store = Arc::new(FakeStore::new(listings()));
        let jobs = jobs(store, MigrationConfig::default());
        for tag in ["OpenHouse", "#", "#Open House", ""] {
            let result = jobs.patch_tag(tag, |_| true).await;
            assert!(matches!(result, Err(MigrationError::InvalidTag(_))), "tag {:?}", tag);
        }
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let store = Arc::new(FakeStore::new(listings()));
        let config = MigrationConfig {
            dry_run: true,
            ..small_pages()
        };

        let report = jobs(Arc::clone(&store), config).regenerate_tags().await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.updated, 5);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(store.tags("l1"), vec!["#Stale".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_report() {
        let store = Arc::new(FakeStore::new(vec![]));
        let report = jobs(Arc::clone(&store), MigrationConfig::default())
            .regenerate_tags()
            .await
            .unwrap();
        assert_eq!(report.scanned, 0);
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }
}
