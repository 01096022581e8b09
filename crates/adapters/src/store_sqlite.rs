//! SQLite listing store implementation

use async_trait::async_trait;
use listing_guard_domain::{ListingRecord, ListingStore, StoreError};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use time::OffsetDateTime;

type ListingRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<f64>,
    Option<i64>,
    Option<String>,
    String,
    String,
);

const SELECT_LISTING: &str = r#"
    SELECT id, title, description, city, price, bedrooms, listing_type, tags, features
    FROM listings
"#;

/// SQLite-backed listing store
pub struct SqliteListingStore {
    pool: SqlitePool,
}

impl SqliteListingStore {
    /// Open (or create) the store at `db_path`, initializing the schema if needed
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("Failed to create directory: {}", e)))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Number of stored listings
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(count.0)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                city TEXT,
                price REAL,
                bedrooms INTEGER,
                listing_type TEXT,
                tags TEXT NOT NULL DEFAULT '[]',
                features TEXT NOT NULL DEFAULT '[]',
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn now_str() -> Result<String, StoreError> {
        OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

fn to_json(values: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(values).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_row(row: ListingRow) -> Result<ListingRecord, StoreError> {
    let (id, title, description, city, price, bedrooms, listing_type, tags, features) = row;

    let bedrooms = bedrooms
        .map(u32::try_from)
        .transpose()
        .map_err(|e| StoreError::Serialization(format!("bedrooms for {}: {}", id, e)))?;
    let tags: Vec<String> = serde_json::from_str(&tags)
        .map_err(|e| StoreError::Serialization(format!("tags for {}: {}", id, e)))?;
    let features: Vec<String> = serde_json::from_str(&features)
        .map_err(|e| StoreError::Serialization(format!("features for {}: {}", id, e)))?;

    Ok(ListingRecord {
        id,
        title,
        description,
        city,
        price,
        bedrooms,
        listing_type,
        tags,
        features,
    })
}

#[async_trait]
impl ListingStore for SqliteListingStore {
    async fn fetch_page(
        &self,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ListingRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<ListingRow> = match after_id {
            Some(after) => {
                let sql = format!("{} WHERE id > ? ORDER BY id LIMIT ?", SELECT_LISTING);
                sqlx::query_as::<_, ListingRow>(&sql)
                    .bind(after)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("{} ORDER BY id LIMIT ?", SELECT_LISTING);
                sqlx::query_as::<_, ListingRow>(&sql)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(from_row).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<ListingRecord>, StoreError> {
        let sql = format!("{} WHERE id = ?", SELECT_LISTING);
        let row: Option<ListingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(from_row).transpose()
    }

    async fn upsert(&self, record: &ListingRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO listings
            (id, title, description, city, price, bedrooms, listing_type, tags, features, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                city = excluded.city,
                price = excluded.price,
                bedrooms = excluded.bedrooms,
                listing_type = excluded.listing_type,
                tags = excluded.tags,
                features = excluded.features,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.city)
        .bind(record.price)
        .bind(record.bedrooms.map(i64::from))
        .bind(&record.listing_type)
        .bind(to_json(&record.tags)?)
        .bind(to_json(&record.features)?)
        .bind(Self::now_str()?)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn update_tags(&self, id: &str, tags: &[String]) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE listings SET tags = ?, updated_at = ? WHERE id = ?")
            .bind(to_json(tags)?)
            .bind(Self::now_str()?)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
