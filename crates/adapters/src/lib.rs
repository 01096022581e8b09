//! listing-guard adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `rulebook`: TOML rulebook loader
//! - `store`: SQLite and in-memory listing stores

mod rulebook_fs;
mod store_memory;
mod store_sqlite;

/// Re-exports for rulebook adapters
pub mod rulebook {
    pub use crate::rulebook_fs::{FsRulebookRepo, parse_rulebook, render_rulebook};
}

/// Re-exports for listing store adapters
pub mod store {
    pub use crate::store_memory::InMemoryListingStore;
    pub use crate::store_sqlite::SqliteListingStore;
}
