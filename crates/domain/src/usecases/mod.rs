//! Application use cases / business logic

pub mod migrate;
pub mod screen;

pub use migrate::{MigrationConfig, MigrationError, MigrationJobs};
pub use screen::ScreenListing;
