//! listing-guard domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `text`: Normalization and evasion-resistant term matching
//! - `moderation`: Tri-state verdicts for listing text
//! - `image`: Upload size, format and dimension checks
//! - `tagging`: Data-driven discovery tag rules
//! - `keywords`: Search term to tag reverse index
//! - `rulebook`: The rule tables every engine is built from
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Application use cases / business logic

pub mod image;
pub mod keywords;
pub mod model;
pub mod moderation;
pub mod ports;
pub mod rulebook;
pub mod tagging;
pub mod text;
pub mod usecases;

pub use image::{ImageError, ImageInfo, ImageLimits, ImageValidator};
pub use keywords::KeywordIndex;
pub use model::*;
pub use moderation::{ModerationEngine, ModerationVocabulary};
pub use ports::*;
pub use rulebook::Rulebook;
pub use tagging::{TagEngine, TaggingRules};
