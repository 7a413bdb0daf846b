//! Catalog

pub mod data;
pub mod errors;
pub mod fields;
pub mod import;
pub mod normalize;
pub mod records;
pub mod registry;
pub mod repository;
mod serialize;
pub mod service;
pub mod upsert;

pub use errors::{CatalogServiceError, RecordError, StorageError};
pub use import::{ImportOutcome, ImportReport};
pub use registry::EntityKind;
pub use service::*;
