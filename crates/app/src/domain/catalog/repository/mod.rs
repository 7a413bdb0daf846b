//! Catalog Repository
//!
//! Storage operations keyed by [`EntityKind`]. Writes are whole records: the
//! upsert engine merges before it writes, so backends never see partial rows.

use async_trait::async_trait;
use mockall::automock;

use crate::domain::catalog::{errors::StorageError, records::EntityRecord, registry::EntityKind};

mod memory;
mod postgres;

pub use memory::MemoryCatalogRepository;
pub(crate) use postgres::PgCatalogRepository;

#[automock]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fetch one record by kind and id.
    async fn find(&self, kind: EntityKind, id: i64) -> Result<Option<EntityRecord>, StorageError>;

    /// Every record of a kind, ordered by id.
    async fn list(&self, kind: EntityKind) -> Result<Vec<EntityRecord>, StorageError>;

    /// The subset of `ids` that exist for `kind`.
    async fn existing_ids(&self, kind: EntityKind, ids: Vec<i64>)
    -> Result<Vec<i64>, StorageError>;

    async fn insert(&self, record: EntityRecord) -> Result<(), StorageError>;

    async fn update(&self, record: EntityRecord) -> Result<(), StorageError>;
}
