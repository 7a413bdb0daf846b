//! In-memory catalog storage.
//!
//! Enforces the same primary key, unique and foreign key constraints as the
//! Postgres schema so both backends reject the same writes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::domain::catalog::{
    errors::StorageError, records::EntityRecord, registry::EntityKind,
    repository::CatalogRepository,
};

type Tables = FxHashMap<EntityKind, BTreeMap<i64, EntityRecord>>;

#[derive(Debug, Default)]
pub struct MemoryCatalogRepository {
    tables: RwLock<Tables>,
}

impl MemoryCatalogRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_constraints(tables: &Tables, record: &EntityRecord) -> Result<(), StorageError> {
    let kind = record.kind();

    for (target, id) in record.references() {
        if !tables.get(&target).is_some_and(|rows| rows.contains_key(&id)) {
            return Err(StorageError::InvalidReference(format!(
                "insert or update on table \"{}\" violates foreign key constraint: \
                 {target} {id} does not exist",
                kind.table()
            )));
        }
    }

    let Some(key) = record.unique_key() else {
        return Ok(());
    };

    let clash = tables
        .get(&kind)
        .into_iter()
        .flat_map(BTreeMap::values)
        .any(|other| other.id() != record.id() && other.unique_key().as_ref() == Some(&key));

    if clash {
        return Err(StorageError::Conflict(format!(
            "duplicate key value violates unique constraint \"{}_{}_key\"",
            kind.table(),
            key.column
        )));
    }

    Ok(())
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn find(&self, kind: EntityKind, id: i64) -> Result<Option<EntityRecord>, StorageError> {
        let tables = self.tables.read().await;

        Ok(tables.get(&kind).and_then(|rows| rows.get(&id)).cloned())
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<EntityRecord>, StorageError> {
        let tables = self.tables.read().await;

        Ok(tables
            .get(&kind)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn existing_ids(
        &self,
        kind: EntityKind,
        ids: Vec<i64>,
    ) -> Result<Vec<i64>, StorageError> {
        let tables = self.tables.read().await;

        let Some(rows) = tables.get(&kind) else {
            return Ok(Vec::new());
        };

        Ok(ids.into_iter().filter(|id| rows.contains_key(id)).collect())
    }

    async fn insert(&self, record: EntityRecord) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let kind = record.kind();

        if tables
            .get(&kind)
            .is_some_and(|rows| rows.contains_key(&record.id()))
        {
            return Err(StorageError::Conflict(format!(
                "duplicate key value violates unique constraint \"{}_pkey\"",
                kind.table()
            )));
        }

        check_constraints(&tables, &record)?;

        tables.entry(kind).or_default().insert(record.id(), record);

        Ok(())
    }

    async fn update(&self, record: EntityRecord) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        check_constraints(&tables, &record)?;

        if let Some(current) = tables
            .get_mut(&record.kind())
            .and_then(|rows| rows.get_mut(&record.id()))
        {
            *current = record;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::catalog::records::{
        AttributeId, AttributeNameId, AttributeNameRecord, AttributeRecord, AttributeValueId,
        ImageId, ImageRecord,
    };

    use super::*;

    fn image(id: i64, url: &str) -> EntityRecord {
        EntityRecord::Image(ImageRecord {
            id: ImageId::new(id),
            name: String::new(),
            url: url.to_string(),
        })
    }

    #[tokio::test]
    async fn insert_then_find_and_list() -> TestResult {
        let repository = MemoryCatalogRepository::new();

        repository.insert(image(2, "https://cdn.test/b.png")).await?;
        repository.insert(image(1, "https://cdn.test/a.png")).await?;

        assert_eq!(
            repository.find(EntityKind::Image, 1).await?,
            Some(image(1, "https://cdn.test/a.png"))
        );
        assert_eq!(repository.find(EntityKind::Product, 1).await?, None);

        let ids: Vec<i64> = repository
            .list(EntityKind::Image)
            .await?
            .iter()
            .map(EntityRecord::id)
            .collect();

        assert_eq!(ids, vec![1, 2]);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_unique_value_is_a_conflict() -> TestResult {
        let repository = MemoryCatalogRepository::new();

        repository.insert(image(1, "https://cdn.test/a.png")).await?;

        let result = repository.insert(image(2, "https://cdn.test/a.png")).await;

        assert!(
            matches!(result, Err(StorageError::Conflict(_))),
            "expected conflict, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn updating_a_record_keeps_its_own_unique_value() -> TestResult {
        let repository = MemoryCatalogRepository::new();

        repository.insert(image(1, "https://cdn.test/a.png")).await?;
        repository.update(image(1, "https://cdn.test/a.png")).await?;

        assert_eq!(repository.list(EntityKind::Image).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn dangling_reference_is_rejected() -> TestResult {
        let repository = MemoryCatalogRepository::new();

        repository
            .insert(EntityRecord::AttributeName(AttributeNameRecord {
                id: AttributeNameId::new(1),
                name: "Color".to_string(),
                display: false,
                code: None,
            }))
            .await?;

        let result = repository
            .insert(EntityRecord::Attribute(AttributeRecord {
                id: AttributeId::new(1),
                attribute_name: AttributeNameId::new(1),
                attribute_value: AttributeValueId::new(9),
            }))
            .await;

        assert!(
            matches!(result, Err(StorageError::InvalidReference(_))),
            "expected invalid reference, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn existing_ids_filters_unknown_ids() -> TestResult {
        let repository = MemoryCatalogRepository::new();

        repository.insert(image(1, "https://cdn.test/a.png")).await?;

        assert_eq!(
            repository
                .existing_ids(EntityKind::Image, vec![1, 2])
                .await?,
            vec![1]
        );
        assert!(
            repository
                .existing_ids(EntityKind::Catalog, vec![1])
                .await?
                .is_empty()
        );

        Ok(())
    }
}
