//! Catalog service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

use crate::domain::catalog::{
    errors::CatalogServiceError,
    import::{self, ImportOutcome},
    records::EntityRecord,
    registry::EntityKind,
    repository::CatalogRepository,
};

#[derive(Clone)]
pub struct DefaultCatalogService {
    repository: Arc<dyn CatalogRepository>,
}

impl DefaultCatalogService {
    #[must_use]
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }
}

impl Debug for DefaultCatalogService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DefaultCatalogService").finish_non_exhaustive()
    }
}

fn resolve(entity: &str) -> Result<EntityKind, CatalogServiceError> {
    EntityKind::resolve(entity)
        .ok_or_else(|| CatalogServiceError::UnknownEntity(entity.to_string()))
}

#[async_trait]
impl CatalogService for DefaultCatalogService {
    async fn import_batch(&self, payload: Value) -> ImportOutcome {
        import::import_batch(self.repository.as_ref(), payload).await
    }

    async fn list_entities(
        &self,
        entity: String,
    ) -> Result<Vec<EntityRecord>, CatalogServiceError> {
        let kind = resolve(&entity)?;

        Ok(self.repository.list(kind).await?)
    }

    async fn get_entity(
        &self,
        entity: String,
        id: i64,
    ) -> Result<EntityRecord, CatalogServiceError> {
        let kind = resolve(&entity)?;

        self.repository
            .find(kind, id)
            .await?
            .ok_or(CatalogServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Imports a batch payload, sorting each record into a result bucket.
    async fn import_batch(&self, payload: Value) -> ImportOutcome;

    /// Retrieves every entity of the named type, ordered by id.
    async fn list_entities(
        &self,
        entity: String,
    ) -> Result<Vec<EntityRecord>, CatalogServiceError>;

    /// Retrieves a single entity of the named type.
    async fn get_entity(
        &self,
        entity: String,
        id: i64,
    ) -> Result<EntityRecord, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::test::{TestContext, seed_batch};

    use super::*;

    #[tokio::test]
    async fn list_entities_resolves_names_case_insensitively() -> TestResult {
        let ctx = TestContext::new();

        ctx.catalog.import_batch(seed_batch()).await;

        let images = ctx.catalog.list_entities("image".to_string()).await?;

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].kind(), EntityKind::Image);

        Ok(())
    }

    #[tokio::test]
    async fn list_entities_is_ordered_by_id() -> TestResult {
        let ctx = TestContext::new();

        ctx.catalog
            .import_batch(json!([
                { "AttributeValue": { "id": 3, "hodnota": "blue" } },
                { "AttributeValue": { "id": 1, "hodnota": "red" } },
                { "AttributeValue": { "id": 2, "hodnota": "green" } },
            ]))
            .await;

        let ids: Vec<i64> = ctx
            .catalog
            .list_entities("AttributeValue".to_string())
            .await?
            .iter()
            .map(EntityRecord::id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_entity_type_is_rejected() {
        let ctx = TestContext::new();

        let result = ctx.catalog.list_entities("Stock".to_string()).await;

        assert!(
            matches!(result, Err(CatalogServiceError::UnknownEntity(ref name)) if name == "Stock"),
            "expected unknown entity, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_entity_returns_the_stored_record() -> TestResult {
        let ctx = TestContext::new();

        ctx.catalog.import_batch(seed_batch()).await;

        let record = ctx
            .catalog
            .get_entity("productattributes".to_string(), 1)
            .await?;

        assert_eq!(record.kind(), EntityKind::ProductAttribute);
        assert_eq!(record.to_wire(), json!({ "id": 1, "attribute": 1, "product": 1 }));

        Ok(())
    }

    #[tokio::test]
    async fn get_entity_with_unknown_id_is_not_found() {
        let ctx = TestContext::new();

        let result = ctx.catalog.get_entity("Product".to_string(), 42).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected not found, got {result:?}"
        );
    }
}
