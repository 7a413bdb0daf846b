//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::catalog::{
        CatalogService, DefaultCatalogService,
        repository::{MemoryCatalogRepository, PgCatalogRepository},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or applying
    /// migrations fails.
    pub async fn from_database_url(url: &str, run_migrations: bool) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;
        }

        let repository = PgCatalogRepository::new(Db::new(pool));

        Ok(Self {
            catalog: Arc::new(DefaultCatalogService::new(Arc::new(repository))),
        })
    }

    /// Build application context over a process-local store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            catalog: Arc::new(DefaultCatalogService::new(Arc::new(
                MemoryCatalogRepository::new(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::domain::catalog::ImportOutcome;

    use super::*;

    #[tokio::test]
    async fn in_memory_context_imports_and_reads_back() -> TestResult {
        let ctx = AppContext::in_memory();

        let outcome = ctx
            .catalog
            .import_batch(json!([{ "Image": { "id": 1, "obrazek": "https://cdn.test/a.png" } }]))
            .await;

        assert!(matches!(outcome, ImportOutcome::Received(_)));

        let image = ctx.catalog.get_entity("Image".to_string(), 1).await?;

        assert_eq!(
            image.to_wire(),
            json!({ "id": 1, "nazev": "", "obrazek": "https://cdn.test/a.png" })
        );

        Ok(())
    }
}
