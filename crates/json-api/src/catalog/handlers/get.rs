//! Detail Get Handler

use std::sync::Arc;

use salvo::prelude::*;

use eshop_app::domain::catalog::CatalogServiceError;

use crate::{catalog::errors::render_service_error, extensions::*, state::State};

/// Detail Get Handler
///
/// Returns a single entity of the named type.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let entity = req.param::<String>("entity").unwrap_or_default();

    // Ids beyond the i64 range cannot exist
    let Some(id) = req.param::<i64>("id") else {
        return render_service_error(res, CatalogServiceError::NotFound);
    };

    match state.app.catalog.get_entity(entity, id).await {
        Ok(record) => {
            res.render(Json(record.to_wire()));

            Ok(())
        }
        Err(error) => render_service_error(res, error),
    }
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use eshop_app::domain::catalog::{MockCatalogService, StorageError};

    use crate::test_helpers::catalog_service;

    use super::{super::tests::*, *};

    fn make_service(catalog: MockCatalogService) -> Service {
        catalog_service(
            catalog,
            Router::with_path("detail/{entity}/{id:num}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_returns_serialized_record() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_get_entity()
            .withf(|entity, id| entity == "AttributeValue" && *id == 7)
            .once()
            .return_once(|_, _| Ok(make_attribute_value(7, "green")));

        let mut res = TestClient::get("http://example.com/detail/AttributeValue/7/")
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body, json!({ "id": 7, "hodnota": "green" }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_id_returns_404() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_get_entity()
            .once()
            .return_once(|_, _| Err(CatalogServiceError::NotFound));

        let mut res = TestClient::get("http://example.com/detail/product/99/")
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        let body: Value = res.take_json().await?;

        assert_eq!(body, json!({ "detail": "Not found." }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_entity_returns_404() {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_get_entity()
            .once()
            .return_once(|entity, _| Err(CatalogServiceError::UnknownEntity(entity)));

        let res = TestClient::get("http://example.com/detail/warehouse/1/")
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_get_out_of_range_id_returns_404() {
        let mut catalog = MockCatalogService::new();

        catalog.expect_get_entity().never();

        let res = TestClient::get("http://example.com/detail/product/99999999999999999999/")
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_get_storage_error_returns_500() {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_get_entity()
            .once()
            .return_once(|_, _| Err(CatalogServiceError::Storage(StorageError::MissingRequiredData)));

        let res = TestClient::get("http://example.com/detail/image/1/")
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
