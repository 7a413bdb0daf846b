//! Detail Index Handler

use std::sync::Arc;

use salvo::prelude::*;
use serde_json::{Value, json};

use eshop_app::domain::catalog::records::EntityRecord;

use crate::{
    catalog::errors::{render_not_found, render_service_error},
    extensions::*,
    state::State,
};

/// Detail Index Handler
///
/// Returns every entity of the named type, ordered by id.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let entity = req.param::<String>("entity").unwrap_or_default();

    let records = match state.app.catalog.list_entities(entity.clone()).await {
        Ok(records) => records,
        Err(error) => return render_service_error(res, error),
    };

    if records.is_empty() {
        render_not_found(
            res,
            json!({ "result": format!("No objects of the '{entity}' model found") }),
        );

        return Ok(());
    }

    let body: Vec<Value> = records.iter().map(EntityRecord::to_wire).collect();

    res.render(Json(body));

    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use eshop_app::domain::catalog::{CatalogServiceError, MockCatalogService, StorageError};

    use crate::test_helpers::catalog_service;

    use super::{super::tests::*, *};

    fn make_service(catalog: MockCatalogService) -> Service {
        catalog_service(catalog, Router::with_path("detail/{entity}").get(handler))
    }

    #[tokio::test]
    async fn test_index_returns_serialized_records() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_list_entities()
            .withf(|entity| entity == "attributevalue")
            .once()
            .return_once(|_| {
                Ok(vec![
                    make_attribute_value(1, "red"),
                    make_attribute_value(2, "blue"),
                ])
            });

        let mut res = TestClient::get("http://example.com/detail/attributevalue/")
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(
            body,
            json!([{ "id": 1, "hodnota": "red" }, { "id": 2, "hodnota": "blue" }])
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_index_empty_collection_returns_404() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_list_entities()
            .once()
            .return_once(|_| Ok(vec![]));

        let mut res = TestClient::get("http://example.com/detail/Product/")
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        let body: Value = res.take_json().await?;

        assert_eq!(
            body,
            json!({ "result": "No objects of the 'Product' model found" })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_index_unknown_entity_returns_404() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_list_entities()
            .once()
            .return_once(|entity| Err(CatalogServiceError::UnknownEntity(entity)));

        let mut res = TestClient::get("http://example.com/detail/stock/")
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        let body: Value = res.take_json().await?;

        assert_eq!(body, json!({ "error": "No model with name 'stock' was found" }));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_storage_error_returns_500() {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_list_entities()
            .once()
            .return_once(|_| Err(CatalogServiceError::Storage(StorageError::InvalidData)));

        let res = TestClient::get("http://example.com/detail/image/")
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
