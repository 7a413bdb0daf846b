//! Catalog Errors

use salvo::prelude::*;
use serde_json::{Value, json};
use tracing::error;

use eshop_app::domain::catalog::CatalogServiceError;

/// Render a 404 with a JSON body.
pub(crate) fn render_not_found(res: &mut Response, body: Value) {
    res.status_code(StatusCode::NOT_FOUND);
    res.render(Json(body));
}

/// Render a detail lookup failure; storage faults escalate to a 500.
pub(crate) fn render_service_error(
    res: &mut Response,
    error: CatalogServiceError,
) -> Result<(), StatusError> {
    match error {
        CatalogServiceError::UnknownEntity(name) => {
            render_not_found(
                res,
                json!({ "error": format!("No model with name '{name}' was found") }),
            );

            Ok(())
        }
        CatalogServiceError::NotFound => {
            render_not_found(res, json!({ "detail": "Not found." }));

            Ok(())
        }
        CatalogServiceError::Storage(source) => {
            error!("failed to read catalog: {source}");

            Err(StatusError::internal_server_error())
        }
    }
}
