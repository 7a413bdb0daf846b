//! Import Handler

use std::sync::Arc;

use salvo::prelude::*;
use serde_json::{Value, json};
use tracing::warn;

use eshop_app::domain::catalog::ImportOutcome;

use crate::{extensions::*, observability::observe_import, state::State};

const NO_DATA: &str = "No data provided";

/// Import Handler
///
/// Upserts every record of a batch and reports which bucket each one landed in.
#[handler]
pub(crate) async fn handler(req: &mut Request, depot: &mut Depot) -> Result<Json<Value>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let payload = read_payload(req, state.import_max_body_bytes).await?;

    match state.app.catalog.import_batch(payload).await {
        ImportOutcome::NoData => Ok(Json(json!({ "result": NO_DATA }))),
        ImportOutcome::Received(report) => {
            observe_import(
                report.created_or_updated.len(),
                report.invalid_data.len(),
                report.unknown_models.len(),
            );

            Ok(Json(json!({ "received": report })))
        }
    }
}

/// An absent or blank body is an empty payload.
async fn read_payload(req: &mut Request, max_size: usize) -> Result<Value, StatusError> {
    let body = req.payload_with_max_size(max_size).await.map_err(|source| {
        warn!(max_size, "failed to read import body: {source}");

        StatusError::bad_request().brief("Unable to read request body")
    })?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(body).map_err(|source| {
        StatusError::bad_request().brief(format!("JSON parse error - {source}"))
    })
}
