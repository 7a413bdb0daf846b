//! Batch Import
//!
//! Walks a batch of `{ "<Kind>": { ...record... } }` elements and sorts every
//! record into one of three buckets. Records are independent: one failing
//! record never aborts the rest of the batch.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::catalog::{
    errors::RecordError,
    normalize::normalize,
    registry::EntityKind,
    repository::CatalogRepository,
    upsert::{Upserted, upsert},
};

/// Key under which a rejected record carries its error.
pub const ERROR_KEY: &str = "error";

/// Per-bucket results of one batch, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub created_or_updated: Vec<Value>,
    pub invalid_data: Vec<Value>,
    pub unknown_models: Vec<Value>,
}

impl ImportReport {
    /// Total number of entries across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.created_or_updated.len() + self.invalid_data.len() + self.unknown_models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// The payload carried nothing to import.
    NoData,
    Received(ImportReport),
}

/// Import every record in a batch payload.
pub async fn import_batch(repository: &dyn CatalogRepository, payload: Value) -> ImportOutcome {
    let Some(elements) = batch_elements(payload) else {
        debug!("import payload carried no data");
        return ImportOutcome::NoData;
    };

    let mut report = ImportReport::default();

    for element in elements {
        import_element(repository, element, &mut report).await;
    }

    info!(
        created_or_updated = report.created_or_updated.len(),
        invalid_data = report.invalid_data.len(),
        unknown_models = report.unknown_models.len(),
        "processed import batch"
    );

    ImportOutcome::Received(report)
}

/// Normalize and upsert a single raw record.
///
/// # Errors
///
/// Returns [`RecordError`] when the record fails validation or storage.
pub async fn import_record(
    repository: &dyn CatalogRepository,
    kind: EntityKind,
    raw: &Value,
) -> Result<Upserted, RecordError> {
    let patch = normalize(repository, kind, raw).await?;

    upsert(repository, &patch).await
}

/// Falsy payloads carry no data; any other non-list payload is one element.
fn batch_elements(payload: Value) -> Option<Vec<Value>> {
    match payload {
        Value::Null | Value::Bool(false) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        Value::String(text) if text.is_empty() => None,
        Value::Number(number)
            if number
                .as_f64()
                .is_some_and(|value| value.abs() < f64::EPSILON) =>
        {
            None
        }
        Value::Array(items) => Some(items),
        other => Some(vec![other]),
    }
}

async fn import_element(
    repository: &dyn CatalogRepository,
    element: Value,
    report: &mut ImportReport,
) {
    let mut object = match element {
        Value::Object(object) if !object.is_empty() => object,
        other => {
            debug!("import element is not a keyed record");
            report.unknown_models.push(other);
            return;
        }
    };

    let keys: Vec<String> = object.keys().cloned().collect();

    for key in keys {
        let Some(kind) = EntityKind::from_import_key(&key) else {
            debug!(%key, "unknown entity type in import");
            report.unknown_models.push(Value::Object(object.clone()));
            continue;
        };

        let raw = object.get(&key).cloned().unwrap_or(Value::Null);

        match import_record(repository, kind, &raw).await {
            Ok(upserted) => {
                debug!(
                    %kind,
                    id = upserted.record.id(),
                    outcome = ?upserted.outcome,
                    "imported record"
                );
                object.insert(key, upserted.record.to_wire());
                report.created_or_updated.push(Value::Object(object.clone()));
            }
            Err(error) => {
                warn!(%kind, %error, "rejected import record");
                attach_error(&mut object, &key, &error);
                report.invalid_data.push(Value::Object(object.clone()));
            }
        }
    }
}

fn error_payload(error: &RecordError) -> Value {
    match error {
        RecordError::Invalid(errors) => errors.to_json(),
        RecordError::Storage(error) => Value::String(error.to_string()),
    }
}

/// The error goes inside the record object when there is one, else beside it.
fn attach_error(object: &mut Map<String, Value>, key: &str, error: &RecordError) {
    let payload = error_payload(error);

    match object.get_mut(key) {
        Some(Value::Object(fields)) => {
            fields.insert(ERROR_KEY.to_string(), payload);
        }
        _ => {
            object.insert(ERROR_KEY.to_string(), payload);
        }
    }
}
