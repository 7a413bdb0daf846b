//! Record Normalizer
//!
//! Turns one raw wire record into an [`EntityPatch`], reading the wire field
//! names integrators send and checking that every referenced row exists.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::{
    domain::catalog::{
        data::{
            AttributeNamePatch, AttributePatch, AttributeValuePatch, CatalogPatch, EntityPatch,
            ImagePatch, ProductAttributePatch, ProductImagePatch, ProductPatch,
        },
        errors::RecordError,
        fields::{
            FieldErrors, Fields, blank_text, boolean, integer, pk, pk_list, price, text, timestamp,
            type_name, url,
        },
        registry::EntityKind,
        repository::CatalogRepository,
    },
    ids::TypedId,
};

const NAME_MAX_CHARS: usize = 256;
const DESCRIPTION_MAX_CHARS: usize = 1000;
const CURRENCY_MAX_CHARS: usize = 3;

/// Normalizes a raw record of `kind` and validates its references.
///
/// # Errors
///
/// Returns [`RecordError::Invalid`] with per-field messages when the record is
/// malformed or points at rows that do not exist, and
/// [`RecordError::Storage`] when the existence check itself fails.
pub async fn normalize(
    repository: &dyn CatalogRepository,
    kind: EntityKind,
    raw: &Value,
) -> Result<EntityPatch, RecordError> {
    let Value::Object(fields) = raw else {
        return Err(FieldErrors::non_field(format!(
            "Invalid data. Expected a dictionary, but got {}.",
            type_name(raw)
        ))
        .into());
    };

    let patch = parse(kind, fields)?;

    check_references(repository, &patch).await?;

    Ok(patch)
}

/// Shape-only pass: field presence, types and limits.
pub(crate) fn parse(kind: EntityKind, raw: &Map<String, Value>) -> Result<EntityPatch, FieldErrors> {
    match kind {
        EntityKind::AttributeName => attribute_name(raw).map(EntityPatch::AttributeName),
        EntityKind::AttributeValue => attribute_value(raw).map(EntityPatch::AttributeValue),
        EntityKind::Attribute => attribute(raw).map(EntityPatch::Attribute),
        EntityKind::Product => product(raw).map(EntityPatch::Product),
        EntityKind::ProductAttribute => product_attribute(raw).map(EntityPatch::ProductAttribute),
        EntityKind::Image => image(raw).map(EntityPatch::Image),
        EntityKind::ProductImage => product_image(raw).map(EntityPatch::ProductImage),
        EntityKind::Catalog => catalog(raw).map(EntityPatch::Catalog),
    }
}

async fn check_references(
    repository: &dyn CatalogRepository,
    patch: &EntityPatch,
) -> Result<(), RecordError> {
    let mut errors = FieldErrors::new();

    for reference in patch.references() {
        if reference.ids.is_empty() {
            continue;
        }

        let existing = repository
            .existing_ids(reference.kind, reference.ids.clone())
            .await?;

        for id in reference.ids.iter().filter(|id| !existing.contains(id)) {
            errors.add(
                reference.field,
                format!("Invalid pk \"{id}\" - object does not exist."),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

fn ids<T>(values: Vec<i64>) -> BTreeSet<TypedId<T>> {
    values.into_iter().map(TypedId::new).collect()
}

fn attribute_name(raw: &Map<String, Value>) -> Result<AttributeNamePatch, FieldErrors> {
    let mut fields = Fields::new(raw);

    let id = fields.required("id", integer);
    let name = fields.required("nazev", text(NAME_MAX_CHARS));
    let display = fields.optional("zobrazit", boolean);
    let code = fields.nullable("kod", text(NAME_MAX_CHARS));

    match (id, name, fields.into_errors()) {
        (Some(id), Some(name), errors) if errors.is_empty() => Ok(AttributeNamePatch {
            id: id.into(),
            name,
            display,
            code,
        }),
        (_, _, errors) => Err(errors),
    }
}

fn attribute_value(raw: &Map<String, Value>) -> Result<AttributeValuePatch, FieldErrors> {
    let mut fields = Fields::new(raw);

    let id = fields.required("id", integer);
    let value = fields.required("hodnota", text(NAME_MAX_CHARS));

    match (id, value, fields.into_errors()) {
        (Some(id), Some(value), errors) if errors.is_empty() => Ok(AttributeValuePatch {
            id: id.into(),
            value,
        }),
        (_, _, errors) => Err(errors),
    }
}

fn attribute(raw: &Map<String, Value>) -> Result<AttributePatch, FieldErrors> {
    let mut fields = Fields::new(raw);

    let id = fields.required("id", integer);
    let attribute_name = fields.required("nazev_atributu_id", pk);
    let attribute_value = fields.required("hodnota_atributu_id", pk);

    match (id, attribute_name, attribute_value, fields.into_errors()) {
        (Some(id), Some(attribute_name), Some(attribute_value), errors) if errors.is_empty() => {
            Ok(AttributePatch {
                id: id.into(),
                attribute_name: attribute_name.into(),
                attribute_value: attribute_value.into(),
            })
        }
        (_, _, _, errors) => Err(errors),
    }
}

fn product(raw: &Map<String, Value>) -> Result<ProductPatch, FieldErrors> {
    let mut fields = Fields::new(raw);

    let id = fields.required("id", integer);
    let name = fields.optional("nazev", text(NAME_MAX_CHARS));
    let description = fields.optional("description", blank_text(DESCRIPTION_MAX_CHARS));
    let price = fields.optional("cena", price);
    let currency = fields.required("mena", text(CURRENCY_MAX_CHARS));
    let published_on = fields.nullable("published_on", timestamp);
    let is_published = fields.optional("is_published", boolean);

    match (id, currency, fields.into_errors()) {
        (Some(id), Some(currency), errors) if errors.is_empty() => Ok(ProductPatch {
            id: id.into(),
            name,
            description,
            price,
            currency,
            published_on,
            is_published,
        }),
        (_, _, errors) => Err(errors),
    }
}

fn product_attribute(raw: &Map<String, Value>) -> Result<ProductAttributePatch, FieldErrors> {
    let mut fields = Fields::new(raw);

    let id = fields.required("id", integer);
    let attribute = fields.required("attribute", pk);
    let product = fields.required("product", pk);

    match (id, attribute, product, fields.into_errors()) {
        (Some(id), Some(attribute), Some(product), errors) if errors.is_empty() => {
            Ok(ProductAttributePatch {
                id: id.into(),
                attribute: attribute.into(),
                product: product.into(),
            })
        }
        (_, _, _, errors) => Err(errors),
    }
}

fn image(raw: &Map<String, Value>) -> Result<ImagePatch, FieldErrors> {
    let mut fields = Fields::new(raw);

    let id = fields.required("id", integer);
    let name = fields.optional("nazev", blank_text(NAME_MAX_CHARS));
    let url = fields.required("obrazek", url);

    match (id, url, fields.into_errors()) {
        (Some(id), Some(url), errors) if errors.is_empty() => Ok(ImagePatch {
            id: id.into(),
            name,
            url,
        }),
        (_, _, errors) => Err(errors),
    }
}

fn product_image(raw: &Map<String, Value>) -> Result<ProductImagePatch, FieldErrors> {
    let mut fields = Fields::new(raw);

    let id = fields.required("id", integer);
    let name = fields.optional("nazev", blank_text(NAME_MAX_CHARS));
    let product = fields.required("product", pk);
    let image = fields.required("obrazek_id", pk);

    match (id, product, image, fields.into_errors()) {
        (Some(id), Some(product), Some(image), errors) if errors.is_empty() => {
            Ok(ProductImagePatch {
                id: id.into(),
                name,
                product: product.into(),
                image: image.into(),
            })
        }
        (_, _, _, errors) => Err(errors),
    }
}

fn catalog(raw: &Map<String, Value>) -> Result<CatalogPatch, FieldErrors> {
    let mut fields = Fields::new(raw);

    let id = fields.required("id", integer);
    let name = fields.optional("nazev", text(NAME_MAX_CHARS));
    let image = fields.nullable("obrazek_id", pk);
    let products = fields.optional("products_ids", pk_list);
    let attributes = fields.optional("attributes_ids", pk_list);

    match (id, fields.into_errors()) {
        (Some(id), errors) if errors.is_empty() => Ok(CatalogPatch {
            id: id.into(),
            name,
            image: image.map(|image| image.map(TypedId::new)),
            products: products.map(ids),
            attributes: attributes.map(ids),
        }),
        (_, errors) => Err(errors),
    }
}
