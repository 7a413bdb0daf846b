//! Upsert Engine
//!
//! Creates a record when its id is new, merges supplied fields over the stored
//! record otherwise, and skips the write entirely when nothing changed.

use tracing::debug;

use crate::domain::catalog::{
    data::{
        AttributeNamePatch, AttributePatch, AttributeValuePatch, CatalogPatch, EntityPatch,
        ImagePatch, ProductAttributePatch, ProductImagePatch, ProductPatch,
    },
    errors::RecordError,
    fields::{FieldErrors, REQUIRED},
    records::{
        AttributeNameRecord, AttributeRecord, AttributeValueRecord, CatalogRecord, EntityRecord,
        ImageRecord, ProductAttributeRecord, ProductImageRecord, ProductRecord,
    },
    repository::CatalogRepository,
};

/// What an upsert did to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

/// The stored record after an upsert, and how it got there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub record: EntityRecord,
    pub outcome: UpsertOutcome,
}

impl Upserted {
    #[must_use]
    pub fn created(&self) -> bool {
        self.outcome == UpsertOutcome::Created
    }
}

/// Create or update the record a patch identifies.
///
/// # Errors
///
/// Returns [`RecordError::Invalid`] when a new record lacks a field that has no
/// default, and [`RecordError::Storage`] when the read or write fails.
pub async fn upsert(
    repository: &dyn CatalogRepository,
    patch: &EntityPatch,
) -> Result<Upserted, RecordError> {
    let current = repository.find(patch.kind(), patch.id()).await?;
    let merged = merge(patch, current.as_ref())?;

    let Some(current) = current else {
        repository.insert(merged.clone()).await?;

        debug!(kind = %patch.kind(), id = patch.id(), "created record");

        return Ok(Upserted {
            record: merged,
            outcome: UpsertOutcome::Created,
        });
    };

    if merged == current {
        debug!(kind = %patch.kind(), id = patch.id(), "record unchanged");

        return Ok(Upserted {
            record: current,
            outcome: UpsertOutcome::Unchanged,
        });
    }

    repository.update(merged.clone()).await?;

    debug!(kind = %patch.kind(), id = patch.id(), "updated record");

    Ok(Upserted {
        record: merged,
        outcome: UpsertOutcome::Updated,
    })
}

/// Overlay a patch onto the stored record of the same kind, or build a new one.
trait Merge {
    type Record;

    fn merge(&self, current: Option<&Self::Record>) -> Result<Self::Record, FieldErrors>;
}

fn merge(patch: &EntityPatch, current: Option<&EntityRecord>) -> Result<EntityRecord, FieldErrors> {
    let record = match (patch, current) {
        (EntityPatch::AttributeName(patch), Some(EntityRecord::AttributeName(current))) => {
            EntityRecord::AttributeName(patch.merge(Some(current))?)
        }
        (EntityPatch::AttributeName(patch), _) => EntityRecord::AttributeName(patch.merge(None)?),
        (EntityPatch::AttributeValue(patch), Some(EntityRecord::AttributeValue(current))) => {
            EntityRecord::AttributeValue(patch.merge(Some(current))?)
        }
        (EntityPatch::AttributeValue(patch), _) => EntityRecord::AttributeValue(patch.merge(None)?),
        (EntityPatch::Attribute(patch), Some(EntityRecord::Attribute(current))) => {
            EntityRecord::Attribute(patch.merge(Some(current))?)
        }
        (EntityPatch::Attribute(patch), _) => EntityRecord::Attribute(patch.merge(None)?),
        (EntityPatch::Product(patch), Some(EntityRecord::Product(current))) => {
            EntityRecord::Product(patch.merge(Some(current))?)
        }
        (EntityPatch::Product(patch), _) => EntityRecord::Product(patch.merge(None)?),
        (EntityPatch::ProductAttribute(patch), Some(EntityRecord::ProductAttribute(current))) => {
            EntityRecord::ProductAttribute(patch.merge(Some(current))?)
        }
        (EntityPatch::ProductAttribute(patch), _) => {
            EntityRecord::ProductAttribute(patch.merge(None)?)
        }
        (EntityPatch::Image(patch), Some(EntityRecord::Image(current))) => {
            EntityRecord::Image(patch.merge(Some(current))?)
        }
        (EntityPatch::Image(patch), _) => EntityRecord::Image(patch.merge(None)?),
        (EntityPatch::ProductImage(patch), Some(EntityRecord::ProductImage(current))) => {
            EntityRecord::ProductImage(patch.merge(Some(current))?)
        }
        (EntityPatch::ProductImage(patch), _) => EntityRecord::ProductImage(patch.merge(None)?),
        (EntityPatch::Catalog(patch), Some(EntityRecord::Catalog(current))) => {
            EntityRecord::Catalog(patch.merge(Some(current))?)
        }
        (EntityPatch::Catalog(patch), _) => EntityRecord::Catalog(patch.merge(None)?),
    };

    Ok(record)
}

impl Merge for AttributeNamePatch {
    type Record = AttributeNameRecord;

    fn merge(&self, current: Option<&AttributeNameRecord>) -> Result<Self::Record, FieldErrors> {
        Ok(AttributeNameRecord {
            id: self.id,
            name: self.name.clone(),
            display: self
                .display
                .or(current.map(|current| current.display))
                .unwrap_or(false),
            code: self
                .code
                .clone()
                .unwrap_or_else(|| current.and_then(|current| current.code.clone())),
        })
    }
}

impl Merge for AttributeValuePatch {
    type Record = AttributeValueRecord;

    fn merge(&self, _current: Option<&AttributeValueRecord>) -> Result<Self::Record, FieldErrors> {
        Ok(AttributeValueRecord {
            id: self.id,
            value: self.value.clone(),
        })
    }
}

impl Merge for AttributePatch {
    type Record = AttributeRecord;

    fn merge(&self, _current: Option<&AttributeRecord>) -> Result<Self::Record, FieldErrors> {
        Ok(AttributeRecord {
            id: self.id,
            attribute_name: self.attribute_name,
            attribute_value: self.attribute_value,
        })
    }
}

impl Merge for ProductPatch {
    type Record = ProductRecord;

    fn merge(&self, current: Option<&ProductRecord>) -> Result<Self::Record, FieldErrors> {
        let name = self
            .name
            .clone()
            .or_else(|| current.map(|current| current.name.clone()));
        let price = self.price.or(current.map(|current| current.price));

        let (Some(name), Some(price)) = (name.clone(), price) else {
            let mut errors = FieldErrors::new();

            if name.is_none() {
                errors.add("nazev", REQUIRED);
            }

            if price.is_none() {
                errors.add("cena", REQUIRED);
            }

            return Err(errors);
        };

        Ok(ProductRecord {
            id: self.id,
            name,
            description: self
                .description
                .clone()
                .or_else(|| current.map(|current| current.description.clone()))
                .unwrap_or_default(),
            price,
            currency: self.currency.clone(),
            published_on: self
                .published_on
                .unwrap_or_else(|| current.and_then(|current| current.published_on)),
            is_published: self
                .is_published
                .or(current.map(|current| current.is_published))
                .unwrap_or(false),
        })
    }
}

impl Merge for ProductAttributePatch {
    type Record = ProductAttributeRecord;

    fn merge(&self, _current: Option<&ProductAttributeRecord>) -> Result<Self::Record, FieldErrors> {
        Ok(ProductAttributeRecord {
            id: self.id,
            attribute: self.attribute,
            product: self.product,
        })
    }
}

impl Merge for ImagePatch {
    type Record = ImageRecord;

    fn merge(&self, current: Option<&ImageRecord>) -> Result<Self::Record, FieldErrors> {
        Ok(ImageRecord {
            id: self.id,
            name: self
                .name
                .clone()
                .or_else(|| current.map(|current| current.name.clone()))
                .unwrap_or_default(),
            url: self.url.clone(),
        })
    }
}

impl Merge for ProductImagePatch {
    type Record = ProductImageRecord;

    fn merge(&self, current: Option<&ProductImageRecord>) -> Result<Self::Record, FieldErrors> {
        Ok(ProductImageRecord {
            id: self.id,
            name: self
                .name
                .clone()
                .or_else(|| current.map(|current| current.name.clone()))
                .unwrap_or_default(),
            product: self.product,
            image: self.image,
        })
    }
}

impl Merge for CatalogPatch {
    type Record = CatalogRecord;

    fn merge(&self, current: Option<&CatalogRecord>) -> Result<Self::Record, FieldErrors> {
        let Some(name) = self
            .name
            .clone()
            .or_else(|| current.map(|current| current.name.clone()))
        else {
            let mut errors = FieldErrors::new();
            errors.add("nazev", REQUIRED);
            return Err(errors);
        };

        Ok(CatalogRecord {
            id: self.id,
            name,
            image: self
                .image
                .unwrap_or_else(|| current.and_then(|current| current.image)),
            products: self
                .products
                .clone()
                .or_else(|| current.map(|current| current.products.clone()))
                .unwrap_or_default(),
            attributes: self
                .attributes
                .clone()
                .or_else(|| current.map(|current| current.attributes.clone()))
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use jiff::Timestamp;
    use mockall::predicate::{always, eq};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::domain::catalog::{
        records::{AttributeId, CatalogId, ImageId, ProductId},
        registry::EntityKind,
        repository::MockCatalogRepository,
    };

    use super::*;

    fn stored_product() -> ProductRecord {
        ProductRecord {
            id: ProductId::new(1),
            name: "Phone".to_string(),
            description: "Smart".to_string(),
            price: Decimal::new(19990, 2),
            currency: "CZK".to_string(),
            published_on: None,
            is_published: true,
        }
    }

    fn product_patch() -> ProductPatch {
        ProductPatch {
            id: ProductId::new(1),
            name: None,
            description: None,
            price: None,
            currency: "CZK".to_string(),
            published_on: None,
            is_published: None,
        }
    }

    #[test]
    fn new_product_takes_defaults() -> TestResult {
        let patch = ProductPatch {
            name: Some("Phone".to_string()),
            price: Some(Decimal::new(100, 0)),
            ..product_patch()
        };

        let record = patch.merge(None)?;

        assert_eq!(record.description, "");
        assert!(!record.is_published);
        assert_eq!(record.published_on, None);

        Ok(())
    }

    #[test]
    fn new_product_requires_name_and_price() {
        let errors = product_patch().merge(None).err().unwrap_or_default();

        assert_eq!(
            errors.get("nazev"),
            Some(["This field is required.".to_string()].as_slice())
        );
        assert_eq!(
            errors.get("cena"),
            Some(["This field is required.".to_string()].as_slice())
        );
    }

    #[test]
    fn omitted_fields_keep_stored_values() -> TestResult {
        let stored = stored_product();

        let record = ProductPatch {
            price: Some(Decimal::new(5, 0)),
            ..product_patch()
        }
        .merge(Some(&stored))?;

        assert_eq!(record.name, "Phone");
        assert_eq!(record.description, "Smart");
        assert_eq!(record.price, Decimal::new(5, 0));
        assert!(record.is_published);

        Ok(())
    }

    #[test]
    fn null_published_on_clears_the_stored_value() -> TestResult {
        let stored = ProductRecord {
            published_on: Some("2022-12-12T00:00:00Z".parse::<Timestamp>()?),
            ..stored_product()
        };

        let record = ProductPatch {
            published_on: Some(None),
            ..product_patch()
        }
        .merge(Some(&stored))?;

        assert_eq!(record.published_on, None);

        Ok(())
    }

    #[test]
    fn catalog_sets_replace_only_when_supplied() -> TestResult {
        let stored = CatalogRecord {
            id: CatalogId::new(1),
            name: "Spring".to_string(),
            image: Some(ImageId::new(2)),
            products: [ProductId::new(1), ProductId::new(2)].into(),
            attributes: [AttributeId::new(4)].into(),
        };

        let record = CatalogPatch {
            id: CatalogId::new(1),
            name: None,
            image: None,
            products: Some([ProductId::new(3)].into()),
            attributes: None,
        }
        .merge(Some(&stored))?;

        assert_eq!(record.name, "Spring");
        assert_eq!(record.image, Some(ImageId::new(2)));
        assert_eq!(record.products, BTreeSet::from([ProductId::new(3)]));
        assert_eq!(record.attributes, BTreeSet::from([AttributeId::new(4)]));

        let cleared = CatalogPatch {
            id: CatalogId::new(1),
            name: None,
            image: None,
            products: None,
            attributes: Some(BTreeSet::new()),
        }
        .merge(Some(&record))?;

        assert_eq!(cleared.products, BTreeSet::from([ProductId::new(3)]));
        assert!(cleared.attributes.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn absent_record_is_inserted() -> TestResult {
        let mut repository = MockCatalogRepository::new();

        repository
            .expect_find()
            .with(eq(EntityKind::Product), eq(1))
            .once()
            .return_once(|_, _| Ok(None));

        repository
            .expect_insert()
            .with(eq(EntityRecord::Product(stored_product())))
            .once()
            .return_once(|_| Ok(()));

        repository.expect_update().never();

        let patch = EntityPatch::Product(ProductPatch {
            name: Some("Phone".to_string()),
            description: Some("Smart".to_string()),
            price: Some(Decimal::new(19990, 2)),
            is_published: Some(true),
            ..product_patch()
        });

        let upserted = upsert(&repository, &patch).await?;

        assert!(upserted.created());
        assert_eq!(upserted.record, EntityRecord::Product(stored_product()));

        Ok(())
    }

    #[tokio::test]
    async fn identical_record_issues_no_write() -> TestResult {
        let mut repository = MockCatalogRepository::new();

        repository
            .expect_find()
            .once()
            .return_once(|_, _| Ok(Some(EntityRecord::Product(stored_product()))));

        repository.expect_insert().never();
        repository.expect_update().never();

        let patch = EntityPatch::Product(ProductPatch {
            name: Some("Phone".to_string()),
            ..product_patch()
        });

        let upserted = upsert(&repository, &patch).await?;

        assert_eq!(upserted.outcome, UpsertOutcome::Unchanged);
        assert!(!upserted.created());

        Ok(())
    }

    #[tokio::test]
    async fn changed_record_is_updated() -> TestResult {
        let mut repository = MockCatalogRepository::new();

        repository
            .expect_find()
            .once()
            .return_once(|_, _| Ok(Some(EntityRecord::Product(stored_product()))));

        repository.expect_insert().never();
        repository
            .expect_update()
            .with(always())
            .once()
            .return_once(|_| Ok(()));

        let patch = EntityPatch::Product(ProductPatch {
            currency: "EUR".to_string(),
            ..product_patch()
        });

        let upserted = upsert(&repository, &patch).await?;

        assert_eq!(upserted.outcome, UpsertOutcome::Updated);

        let EntityRecord::Product(product) = upserted.record else {
            panic!("expected a product record");
        };

        assert_eq!(product.currency, "EUR");
        assert_eq!(product.name, "Phone");

        Ok(())
    }

    #[tokio::test]
    async fn create_without_required_fields_is_invalid() {
        let mut repository = MockCatalogRepository::new();

        repository
            .expect_find()
            .once()
            .return_once(|_, _| Ok(None));

        repository.expect_insert().never();

        let result = upsert(&repository, &EntityPatch::Product(product_patch())).await;

        assert!(
            matches!(result, Err(RecordError::Invalid(_))),
            "expected validation failure, got {result:?}"
        );
    }
}
