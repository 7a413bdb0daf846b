//! Catalog Records

use std::collections::BTreeSet;

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{domain::catalog::registry::EntityKind, ids::TypedId};

/// Attribute Name Id
pub type AttributeNameId = TypedId<AttributeNameRecord>;

/// Attribute Value Id
pub type AttributeValueId = TypedId<AttributeValueRecord>;

/// Attribute Id
pub type AttributeId = TypedId<AttributeRecord>;

/// Product Id
pub type ProductId = TypedId<ProductRecord>;

/// Product Attribute Id
pub type ProductAttributeId = TypedId<ProductAttributeRecord>;

/// Image Id
pub type ImageId = TypedId<ImageRecord>;

/// Product Image Id
pub type ProductImageId = TypedId<ProductImageRecord>;

/// Catalog Id
pub type CatalogId = TypedId<CatalogRecord>;

/// Attribute Name Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNameRecord {
    pub id: AttributeNameId,
    pub name: String,
    pub display: bool,
    pub code: Option<String>,
}

/// Attribute Value Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValueRecord {
    pub id: AttributeValueId,
    pub value: String,
}

/// Attribute Record, one name=value pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    pub id: AttributeId,
    pub attribute_name: AttributeNameId,
    pub attribute_value: AttributeValueId,
}

/// Product Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub currency: String,
    pub published_on: Option<Timestamp>,
    pub is_published: bool,
}

/// Product Attribute Record, links a product to one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAttributeRecord {
    pub id: ProductAttributeId,
    pub attribute: AttributeId,
    pub product: ProductId,
}

/// Image Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: ImageId,
    pub name: String,
    pub url: String,
}

/// Product Image Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImageRecord {
    pub id: ProductImageId,
    pub name: String,
    pub product: ProductId,
    pub image: ImageId,
}

/// Catalog Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub id: CatalogId,
    pub name: String,
    pub image: Option<ImageId>,
    pub products: BTreeSet<ProductId>,
    pub attributes: BTreeSet<AttributeId>,
}

/// Any stored catalog entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRecord {
    AttributeName(AttributeNameRecord),
    AttributeValue(AttributeValueRecord),
    Attribute(AttributeRecord),
    Product(ProductRecord),
    ProductAttribute(ProductAttributeRecord),
    Image(ImageRecord),
    ProductImage(ProductImageRecord),
    Catalog(CatalogRecord),
}

/// Unique constraint over a single column of a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniqueKey<'a> {
    pub(crate) column: &'static str,
    pub(crate) value: &'a str,
}

impl EntityRecord {
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::AttributeName(_) => EntityKind::AttributeName,
            Self::AttributeValue(_) => EntityKind::AttributeValue,
            Self::Attribute(_) => EntityKind::Attribute,
            Self::Product(_) => EntityKind::Product,
            Self::ProductAttribute(_) => EntityKind::ProductAttribute,
            Self::Image(_) => EntityKind::Image,
            Self::ProductImage(_) => EntityKind::ProductImage,
            Self::Catalog(_) => EntityKind::Catalog,
        }
    }

    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Self::AttributeName(record) => record.id.get(),
            Self::AttributeValue(record) => record.id.get(),
            Self::Attribute(record) => record.id.get(),
            Self::Product(record) => record.id.get(),
            Self::ProductAttribute(record) => record.id.get(),
            Self::Image(record) => record.id.get(),
            Self::ProductImage(record) => record.id.get(),
            Self::Catalog(record) => record.id.get(),
        }
    }

    /// The value this record holds for its kind's unique column, if any.
    pub(crate) fn unique_key(&self) -> Option<UniqueKey<'_>> {
        match self {
            Self::AttributeName(record) => Some(UniqueKey {
                column: "name",
                value: &record.name,
            }),
            Self::AttributeValue(record) => Some(UniqueKey {
                column: "value",
                value: &record.value,
            }),
            Self::Product(record) => Some(UniqueKey {
                column: "name",
                value: &record.name,
            }),
            Self::Image(record) => Some(UniqueKey {
                column: "url",
                value: &record.url,
            }),
            Self::Catalog(record) => Some(UniqueKey {
                column: "name",
                value: &record.name,
            }),
            Self::Attribute(_) | Self::ProductAttribute(_) | Self::ProductImage(_) => None,
        }
    }

    /// Every foreign key this record holds, as `(kind, id)` pairs.
    pub(crate) fn references(&self) -> Vec<(EntityKind, i64)> {
        match self {
            Self::AttributeName(_) | Self::AttributeValue(_) | Self::Product(_) | Self::Image(_) => {
                Vec::new()
            }
            Self::Attribute(record) => vec![
                (EntityKind::AttributeName, record.attribute_name.get()),
                (EntityKind::AttributeValue, record.attribute_value.get()),
            ],
            Self::ProductAttribute(record) => vec![
                (EntityKind::Attribute, record.attribute.get()),
                (EntityKind::Product, record.product.get()),
            ],
            Self::ProductImage(record) => vec![
                (EntityKind::Product, record.product.get()),
                (EntityKind::Image, record.image.get()),
            ],
            Self::Catalog(record) => record
                .image
                .map(|image| (EntityKind::Image, image.get()))
                .into_iter()
                .chain(
                    record
                        .products
                        .iter()
                        .map(|product| (EntityKind::Product, product.get())),
                )
                .chain(
                    record
                        .attributes
                        .iter()
                        .map(|attribute| (EntityKind::Attribute, attribute.get())),
                )
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_references_cover_image_products_and_attributes() {
        let record = EntityRecord::Catalog(CatalogRecord {
            id: CatalogId::new(1),
            name: "Spring".to_string(),
            image: Some(ImageId::new(4)),
            products: [ProductId::new(2), ProductId::new(3)].into(),
            attributes: [AttributeId::new(9)].into(),
        });

        assert_eq!(
            record.references(),
            vec![
                (EntityKind::Image, 4),
                (EntityKind::Product, 2),
                (EntityKind::Product, 3),
                (EntityKind::Attribute, 9),
            ]
        );
    }

    #[test]
    fn join_records_have_no_unique_key() {
        let record = EntityRecord::ProductAttribute(ProductAttributeRecord {
            id: ProductAttributeId::new(1),
            attribute: AttributeId::new(1),
            product: ProductId::new(1),
        });

        assert_eq!(record.unique_key(), None);
        assert_eq!(record.kind(), EntityKind::ProductAttribute);
        assert_eq!(record.id(), 1);
    }
}
