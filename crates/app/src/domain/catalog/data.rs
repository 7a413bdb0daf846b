//! Catalog Data
//!
//! Normalized import records. A `None` field was omitted on the wire and
//! leaves the stored value untouched on update.

use std::collections::BTreeSet;

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::domain::catalog::{
    records::{
        AttributeId, AttributeNameId, AttributeValueId, CatalogId, ImageId, ProductAttributeId,
        ProductId, ProductImageId,
    },
    registry::EntityKind,
};

/// Attribute Name Patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNamePatch {
    pub id: AttributeNameId,
    pub name: String,
    pub display: Option<bool>,
    pub code: Option<Option<String>>,
}

/// Attribute Value Patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValuePatch {
    pub id: AttributeValueId,
    pub value: String,
}

/// Attribute Patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePatch {
    pub id: AttributeId,
    pub attribute_name: AttributeNameId,
    pub attribute_value: AttributeValueId,
}

/// Product Patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPatch {
    pub id: ProductId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub currency: String,
    pub published_on: Option<Option<Timestamp>>,
    pub is_published: Option<bool>,
}

/// Product Attribute Patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAttributePatch {
    pub id: ProductAttributeId,
    pub attribute: AttributeId,
    pub product: ProductId,
}

/// Image Patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePatch {
    pub id: ImageId,
    pub name: Option<String>,
    pub url: String,
}

/// Product Image Patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImagePatch {
    pub id: ProductImageId,
    pub name: Option<String>,
    pub product: ProductId,
    pub image: ImageId,
}

/// Catalog Patch
///
/// `Some(empty set)` clears an association set and `Some(None)` clears the
/// image; `None` leaves either as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPatch {
    pub id: CatalogId,
    pub name: Option<String>,
    pub image: Option<Option<ImageId>>,
    pub products: Option<BTreeSet<ProductId>>,
    pub attributes: Option<BTreeSet<AttributeId>>,
}

/// A normalized record of any kind, ready for upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityPatch {
    AttributeName(AttributeNamePatch),
    AttributeValue(AttributeValuePatch),
    Attribute(AttributePatch),
    Product(ProductPatch),
    ProductAttribute(ProductAttributePatch),
    Image(ImagePatch),
    ProductImage(ProductImagePatch),
    Catalog(CatalogPatch),
}

/// Related ids a patch points at, reported under the wire field they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reference {
    pub(crate) field: &'static str,
    pub(crate) kind: EntityKind,
    pub(crate) ids: Vec<i64>,
}

impl Reference {
    fn one(field: &'static str, kind: EntityKind, id: i64) -> Self {
        Self {
            field,
            kind,
            ids: vec![id],
        }
    }
}

impl EntityPatch {
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
            Self::AttributeName(patch) => patch.id.get(),
            Self::AttributeValue(patch) => patch.id.get(),
            Self::Attribute(patch) => patch.id.get(),
            Self::Product(patch) => patch.id.get(),
            Self::ProductAttribute(patch) => patch.id.get(),
            Self::Image(patch) => patch.id.get(),
            Self::ProductImage(patch) => patch.id.get(),
            Self::Catalog(patch) => patch.id.get(),
        }
    }

    /// Supplied relations that must already exist.
    pub(crate) fn references(&self) -> Vec<Reference> {
        match self {
            Self::AttributeName(_) | Self::AttributeValue(_) | Self::Product(_) | Self::Image(_) => {
                Vec::new()
            }
            Self::Attribute(patch) => vec![
                Reference::one(
                    "nazev_atributu_id",
                    EntityKind::AttributeName,
                    patch.attribute_name.get(),
                ),
                Reference::one(
                    "hodnota_atributu_id",
                    EntityKind::AttributeValue,
                    patch.attribute_value.get(),
                ),
            ],
            Self::ProductAttribute(patch) => vec![
                Reference::one("attribute", EntityKind::Attribute, patch.attribute.get()),
                Reference::one("product", EntityKind::Product, patch.product.get()),
            ],
            Self::ProductImage(patch) => vec![
                Reference::one("product", EntityKind::Product, patch.product.get()),
                Reference::one("obrazek_id", EntityKind::Image, patch.image.get()),
            ],
            Self::Catalog(patch) => {
                let mut references = Vec::new();

                if let Some(Some(image)) = patch.image {
                    references.push(Reference::one("obrazek_id", EntityKind::Image, image.get()));
                }

                if let Some(products) = &patch.products {
                    references.push(Reference {
                        field: "products_ids",
                        kind: EntityKind::Product,
                        ids: products.iter().map(|id| id.get()).collect(),
                    });
                }

                if let Some(attributes) = &patch.attributes {
                    references.push(Reference {
                        field: "attributes_ids",
                        kind: EntityKind::Attribute,
                        ids: attributes.iter().map(|id| id.get()).collect(),
                    });
                }

                references
            }
        }
    }
}
