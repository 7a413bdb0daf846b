//! Entity Registry
//!
//! The closed set of entity kinds the import pipeline and detail endpoints
//! know about. Every per-kind concern (normalization, storage, serialization)
//! dispatches on [`EntityKind`] with an exhaustive `match`, so adding a kind is
//! a compile error everywhere it needs handling.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Entity kind, keyed by its external type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    AttributeName,
    AttributeValue,
    Attribute,
    Product,
    ProductAttribute,
    Image,
    ProductImage,
    Catalog,
}

impl EntityKind {
    /// Every registered kind, in dependency order.
    pub const ALL: [Self; 8] = [
        Self::AttributeName,
        Self::AttributeValue,
        Self::Attribute,
        Self::Product,
        Self::ProductAttribute,
        Self::Image,
        Self::ProductImage,
        Self::Catalog,
    ];

    /// Canonical external type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AttributeName => "AttributeName",
            Self::AttributeValue => "AttributeValue",
            Self::Attribute => "Attribute",
            Self::Product => "Product",
            Self::ProductAttribute => "ProductAttributes",
            Self::Image => "Image",
            Self::ProductImage => "ProductImage",
            Self::Catalog => "Catalog",
        }
    }

    /// Additional names integrators use for the same kind.
    const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::ProductAttribute => &["ProductAttribute"],
            Self::AttributeName
            | Self::AttributeValue
            | Self::Attribute
            | Self::Product
            | Self::Image
            | Self::ProductImage
            | Self::Catalog => &[],
        }
    }

    /// Looks up the kind for an import batch key. Matching is exact.
    #[must_use]
    pub fn from_import_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == key || kind.aliases().contains(&key))
    }

    /// Resolves a type name from a request path, ignoring ASCII case.
    #[must_use]
    pub fn resolve(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            kind.name().eq_ignore_ascii_case(name)
                || kind
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(name))
        })
    }

    /// Storage table backing this kind.
    pub(crate) const fn table(self) -> &'static str {
        match self {
            Self::AttributeName => "attribute_names",
            Self::AttributeValue => "attribute_values",
            Self::Attribute => "attributes",
            Self::Product => "products",
            Self::ProductAttribute => "product_attributes",
            Self::Image => "images",
            Self::ProductImage => "product_images",
            Self::Catalog => "catalogs",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}
