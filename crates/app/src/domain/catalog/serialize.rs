//! Wire serialization of stored records, using the same field names the
//! import accepts so an export can be re-imported unchanged.

use serde_json::{Value, json};

use crate::{domain::catalog::records::EntityRecord, ids::TypedId};

impl EntityRecord {
    /// JSON representation with wire field names in a fixed order.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::AttributeName(record) => json!({
                "id": record.id.get(),
                "nazev": record.name,
                "zobrazit": record.display,
                "kod": record.code,
            }),
            Self::AttributeValue(record) => json!({
                "id": record.id.get(),
                "hodnota": record.value,
            }),
            Self::Attribute(record) => json!({
                "id": record.id.get(),
                "nazev_atributu_id": record.attribute_name.get(),
                "hodnota_atributu_id": record.attribute_value.get(),
            }),
            Self::Product(record) => {
                let mut price = record.price;
                price.rescale(2);

                json!({
                    "id": record.id.get(),
                    "nazev": record.name,
                    "description": record.description,
                    "cena": price.to_string(),
                    "mena": record.currency,
                    "published_on": record.published_on.map(|published| published.to_string()),
                    "is_published": record.is_published,
                })
            }
            Self::ProductAttribute(record) => json!({
                "id": record.id.get(),
                "attribute": record.attribute.get(),
                "product": record.product.get(),
            }),
            Self::Image(record) => json!({
                "id": record.id.get(),
                "nazev": record.name,
                "obrazek": record.url,
            }),
            Self::ProductImage(record) => json!({
                "id": record.id.get(),
                "nazev": record.name,
                "product": record.product.get(),
                "obrazek_id": record.image.get(),
            }),
            Self::Catalog(record) => json!({
                "id": record.id.get(),
                "nazev": record.name,
                "obrazek_id": record.image.map(TypedId::get),
                "products_ids": record.products.iter().map(|id| id.get()).collect::<Vec<_>>(),
                "attributes_ids": record.attributes.iter().map(|id| id.get()).collect::<Vec<_>>(),
            }),
        }
    }
}
