//! Test Helpers

use serde_json::{Value, json};

/// One record of every kind, ordered so each reference resolves.
pub(crate) fn seed_batch() -> Value {
    json!([
        { "AttributeName": { "id": 1, "nazev": "Barva", "zobrazit": true, "kod": "color" } },
        { "AttributeValue": { "id": 1, "hodnota": "modrá" } },
        { "Attribute": { "id": 1, "nazev_atributu_id": 1, "hodnota_atributu_id": 1 } },
        {
            "Product": {
                "id": 1,
                "nazev": "Phone",
                "description": "Smart phone",
                "cena": "199.90",
                "mena": "CZK",
                "published_on": "2022-12-12T00:00:00Z",
                "is_published": true
            }
        },
        { "ProductAttributes": { "id": 1, "attribute": 1, "product": 1 } },
        { "Image": { "id": 1, "nazev": "front", "obrazek": "https://cdn.test/phone.png" } },
        { "ProductImage": { "id": 1, "product": 1, "obrazek_id": 1, "nazev": "front" } },
        {
            "Catalog": {
                "id": 1,
                "nazev": "Spring",
                "obrazek_id": 1,
                "products_ids": [1],
                "attributes_ids": [1]
            }
        }
    ])
}
