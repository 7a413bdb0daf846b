//! Postgres catalog storage.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
};

use crate::{
    database::Db,
    domain::catalog::{
        errors::StorageError,
        records::{
            AttributeNameRecord, AttributeRecord, AttributeValueRecord, CatalogRecord,
            EntityRecord, ImageRecord, ProductAttributeRecord, ProductImageRecord, ProductRecord,
        },
        registry::EntityKind,
        repository::CatalogRepository,
    },
    ids::TypedId,
};

const SELECT_ATTRIBUTE_NAMES_SQL: &str = include_str!("sql/select_attribute_names.sql");
const INSERT_ATTRIBUTE_NAME_SQL: &str = include_str!("sql/insert_attribute_name.sql");
const UPDATE_ATTRIBUTE_NAME_SQL: &str = include_str!("sql/update_attribute_name.sql");
const SELECT_ATTRIBUTE_VALUES_SQL: &str = include_str!("sql/select_attribute_values.sql");
const INSERT_ATTRIBUTE_VALUE_SQL: &str = include_str!("sql/insert_attribute_value.sql");
const UPDATE_ATTRIBUTE_VALUE_SQL: &str = include_str!("sql/update_attribute_value.sql");
const SELECT_ATTRIBUTES_SQL: &str = include_str!("sql/select_attributes.sql");
const INSERT_ATTRIBUTE_SQL: &str = include_str!("sql/insert_attribute.sql");
const UPDATE_ATTRIBUTE_SQL: &str = include_str!("sql/update_attribute.sql");
const SELECT_PRODUCTS_SQL: &str = include_str!("sql/select_products.sql");
const INSERT_PRODUCT_SQL: &str = include_str!("sql/insert_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const SELECT_PRODUCT_ATTRIBUTES_SQL: &str = include_str!("sql/select_product_attributes.sql");
const INSERT_PRODUCT_ATTRIBUTE_SQL: &str = include_str!("sql/insert_product_attribute.sql");
const UPDATE_PRODUCT_ATTRIBUTE_SQL: &str = include_str!("sql/update_product_attribute.sql");
const SELECT_IMAGES_SQL: &str = include_str!("sql/select_images.sql");
const INSERT_IMAGE_SQL: &str = include_str!("sql/insert_image.sql");
const UPDATE_IMAGE_SQL: &str = include_str!("sql/update_image.sql");
const SELECT_PRODUCT_IMAGES_SQL: &str = include_str!("sql/select_product_images.sql");
const INSERT_PRODUCT_IMAGE_SQL: &str = include_str!("sql/insert_product_image.sql");
const UPDATE_PRODUCT_IMAGE_SQL: &str = include_str!("sql/update_product_image.sql");
const SELECT_CATALOGS_SQL: &str = include_str!("sql/select_catalogs.sql");
const INSERT_CATALOG_SQL: &str = include_str!("sql/insert_catalog.sql");
const UPDATE_CATALOG_SQL: &str = include_str!("sql/update_catalog.sql");
const CLEAR_CATALOG_PRODUCTS_SQL: &str = include_str!("sql/clear_catalog_products.sql");
const INSERT_CATALOG_PRODUCTS_SQL: &str = include_str!("sql/insert_catalog_products.sql");
const CLEAR_CATALOG_ATTRIBUTES_SQL: &str = include_str!("sql/clear_catalog_attributes.sql");
const INSERT_CATALOG_ATTRIBUTES_SQL: &str = include_str!("sql/insert_catalog_attributes.sql");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Insert,
    Update,
}

impl WriteMode {
    const fn pick(self, insert: &'static str, update: &'static str) -> &'static str {
        match self {
            Self::Insert => insert,
            Self::Update => update,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PgCatalogRepository {
    db: Db,
}

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new(db: Db) -> Self {
        Self { db }
    }

    async fn select(
        &self,
        kind: EntityKind,
        id: Option<i64>,
    ) -> Result<Vec<EntityRecord>, sqlx::Error> {
        let pool = self.db.pool();

        let records = match kind {
            EntityKind::AttributeName => {
                query_as::<Postgres, AttributeNameRecord>(SELECT_ATTRIBUTE_NAMES_SQL)
                    .bind(id)
                    .fetch_all(pool)
                    .await?
                    .into_iter()
                    .map(EntityRecord::AttributeName)
                    .collect()
            }
            EntityKind::AttributeValue => {
                query_as::<Postgres, AttributeValueRecord>(SELECT_ATTRIBUTE_VALUES_SQL)
                    .bind(id)
                    .fetch_all(pool)
                    .await?
                    .into_iter()
                    .map(EntityRecord::AttributeValue)
                    .collect()
            }
            EntityKind::Attribute => query_as::<Postgres, AttributeRecord>(SELECT_ATTRIBUTES_SQL)
                .bind(id)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(EntityRecord::Attribute)
                .collect(),
            EntityKind::Product => query_as::<Postgres, ProductRecord>(SELECT_PRODUCTS_SQL)
                .bind(id)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(EntityRecord::Product)
                .collect(),
            EntityKind::ProductAttribute => {
                query_as::<Postgres, ProductAttributeRecord>(SELECT_PRODUCT_ATTRIBUTES_SQL)
                    .bind(id)
                    .fetch_all(pool)
                    .await?
                    .into_iter()
                    .map(EntityRecord::ProductAttribute)
                    .collect()
            }
            EntityKind::Image => query_as::<Postgres, ImageRecord>(SELECT_IMAGES_SQL)
                .bind(id)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(EntityRecord::Image)
                .collect(),
            EntityKind::ProductImage => {
                query_as::<Postgres, ProductImageRecord>(SELECT_PRODUCT_IMAGES_SQL)
                    .bind(id)
                    .fetch_all(pool)
                    .await?
                    .into_iter()
                    .map(EntityRecord::ProductImage)
                    .collect()
            }
            EntityKind::Catalog => query_as::<Postgres, CatalogRecord>(SELECT_CATALOGS_SQL)
                .bind(id)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(EntityRecord::Catalog)
                .collect(),
        };

        Ok(records)
    }

    async fn write(&self, record: &EntityRecord, mode: WriteMode) -> Result<(), sqlx::Error> {
        let mut tx = self.db.begin().await?;

        match record {
            EntityRecord::AttributeName(record) => {
                query(mode.pick(INSERT_ATTRIBUTE_NAME_SQL, UPDATE_ATTRIBUTE_NAME_SQL))
                    .bind(record.id.get())
                    .bind(&record.name)
                    .bind(record.display)
                    .bind(&record.code)
                    .execute(&mut *tx)
                    .await?;
            }
            EntityRecord::AttributeValue(record) => {
                query(mode.pick(INSERT_ATTRIBUTE_VALUE_SQL, UPDATE_ATTRIBUTE_VALUE_SQL))
                    .bind(record.id.get())
                    .bind(&record.value)
                    .execute(&mut *tx)
                    .await?;
            }
            EntityRecord::Attribute(record) => {
                query(mode.pick(INSERT_ATTRIBUTE_SQL, UPDATE_ATTRIBUTE_SQL))
                    .bind(record.id.get())
                    .bind(record.attribute_name.get())
                    .bind(record.attribute_value.get())
                    .execute(&mut *tx)
                    .await?;
            }
            EntityRecord::Product(record) => {
                query(mode.pick(INSERT_PRODUCT_SQL, UPDATE_PRODUCT_SQL))
                    .bind(record.id.get())
                    .bind(&record.name)
                    .bind(&record.description)
                    .bind(record.price)
                    .bind(&record.currency)
                    .bind(record.published_on.map(SqlxTimestamp::from))
                    .bind(record.is_published)
                    .execute(&mut *tx)
                    .await?;
            }
            EntityRecord::ProductAttribute(record) => {
                query(mode.pick(INSERT_PRODUCT_ATTRIBUTE_SQL, UPDATE_PRODUCT_ATTRIBUTE_SQL))
                    .bind(record.id.get())
                    .bind(record.attribute.get())
                    .bind(record.product.get())
                    .execute(&mut *tx)
                    .await?;
            }
            EntityRecord::Image(record) => {
                query(mode.pick(INSERT_IMAGE_SQL, UPDATE_IMAGE_SQL))
                    .bind(record.id.get())
                    .bind(&record.name)
                    .bind(&record.url)
                    .execute(&mut *tx)
                    .await?;
            }
            EntityRecord::ProductImage(record) => {
                query(mode.pick(INSERT_PRODUCT_IMAGE_SQL, UPDATE_PRODUCT_IMAGE_SQL))
                    .bind(record.id.get())
                    .bind(&record.name)
                    .bind(record.product.get())
                    .bind(record.image.get())
                    .execute(&mut *tx)
                    .await?;
            }
            EntityRecord::Catalog(record) => {
                write_catalog(&mut tx, record, mode).await?;
            }
        }

        tx.commit().await
    }
}

/// Catalog row and both association sets, replaced together.
async fn write_catalog(
    tx: &mut Transaction<'_, Postgres>,
    record: &CatalogRecord,
    mode: WriteMode,
) -> Result<(), sqlx::Error> {
    let id = record.id.get();

    query(mode.pick(INSERT_CATALOG_SQL, UPDATE_CATALOG_SQL))
        .bind(id)
        .bind(&record.name)
        .bind(record.image.map(TypedId::get))
        .execute(&mut **tx)
        .await?;

    if mode == WriteMode::Update {
        query(CLEAR_CATALOG_PRODUCTS_SQL)
            .bind(id)
            .execute(&mut **tx)
            .await?;

        query(CLEAR_CATALOG_ATTRIBUTES_SQL)
            .bind(id)
            .execute(&mut **tx)
            .await?;
    }

    query(INSERT_CATALOG_PRODUCTS_SQL)
        .bind(id)
        .bind(record.products.iter().map(|id| id.get()).collect::<Vec<_>>())
        .execute(&mut **tx)
        .await?;

    query(INSERT_CATALOG_ATTRIBUTES_SQL)
        .bind(id)
        .bind(record.attributes.iter().map(|id| id.get()).collect::<Vec<_>>())
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn find(&self, kind: EntityKind, id: i64) -> Result<Option<EntityRecord>, StorageError> {
        Ok(self.select(kind, Some(id)).await?.into_iter().next())
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<EntityRecord>, StorageError> {
        Ok(self.select(kind, None).await?)
    }

    async fn existing_ids(
        &self,
        kind: EntityKind,
        ids: Vec<i64>,
    ) -> Result<Vec<i64>, StorageError> {
        let sql = format!("SELECT id FROM {} WHERE id = ANY($1)", kind.table());

        Ok(query_scalar::<Postgres, i64>(&sql)
            .bind(ids)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn insert(&self, record: EntityRecord) -> Result<(), StorageError> {
        Ok(self.write(&record, WriteMode::Insert).await?)
    }

    async fn update(&self, record: EntityRecord) -> Result<(), StorageError> {
        Ok(self.write(&record, WriteMode::Update).await?)
    }
}

impl<'r> FromRow<'r, PgRow> for AttributeNameRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: TypedId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            display: row.try_get("display")?,
            code: row.try_get("code")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AttributeValueRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: TypedId::new(row.try_get("id")?),
            value: row.try_get("value")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AttributeRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: TypedId::new(row.try_get("id")?),
            attribute_name: TypedId::new(row.try_get("attribute_name_id")?),
            attribute_value: TypedId::new(row.try_get("attribute_value_id")?),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: TypedId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            currency: row.try_get("currency")?,
            published_on: row
                .try_get::<Option<SqlxTimestamp>, _>("published_on")?
                .map(SqlxTimestamp::to_jiff),
            is_published: row.try_get("is_published")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ProductAttributeRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: TypedId::new(row.try_get("id")?),
            attribute: TypedId::new(row.try_get("attribute_id")?),
            product: TypedId::new(row.try_get("product_id")?),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ImageRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: TypedId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            url: row.try_get("url")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ProductImageRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: TypedId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            product: TypedId::new(row.try_get("product_id")?),
            image: TypedId::new(row.try_get("image_id")?),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CatalogRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: TypedId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            image: row.try_get::<Option<i64>, _>("image_id")?.map(TypedId::new),
            products: row
                .try_get::<Vec<i64>, _>("product_ids")?
                .into_iter()
                .map(TypedId::new)
                .collect(),
            attributes: row
                .try_get::<Vec<i64>, _>("attribute_ids")?
                .into_iter()
                .map(TypedId::new)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::catalog::records::{CatalogId, ImageId, ProductId},
        test::TestDb,
    };

    use super::*;

    fn product(id: i64, name: &str) -> EntityRecord {
        EntityRecord::Product(ProductRecord {
            id: ProductId::new(id),
            name: name.to_string(),
            description: String::new(),
            price: Decimal::new(1999, 2),
            currency: "CZK".to_string(),
            published_on: None,
            is_published: false,
        })
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn product_round_trips_through_postgres() -> TestResult {
        let db = TestDb::new().await;
        let repository = PgCatalogRepository::new(Db::new(db.pool().clone()));

        repository.insert(product(1, "Phone")).await?;

        assert_eq!(
            repository.find(EntityKind::Product, 1).await?,
            Some(product(1, "Phone"))
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn catalog_sets_are_replaced_on_update() -> TestResult {
        let db = TestDb::new().await;
        let repository = PgCatalogRepository::new(Db::new(db.pool().clone()));

        repository.insert(product(1, "Phone")).await?;
        repository.insert(product(2, "Tablet")).await?;
        repository
            .insert(EntityRecord::Image(ImageRecord {
                id: ImageId::new(1),
                name: String::new(),
                url: "https://cdn.test/a.png".to_string(),
            }))
            .await?;

        let mut catalog = CatalogRecord {
            id: CatalogId::new(1),
            name: "Spring".to_string(),
            image: Some(ImageId::new(1)),
            products: [ProductId::new(1), ProductId::new(2)].into(),
            attributes: BTreeSet::new(),
        };

        repository.insert(EntityRecord::Catalog(catalog.clone())).await?;

        catalog.products = [ProductId::new(2)].into();
        catalog.image = None;

        repository.update(EntityRecord::Catalog(catalog.clone())).await?;

        assert_eq!(
            repository.find(EntityKind::Catalog, 1).await?,
            Some(EntityRecord::Catalog(catalog))
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn duplicate_name_is_a_conflict() -> TestResult {
        let db = TestDb::new().await;
        let repository = PgCatalogRepository::new(Db::new(db.pool().clone()));

        repository.insert(product(1, "Phone")).await?;

        let result = repository.insert(product(2, "Phone")).await;

        assert!(
            matches!(result, Err(StorageError::Conflict(_))),
            "expected conflict, got {result:?}"
        );

        assert_eq!(
            repository.existing_ids(EntityKind::Product, vec![1, 2]).await?,
            vec![1]
        );

        Ok(())
    }
}
