//! # Product Repository
//!
//! The catalog master. Checkout snapshots its values; the earnings calculator
//! only reads it for order items stored without snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use sedekat_core::validation::validate_rate;
use sedekat_core::Product;

/// Row shape of `products`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRecord {
    id: String,
    name: String,
    price: i64,
    commission_value: Option<i64>,
    points_value: Option<i64>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Product {
            id: r.id,
            name: r.name,
            price_sen: r.price,
            commission_value_sen: r.commission_value,
            points_value: r.points_value,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, price, commission_value, points_value, is_active, created_at, updated_at
    FROM products
"#;

/// Loads the given products by id on one connection. Missing ids are absent
/// from the map.
pub async fn fetch_products_by_ids(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> DbResult<HashMap<String, Product>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(SELECT_PRODUCT);
    builder.push(" WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let records = builder
        .build_query_as::<ProductRecord>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(records
        .into_iter()
        .map(|r| (r.id.clone(), Product::from(r)))
        .collect())
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let record: Option<ProductRecord> =
            sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_PRODUCT))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record.map(Product::from))
    }

    /// Loads several products at once, keyed by id.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<HashMap<String, Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_products_by_ids(&mut *conn, ids).await
    }

    /// Lists products currently on sale, by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let records: Vec<ProductRecord> = sqlx::query_as(&format!(
            "{} WHERE is_active = 1 ORDER BY name",
            SELECT_PRODUCT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Product::from).collect())
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_rate("commission_value", product.commission_value_sen)?;
        validate_rate("points_value", product.points_value)?;
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price, commission_value, points_value,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_sen)
        .bind(product.commission_value_sen)
        .bind(product.points_value)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Changes a product's price and per-unit rates.
    ///
    /// Orders already placed keep their snapshots.
    pub async fn update_pricing(
        &self,
        id: &str,
        price_sen: i64,
        commission_value_sen: Option<i64>,
        points_value: Option<i64>,
    ) -> DbResult<()> {
        validate_rate("commission_value", commission_value_sen)?;
        validate_rate("points_value", points_value)?;
        debug!(id = %id, price_sen, ?commission_value_sen, ?points_value, "Updating product pricing");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                price = ?2,
                commission_value = ?3,
                points_value = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(price_sen)
        .bind(commission_value_sen)
        .bind(points_value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Takes a product off sale without deleting its history.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(is_active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product row. Order items referencing it keep their snapshots.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Returns the total number of products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn product(id: &str, commission_sen: Option<i64>) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Produk {}", id),
            price_sen: 2_500_000,
            commission_value_sen: commission_sen,
            points_value: Some(3),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&product("p1", Some(100_000))).await.unwrap();

        let found = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(found.commission_value_sen, Some(100_000));
        assert_eq!(found.points_value, Some(3));
        assert!(found.is_active);

        assert!(db.products().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_many_skips_missing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&product("p1", None)).await.unwrap();
        db.products().insert(&product("p2", None)).await.unwrap();

        let found = db
            .products()
            .get_many(&["p1".to_string(), "gone".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key("p1"));

        assert!(db.products().get_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_pricing_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&product("p1", Some(100_000))).await.unwrap();

        db.products()
            .update_pricing("p1", 3_000_000, Some(150_000), None)
            .await
            .unwrap();
        let found = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(found.price_sen, 3_000_000);
        assert_eq!(found.points_value, None);

        db.products().delete("p1").await.unwrap();
        assert_eq!(db.products().count().await.unwrap(), 0);
        assert!(matches!(
            db.products().delete("p1").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_negative_rates_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(matches!(
            db.products().insert(&product("p1", Some(-1))).await,
            Err(DbError::Invalid(_))
        ));

        db.products().insert(&product("p2", Some(0))).await.unwrap();
        assert!(matches!(
            db.products().update_pricing("p2", 1_000_000, None, Some(-3)).await,
            Err(DbError::Invalid(_))
        ));
        let stored = db.products().get_by_id("p2").await.unwrap().unwrap();
        assert_eq!(stored.points_value, Some(3));
    }

    #[tokio::test]
    async fn test_list_active_excludes_inactive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&product("p1", None)).await.unwrap();
        db.products().insert(&product("p2", None)).await.unwrap();
        db.products().set_active("p2", false).await.unwrap();

        let active = db.products().list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "p1");
    }
}
