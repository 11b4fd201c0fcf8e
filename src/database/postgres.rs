use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::product::{NewProduct, Product, ProductFields};
use crate::database::repository::{ProductOrder, ProductRepository};
use crate::database::store::DatabaseError;

const PRODUCT_COLUMNS: &str = "id, name, price, availability, created_at, updated_at";

const CREATE_PRODUCTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        price DOUBLE PRECISION NOT NULL,
        availability BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Products stored in the `products` table of a Postgres database
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn authenticate(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn sync_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_PRODUCTS_TABLE).execute(&self.pool).await?;
        info!("Synchronized products table");
        Ok(())
    }

    async fn list_all(&self, order: ProductOrder) -> Result<Vec<Product>, DatabaseError> {
        let sql = format!("SELECT {} FROM products {}", PRODUCT_COLUMNS, order.to_sql());
        debug!("list_all: {}", sql);

        let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, fields: NewProduct) -> Result<Product, DatabaseError> {
        let sql = format!(
            "INSERT INTO products (name, price) VALUES ($1, $2) RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(&fields.name)
            .bind(fields.price)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn replace(&self, id: i64, fields: ProductFields) -> Result<Option<Product>, DatabaseError> {
        if self.get_by_id(id).await?.is_none() {
            return Ok(None);
        }

        let sql = format!(
            "UPDATE products SET name = $2, price = $3, availability = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(fields.price)
            .bind(fields.availability)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn patch_availability(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        // Read then write, outside a transaction: two concurrent toggles of the
        // same id can both read the old value and leave it flipped only once.
        let Some(current) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let sql = format!(
            "UPDATE products SET availability = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(!current.availability)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn remove(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {}", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
