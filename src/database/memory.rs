use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::models::product::{NewProduct, Product, ProductFields};
use crate::database::repository::{ProductOrder, ProductRepository, SortDirection};
use crate::database::store::DatabaseError;

#[derive(Default)]
struct MemoryTable {
    last_id: i64,
    rows: BTreeMap<i64, Product>,
}

/// Process-local product table. Ids are never reused, even after deletes.
#[derive(Default)]
pub struct MemoryProductRepository {
    table: RwLock<MemoryTable>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn authenticate(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn sync_schema(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_all(&self, order: ProductOrder) -> Result<Vec<Product>, DatabaseError> {
        let table = self.table.read().await;
        // rows are keyed by id
        let products = table.rows.values().cloned();
        Ok(match order.sort {
            SortDirection::Asc => products.collect(),
            SortDirection::Desc => products.rev().collect(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, fields: NewProduct) -> Result<Product, DatabaseError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let now = Utc::now();
        let product = Product {
            id: table.last_id,
            name: fields.name,
            price: fields.price,
            availability: true,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn replace(&self, id: i64, fields: ProductFields) -> Result<Option<Product>, DatabaseError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|product| {
            product.name = fields.name;
            product.price = fields.price;
            product.availability = fields.availability;
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn patch_availability(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|product| {
            product.availability = !product.availability;
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn remove(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        Ok(self.table.write().await.rows.remove(&id))
    }
}
