use async_trait::async_trait;

use crate::database::models::product::{NewProduct, Product, ProductFields};
use crate::database::store::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Listing order. Rows are always ordered by `id`, which the store assigns
/// in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductOrder {
    pub sort: SortDirection,
}

impl ProductOrder {
    /// Most recently created first
    pub fn newest_first() -> Self {
        Self { sort: SortDirection::Desc }
    }

    pub fn to_sql(self) -> String {
        format!("ORDER BY \"id\" {}", self.sort.to_sql())
    }
}

impl Default for ProductOrder {
    fn default() -> Self {
        Self::newest_first()
    }
}

/// Storage-agnostic access to product records.
///
/// Lookups by an unknown id return `Ok(None)`; errors are reserved for the
/// store itself failing.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Check that the store is reachable and accepts our credentials
    async fn authenticate(&self) -> Result<(), DatabaseError>;

    /// Create the backing table if it does not exist yet
    async fn sync_schema(&self) -> Result<(), DatabaseError>;

    async fn list_all(&self, order: ProductOrder) -> Result<Vec<Product>, DatabaseError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, DatabaseError>;

    /// Insert a new record. The store assigns `id` and defaults `availability` to true.
    async fn insert(&self, fields: NewProduct) -> Result<Product, DatabaseError>;

    /// Overwrite name, price and availability of an existing record
    async fn replace(&self, id: i64, fields: ProductFields) -> Result<Option<Product>, DatabaseError>;

    /// Flip availability and persist it
    async fn patch_availability(&self, id: i64) -> Result<Option<Product>, DatabaseError>;

    /// Permanently delete a record, returning it as it was before removal
    async fn remove(&self, id: i64) -> Result<Option<Product>, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_sql() {
        assert_eq!(ProductOrder::newest_first().to_sql(), "ORDER BY \"id\" DESC");
        assert_eq!(ProductOrder { sort: SortDirection::Asc }.to_sql(), "ORDER BY \"id\" ASC");
        assert_eq!(ProductOrder::default(), ProductOrder::newest_first());
    }
}
