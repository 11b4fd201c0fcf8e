use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::validation::{coerce_bool, coerce_number, coerce_text};

/// Longest product name the `products.name` column holds
pub const NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub availability: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted on create. Availability is left to the store default.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
}

/// Every client-writable field, for a full replace
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub price: f64,
    pub availability: bool,
}

impl NewProduct {
    /// Read the create fields out of an already validated body
    pub fn from_payload(body: &Value) -> Option<Self> {
        Some(Self {
            name: body.get("name").and_then(coerce_text)?,
            price: body.get("price").and_then(coerce_number)?,
        })
    }
}

impl ProductFields {
    pub fn from_payload(body: &Value) -> Option<Self> {
        Some(Self {
            name: body.get("name").and_then(coerce_text)?,
            price: body.get("price").and_then(coerce_number)?,
            availability: body.get("availability").and_then(coerce_bool)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_payload_ignores_availability_and_extra_fields() {
        let body = json!({ "name": "Monitor", "price": "300", "availability": false, "id": 99 });
        assert_eq!(
            NewProduct::from_payload(&body),
            Some(NewProduct { name: "Monitor".into(), price: 300.0 })
        );
    }

    #[test]
    fn replace_payload_requires_every_field() {
        assert_eq!(ProductFields::from_payload(&json!({ "name": "Mouse", "price": 20 })), None);
        assert_eq!(
            ProductFields::from_payload(&json!({ "name": "Mouse", "price": 20, "availability": "false" })),
            Some(ProductFields { name: "Mouse".into(), price: 20.0, availability: false })
        );
    }
}
