use chrono::{DateTime, Utc};
use common::{OrderStatus, Role};
use serde::{Deserialize, Serialize};

/// The three collections held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Products,
    Orders,
}

impl Collection {
    /// Every collection, in snapshot order.
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Products, Collection::Orders];

    /// Name used for metric labels and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Products => "products",
            Collection::Orders => "orders",
        }
    }

    /// Snapshot file holding this collection inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Products => "products.json",
            Collection::Orders => "orders.json",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Users => write!(f, "user"),
            Collection::Products => write!(f, "product"),
            Collection::Orders => write!(f, "order"),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    /// Stored as given; see `domain::CredentialVerifier`.
    pub password: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub in_stock: i32,
    pub category: String,
}

/// A placed order.
///
/// `total` is the sum of product prices at the moment the order was placed.
/// It is never recomputed when products change or disappear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub product_ids: Vec<String>,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_uses_snake_case_fields_on_disk() {
        let order = Order {
            id: "o1".to_string(),
            user_id: "u1".to_string(),
            product_ids: vec!["p1".to_string(), "p1".to_string()],
            total: 20.0,
            created_at: Utc::now(),
            status: OrderStatus::Pending,
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["product_ids"].as_array().unwrap().len(), 2);
        assert_eq!(json["status"], "Pending");
    }

    #[test]
    fn product_description_is_optional_on_disk() {
        let product: Product = serde_json::from_str(
            r#"{"id":"p1","name":"Mug","price":4.5,"in_stock":3,"category":"kitchen"}"#,
        )
        .unwrap();
        assert_eq!(product.description, "");
    }

    #[test]
    fn collection_file_names() {
        let files: Vec<_> = Collection::ALL.iter().map(|c| c.file_name()).collect();
        assert_eq!(files, vec!["users.json", "products.json", "orders.json"]);
    }
}
