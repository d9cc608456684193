//! Repository implementations.
//!
//! - [`user`] - account storage (registration, login lookups)
//! - [`product`] - the Catalog Store
//! - [`order`] - the Order Workflow Engine

pub mod order;
pub mod product;
pub mod user;

// =============================================================================
// Shared Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;
    use uuid::Uuid;
    use vendo_core::{Product, Role, User};

    use crate::pool::{Database, DbConfig};

    /// Fresh in-memory database with migrations applied.
    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Builds a user row; tests insert it through the repository.
    pub fn user(role: Role, email: &str) -> User {
        User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
            full_name: "Test User".to_string(),
            role,
            company_name: Some("Test Co".to_string()),
            phone: None,
            address: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Builds a product row owned by the given manufacturer.
    pub fn product(manufacturer_id: &str, sku: &str, barcode: &str, quantity: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            manufacturer_id: manufacturer_id.to_string(),
            name: format!("Product {sku}"),
            description: None,
            sku: sku.to_string(),
            barcode: barcode.to_string(),
            price_cents: 1000,
            cost_cents: Some(600),
            quantity,
            min_quantity: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
