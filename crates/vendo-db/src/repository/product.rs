//! # Product Repository (Catalog Store)
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with sku/barcode uniqueness
//! - Low-stock listing per manufacturer
//! - Atomic stock adjustment
//!
//! ## Stock Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read-then-write (lost updates under concurrency)        │
//! │     let q = SELECT quantity ...;                                    │
//! │     UPDATE products SET quantity = {q - 3} WHERE id = ?             │
//! │                                                                     │
//! │  ✅ CORRECT: single atomic read-modify-write                        │
//! │     UPDATE products SET quantity = quantity - 3 WHERE id = ?        │
//! │                                                                     │
//! │  Two confirmations racing on the same product each apply their      │
//! │  own delta; neither overwrites the other.                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vendo_core::{Product, ProductPatch};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = r#"
    id, manufacturer_id, name, description, sku, barcode,
    price_cents, cost_cents, quantity, min_quantity,
    is_active, created_at, updated_at
"#;

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products in insertion order, paginated.
    pub async fn list(&self, offset: i64, limit: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            ORDER BY created_at, id
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists one manufacturer's products in insertion order, paginated.
    pub async fn list_by_manufacturer(
        &self,
        manufacturer_id: &str,
        offset: i64,
        limit: i64,
    ) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE manufacturer_id = ?1
            ORDER BY created_at, id
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(manufacturer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists a manufacturer's products at or below their reorder threshold.
    ///
    /// Other manufacturers' products are excluded even if also low.
    pub async fn list_low_stock(
        &self,
        manufacturer_id: &str,
        offset: i64,
        limit: i64,
    ) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE manufacturer_id = ?1 AND quantity <= min_quantity
            ORDER BY created_at, id
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(manufacturer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - inserted product
    /// * `Err(DbError::UniqueViolation)` - SKU or barcode already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        // Explicit pre-checks give the caller a named field; the unique
        // indexes remain the authority under races.
        if self.get_by_sku(&product.sku).await?.is_some() {
            return Err(DbError::duplicate("sku", &product.sku));
        }
        if self.get_by_barcode(&product.barcode).await?.is_some() {
            return Err(DbError::duplicate("barcode", &product.barcode));
        }

        sqlx::query(
            r#"
            INSERT INTO products (
                id, manufacturer_id, name, description, sku, barcode,
                price_cents, cost_cents, quantity, min_quantity,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.manufacturer_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.quantity)
        .bind(product.min_quantity)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Applies a partial update to a product.
    ///
    /// `sku` and `barcode` are immutable and not part of the patch.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the updated row
    /// * `Err(DbError::NotFound)` - product doesn't exist
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                price_cents = COALESCE(?4, price_cents),
                cost_cents = COALESCE(?5, cost_cents),
                quantity = COALESCE(?6, quantity),
                min_quantity = COALESCE(?7, min_quantity),
                is_active = COALESCE(?8, is_active),
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(patch.price_cents)
        .bind(patch.cost_cents)
        .bind(patch.quantity)
        .bind(patch.min_quantity)
        .bind(patch.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        // The row exists: re-read it for the caller.
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Atomically applies `quantity += delta`.
    ///
    /// Single UPDATE statement, no read round-trip: concurrent adjustments
    /// on the same product never lose an update. The result is allowed to
    /// go negative (deduction at confirm time is not gated on stock).
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - product doesn't exist
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Hard-deletes a product.
    ///
    /// Historical order items keep their product_id reference; confirmation
    /// skips lines whose product no longer exists.
    pub async fn remove(&self, id: &str) -> DbResult<()> {
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

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::repository::testing;
    use vendo_core::{ProductPatch, Role};

    #[tokio::test]
    async fn test_duplicate_sku_and_barcode_rejected() {
        let db = testing::test_db().await;
        let maker = testing::user(Role::Manufacturer, "maker@example.com");
        db.users().insert(&maker).await.unwrap();

        let first = testing::product(&maker.id, "SKU-1", "1000000000001", 10);
        db.products().insert(&first).await.unwrap();

        // Same SKU, different barcode.
        let same_sku = testing::product(&maker.id, "SKU-1", "1000000000002", 10);
        let err = db.products().insert(&same_sku).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "sku"));

        // Same barcode, different SKU.
        let same_barcode = testing::product(&maker.id, "SKU-2", "1000000000001", 10);
        let err = db.products().insert(&same_barcode).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "barcode"));
    }

    #[tokio::test]
    async fn test_point_lookups() {
        let db = testing::test_db().await;
        let maker = testing::user(Role::Manufacturer, "maker@example.com");
        db.users().insert(&maker).await.unwrap();

        let product = testing::product(&maker.id, "SKU-9", "1000000000009", 3);
        db.products().insert(&product).await.unwrap();

        assert_eq!(
            db.products()
                .get_by_sku("SKU-9")
                .await
                .unwrap()
                .unwrap()
                .id,
            product.id
        );
        assert_eq!(
            db.products()
                .get_by_barcode("1000000000009")
                .await
                .unwrap()
                .unwrap()
                .id,
            product.id
        );
        assert!(db.products().get_by_sku("SKU-NONE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_low_stock_scoped_to_manufacturer() {
        let db = testing::test_db().await;
        let maker_a = testing::user(Role::Manufacturer, "a@example.com");
        let maker_b = testing::user(Role::Manufacturer, "b@example.com");
        db.users().insert(&maker_a).await.unwrap();
        db.users().insert(&maker_b).await.unwrap();

        // maker_a: one low, one healthy.
        let mut low = testing::product(&maker_a.id, "A-LOW", "2000000000001", 2);
        low.min_quantity = 5;
        db.products().insert(&low).await.unwrap();

        let mut healthy = testing::product(&maker_a.id, "A-OK", "2000000000002", 50);
        healthy.min_quantity = 5;
        db.products().insert(&healthy).await.unwrap();

        // maker_b: low, but belongs to someone else.
        let mut other_low = testing::product(&maker_b.id, "B-LOW", "2000000000003", 0);
        other_low.min_quantity = 5;
        db.products().insert(&other_low).await.unwrap();

        let result = db
            .products()
            .list_low_stock(&maker_a.id, 0, 100)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].sku, "A-LOW");
    }

    #[tokio::test]
    async fn test_boundary_quantity_counts_as_low() {
        let db = testing::test_db().await;
        let maker = testing::user(Role::Manufacturer, "maker@example.com");
        db.users().insert(&maker).await.unwrap();

        let mut at_threshold = testing::product(&maker.id, "EDGE", "3000000000001", 5);
        at_threshold.min_quantity = 5;
        db.products().insert(&at_threshold).await.unwrap();

        let result = db
            .products()
            .list_low_stock(&maker.id, 0, 100)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = testing::test_db().await;
        let maker = testing::user(Role::Manufacturer, "maker@example.com");
        db.users().insert(&maker).await.unwrap();

        let product = testing::product(&maker.id, "ADJ", "4000000000001", 10);
        db.products().insert(&product).await.unwrap();

        db.products().adjust_stock(&product.id, -4).await.unwrap();
        db.products().adjust_stock(&product.id, 1).await.unwrap();

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 7);

        let err = db.products().adjust_stock("missing", -1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_adjustments_never_lose_updates() {
        let db = testing::test_db().await;
        let maker = testing::user(Role::Manufacturer, "maker@example.com");
        db.users().insert(&maker).await.unwrap();

        let product = testing::product(&maker.id, "RACE", "5000000000001", 10);
        db.products().insert(&product).await.unwrap();

        let repo_a = db.products();
        let repo_b = db.products();
        let id_a = product.id.clone();
        let id_b = product.id.clone();

        let (a, b) = tokio::join!(
            tokio::spawn(async move { repo_a.adjust_stock(&id_a, -5).await }),
            tokio::spawn(async move { repo_b.adjust_stock(&id_b, -3).await }),
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        // 10 - 5 - 3 = 2; a lost update would leave 5 or 7.
        assert_eq!(after.quantity, 2);
    }

    #[tokio::test]
    async fn test_patch_update_leaves_identifiers_alone() {
        let db = testing::test_db().await;
        let maker = testing::user(Role::Manufacturer, "maker@example.com");
        db.users().insert(&maker).await.unwrap();

        let product = testing::product(&maker.id, "PATCH", "6000000000001", 10);
        db.products().insert(&product).await.unwrap();

        let patch = ProductPatch {
            name: Some("Renamed".to_string()),
            price_cents: Some(2500),
            ..Default::default()
        };
        let updated = db.products().update(&product.id, &patch).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.price_cents, 2500);
        // Untouched fields survive.
        assert_eq!(updated.sku, "PATCH");
        assert_eq!(updated.quantity, 10);

        let err = db
            .products()
            .update("missing", &ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_remove() {
        let db = testing::test_db().await;
        let maker = testing::user(Role::Manufacturer, "maker@example.com");
        db.users().insert(&maker).await.unwrap();

        let product = testing::product(&maker.id, "DEL", "7000000000001", 1);
        db.products().insert(&product).await.unwrap();

        db.products().remove(&product.id).await.unwrap();
        assert!(db
            .products()
            .get_by_id(&product.id)
            .await
            .unwrap()
            .is_none());

        let err = db.products().remove(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
