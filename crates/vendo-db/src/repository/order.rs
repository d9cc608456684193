//! # Order Repository (Order Workflow Engine)
//!
//! The state machine and transactional heart of the system.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                            │
//! │     └── create_with_items()                                             │
//! │         ├── per item: product exists? stock sufficient?                 │
//! │         ├── generate order_number (unique index is the authority)       │
//! │         ├── total = Σ caller-supplied subtotals                         │
//! │         └── insert order + ALL items, or nothing                        │
//! │         Stock is CHECKED here, not reserved.                            │
//! │                                                                         │
//! │  2. CONFIRM (one transaction)                                           │
//! │     └── confirm()                                                       │
//! │         ├── pending → confirmed (anything else is rejected)             │
//! │         └── per item: quantity -= item.quantity                         │
//! │             (product deleted since creation → line skipped)             │
//! │         Status write and the whole deduction loop commit together.      │
//! │                                                                         │
//! │  3. OTHER TRANSITIONS                                                   │
//! │     └── set_status() → unconditional overwrite, no side effects         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendo_core::{order_total, CoreError, NewOrderItem, Order, OrderItem, OrderStatus};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

const ORDER_COLUMNS: &str = r#"
    id, order_number, store_id, status, total_amount_cents,
    shipping_address, notes, created_at, updated_at
"#;

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates an order with its full item set as one atomic unit.
    ///
    /// ## Preconditions (checked per item, in input order, failing fast)
    /// - the referenced product exists (`CoreError::ProductNotFound`)
    /// - `product.quantity >= item.quantity` (`CoreError::InsufficientStock`)
    ///
    /// Stock is checked, **not** reserved: deduction happens only at
    /// confirmation. Either all rows (order + items) are persisted or none.
    ///
    /// `total_amount_cents` is the exact sum of the supplied subtotals.
    pub async fn create_with_items(
        &self,
        store_id: &str,
        shipping_address: &str,
        notes: Option<String>,
        items: &[NewOrderItem],
    ) -> DbResult<(Order, Vec<OrderItem>)> {
        let mut tx = self.pool.begin().await?;

        // Stock checks run inside the same transaction as the inserts so
        // the snapshot they see is the one the order is created against.
        for item in items {
            let row: Option<(String, i64)> =
                sqlx::query_as("SELECT name, quantity FROM products WHERE id = ?1")
                    .bind(&item.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let (name, available) = match row {
                Some(row) => row,
                None => {
                    return Err(CoreError::ProductNotFound(item.product_id.clone()).into());
                }
            };

            if available < item.quantity {
                return Err(CoreError::InsufficientStock {
                    product: name,
                    available,
                    requested: item.quantity,
                }
                .into());
            }
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: generate_order_number(),
            store_id: store_id.to_string(),
            status: OrderStatus::Pending,
            total_amount_cents: order_total(items).cents(),
            shipping_address: shipping_address.to_string(),
            notes,
            created_at: now,
            updated_at: now,
        };

        debug!(
            order_number = %order.order_number,
            items = items.len(),
            total_cents = order.total_amount_cents,
            "Creating order"
        );

        // A generated order_number colliding under concurrent creation hits
        // the unique index here and surfaces as UniqueViolation.
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, store_id, status, total_amount_cents,
                shipping_address, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.store_id)
        .bind(order.status)
        .bind(order.total_amount_cents)
        .bind(&order.shipping_address)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut stored_items = Vec::with_capacity(items.len());
        for item in items {
            let stored = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                subtotal_cents: item.subtotal_cents,
            };

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, quantity, unit_price_cents, subtotal_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&stored.id)
            .bind(&stored.order_id)
            .bind(&stored.product_id)
            .bind(stored.quantity)
            .bind(stored.unit_price_cents)
            .bind(stored.subtotal_cents)
            .execute(&mut *tx)
            .await?;

            stored_items.push(stored);
        }

        tx.commit().await?;

        Ok((order, stored_items))
    }

    // =========================================================================
    // Status Transitions
    // =========================================================================

    /// Confirms a pending order and deducts stock for every line.
    ///
    /// The status write and the full deduction loop share one transaction:
    /// a failure anywhere rolls back everything, so partial deduction
    /// across items cannot survive.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - order doesn't exist
    /// * `Err(DbError::Domain(AlreadyConfirmed))` - order is not pending;
    ///   deduction fires at most once per order
    pub async fn confirm(&self, order_id: &str) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'confirmed', updated_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish "absent" from "wrong state" for the caller.
            let status: Option<OrderStatus> =
                sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                    .bind(order_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return match status {
                None => Err(DbError::not_found("Order", order_id)),
                Some(status) => Err(CoreError::AlreadyConfirmed {
                    order_id: order_id.to_string(),
                    current_status: status.to_string(),
                }
                .into()),
            };
        }

        let lines: Vec<(String, i64)> =
            sqlx::query_as("SELECT product_id, quantity FROM order_items WHERE order_id = ?1")
                .bind(order_id)
                .fetch_all(&mut *tx)
                .await?;

        for (product_id, quantity) in &lines {
            let deducted = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(product_id)
            .bind(quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            // Product hard-deleted since the order was placed: skip the line.
            if deducted.rows_affected() == 0 {
                warn!(order_id = %order_id, product_id = %product_id,
                    "Product missing at confirm time, skipping deduction");
            }
        }

        tx.commit().await?;

        debug!(order_id = %order_id, lines = lines.len(), "Order confirmed, stock deducted");

        self.get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    /// Sets an order's status without side effects.
    ///
    /// Every transition except `* → confirmed` is an unconditional
    /// overwrite; the confirm path lives in [`Self::confirm`].
    pub async fn set_status(&self, order_id: &str, status: OrderStatus) -> DbResult<Order> {
        debug!(order_id = %order_id, status = %status, "Setting order status");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        self.get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by its business number.
    pub async fn get_by_order_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price_cents, subtotal_cents
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists all orders, paginated.
    pub async fn list_all(&self, offset: i64, limit: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            ORDER BY created_at, id
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists one store's orders, paginated.
    pub async fn list_by_store(
        &self,
        store_id: &str,
        offset: i64,
        limit: i64,
    ) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE store_id = ?1
            ORDER BY created_at, id
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(store_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists orders in a given status, paginated.
    pub async fn list_by_status(
        &self,
        status: OrderStatus,
        offset: i64,
        limit: i64,
    ) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE status = ?1
            ORDER BY created_at, id
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

// =============================================================================
// Order Number Generation
// =============================================================================

/// Generates an order number in format: `ORD-YYYYMMDD-xxxxxxxx`
///
/// ## Format
/// - YYYYMMDD: UTC date
/// - xxxxxxxx: first 8 hex chars of a fresh UUID v4
///
/// Collision-resistant, not collision-proof: the unique index on
/// `orders.order_number` is the authority under concurrent creation.
fn generate_order_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", date, &suffix[..8])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::generate_order_number;
    use crate::error::DbError;
    use crate::repository::testing;
    use vendo_core::{CoreError, NewOrderItem, OrderStatus, Role};

    fn line(product_id: &str, quantity: i64, unit_price_cents: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents,
            subtotal_cents: quantity * unit_price_cents,
        }
    }

    /// store + manufacturer + two products (stock 5 and 10).
    async fn seed(db: &crate::pool::Database) -> (String, String, String) {
        let store = testing::user(Role::Store, "store@example.com");
        let maker = testing::user(Role::Manufacturer, "maker@example.com");
        db.users().insert(&store).await.unwrap();
        db.users().insert(&maker).await.unwrap();

        let a = testing::product(&maker.id, "PROD-A", "9000000000001", 5);
        let b = testing::product(&maker.id, "PROD-B", "9000000000002", 10);
        db.products().insert(&a).await.unwrap();
        db.products().insert(&b).await.unwrap();

        (store.id, a.id, b.id)
    }

    #[tokio::test]
    async fn test_create_computes_total_and_persists_all_items() {
        let db = testing::test_db().await;
        let (store_id, a, b) = seed(&db).await;

        let items = vec![line(&a, 2, 1000), line(&b, 3, 500)];
        let (order, stored) = db
            .orders()
            .create_with_items(&store_id, "1 Main St", None, &items)
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount_cents, 2 * 1000 + 3 * 500);
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(stored.len(), 2);

        let fetched = db.orders().get_items(&order.id).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].product_id, a);
        assert_eq!(fetched[1].product_id, b);

        // Stock is checked, not reserved: quantities untouched.
        assert_eq!(db.products().get_by_id(&a).await.unwrap().unwrap().quantity, 5);
        assert_eq!(db.products().get_by_id(&b).await.unwrap().unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_create_fails_fast_on_missing_product() {
        let db = testing::test_db().await;
        let (store_id, a, _) = seed(&db).await;

        let items = vec![line(&a, 1, 1000), line("ghost", 1, 1000)];
        let err = db
            .orders()
            .create_with_items(&store_id, "1 Main St", None, &items)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(ref id)) if id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_create_is_all_or_nothing_on_insufficient_stock() {
        let db = testing::test_db().await;
        let (store_id, a, b) = seed(&db).await;

        // First line is valid, second exceeds stock (10 available).
        let items = vec![line(&a, 2, 1000), line(&b, 11, 500)];
        let err = db
            .orders()
            .create_with_items(&store_id, "1 Main St", None, &items)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            })
        ));

        // Nothing persisted.
        assert!(db.orders().list_all(0, 100).await.unwrap().is_empty());
        assert!(db
            .orders()
            .get_items("any")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_confirm_decrements_each_line_exactly_once() {
        let db = testing::test_db().await;
        let (store_id, a, b) = seed(&db).await;

        let items = vec![line(&a, 3, 1000), line(&b, 2, 500)];
        let (order, _) = db
            .orders()
            .create_with_items(&store_id, "1 Main St", None, &items)
            .await
            .unwrap();

        let confirmed = db.orders().confirm(&order.id).await.unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        assert_eq!(db.products().get_by_id(&a).await.unwrap().unwrap().quantity, 2);
        assert_eq!(db.products().get_by_id(&b).await.unwrap().unwrap().quantity, 8);

        // Re-confirmation is rejected; no double deduction.
        let err = db.orders().confirm(&order.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::AlreadyConfirmed { .. })
        ));
        assert_eq!(db.products().get_by_id(&a).await.unwrap().unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_confirm_skips_deleted_product_lines() {
        let db = testing::test_db().await;
        let (store_id, a, b) = seed(&db).await;

        let items = vec![line(&a, 1, 1000), line(&b, 4, 500)];
        let (order, _) = db
            .orders()
            .create_with_items(&store_id, "1 Main St", None, &items)
            .await
            .unwrap();

        // Product A disappears between creation and confirmation.
        db.products().remove(&a).await.unwrap();

        let confirmed = db.orders().confirm(&order.id).await.unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        // B still deducted, A silently skipped.
        assert_eq!(db.products().get_by_id(&b).await.unwrap().unwrap().quantity, 6);
    }

    #[tokio::test]
    async fn test_confirm_missing_order() {
        let db = testing::test_db().await;
        seed(&db).await;

        let err = db.orders().confirm("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_status_is_unconditional_overwrite() {
        let db = testing::test_db().await;
        let (store_id, a, _) = seed(&db).await;

        let (order, _) = db
            .orders()
            .create_with_items(&store_id, "1 Main St", None, &[line(&a, 1, 1000)])
            .await
            .unwrap();

        let shipped = db
            .orders()
            .set_status(&order.id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);

        // No gating: shipped → cancelled is allowed.
        let cancelled = db
            .orders()
            .set_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        // And no deduction ever fired.
        assert_eq!(db.products().get_by_id(&a).await.unwrap().unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_list_scoping() {
        let db = testing::test_db().await;
        let (store_id, a, _) = seed(&db).await;

        let other_store = testing::user(Role::Store, "other@example.com");
        db.users().insert(&other_store).await.unwrap();

        let (mine, _) = db
            .orders()
            .create_with_items(&store_id, "1 Main St", None, &[line(&a, 1, 1000)])
            .await
            .unwrap();
        let (theirs, _) = db
            .orders()
            .create_with_items(&other_store.id, "2 Side St", None, &[line(&a, 1, 1000)])
            .await
            .unwrap();

        db.orders().confirm(&theirs.id).await.unwrap();

        let by_store = db.orders().list_by_store(&store_id, 0, 100).await.unwrap();
        assert_eq!(by_store.len(), 1);
        assert_eq!(by_store[0].id, mine.id);

        let pending = db
            .orders()
            .list_by_status(OrderStatus::Pending, 0, 100)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, mine.id);

        assert_eq!(db.orders().list_all(0, 100).await.unwrap().len(), 2);

        let by_number = db
            .orders()
            .get_by_order_number(&mine.order_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.id, mine.id);
    }

    #[test]
    fn test_order_number_format() {
        let n = generate_order_number();
        // ORD-YYYYMMDD-xxxxxxxx
        assert_eq!(n.len(), 4 + 8 + 1 + 8);
        assert!(n.starts_with("ORD-"));
        assert_ne!(n, generate_order_number());
    }
}
