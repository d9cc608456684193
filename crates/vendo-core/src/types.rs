//! # Domain Types
//!
//! Core domain types used throughout Vendo B2B.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Product     │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  email (unique) │   │  sku (unique)   │   │  order_number   │       │
//! │  │  role           │   │  barcode       *│   │  status         │       │
//! │  │  is_active      │   │  quantity       │   │  total_amount   │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │ 1─*            │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │      Role       │   │   OrderStatus   │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Admin          │   │  Pending        │   │  quantity       │       │
//! │  │  Store          │   │  Confirmed      │   │  unit_price     │       │
//! │  │  Manufacturer   │   │  Shipped        │   │  subtotal       │       │
//! │  └─────────────────┘   │  Delivered      │   │  (price frozen  │       │
//! │                        │  Cancelled      │   │   at creation)  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, barcode, order_number, email) - human-readable,
//!   unique, and immutable once assigned

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// The closed set of user roles.
///
/// ## Why an enum?
/// Role-based dispatch via string comparison is fragile: a typo compiles.
/// A closed enum plus the policy table in [`crate::policy`] makes every
/// (role, action) pair an explicit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform operator. Unrestricted reads.
    Admin,
    /// Buyer: places orders against manufacturer catalogs.
    Store,
    /// Seller: owns products and fulfils orders.
    Manufacturer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Store => "store",
            Role::Manufacturer => "manufacturer",
        };
        f.write_str(s)
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account (admin, store, or manufacturer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login email - business identifier, unique.
    pub email: String,

    /// Argon2 hash of the password. Never serialized to clients.
    pub password_hash: String,

    /// Display name.
    pub full_name: String,

    /// Account role, fixed at registration.
    pub role: Role,

    /// Company name (stores and manufacturers).
    pub company_name: Option<String>,

    pub phone: Option<String>,

    pub address: Option<String>,

    /// Inactive accounts cannot log in or act.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product, owned by exactly one manufacturer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning manufacturer (User with role=manufacturer).
    pub manufacturer_id: String,

    /// Display name.
    pub name: String,

    pub description: Option<String>,

    /// Stock Keeping Unit - unique, immutable after creation.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.) - unique, immutable after creation.
    pub barcode: String,

    /// Sale price in cents, strictly positive.
    pub price_cents: i64,

    /// Cost price in cents, strictly positive when present.
    pub cost_cents: Option<i64>,

    /// Current stock level. Mutated only through atomic adjustments.
    pub quantity: i64,

    /// Reorder threshold: quantity <= min_quantity means "low stock".
    pub min_quantity: i64,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the product is at or below its reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

/// Partial update for a product.
///
/// `sku` and `barcode` are deliberately absent: they are immutable
/// identifiers once assigned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub cost_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub min_quantity: Option<i64>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a purchase order.
///
/// Lifecycle: `pending → confirmed → shipped → delivered`, plus
/// `pending/confirmed → cancelled`. Only the transition **into**
/// `confirmed` carries a side effect (stock deduction), and it fires
/// at most once per order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A purchase order placed by a store.
///
/// `total_amount_cents` is derived once at creation time (sum of line
/// subtotals) and never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,

    /// Globally unique, generated, immutable (e.g. `ORD-20260829-1f2e3d4c`).
    pub order_number: String,

    /// Owning store (User with role=store).
    pub store_id: String,

    pub status: OrderStatus,

    /// Sum of line subtotals, captured at creation.
    pub total_amount_cents: i64,

    pub shipping_address: String,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item belonging to exactly one order.
///
/// Snapshot semantics: `unit_price_cents` and `subtotal_cents` are captured
/// at order-creation time and do not track later product price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Units ordered, strictly positive.
    pub quantity: i64,
    /// Unit price in cents at order time (frozen).
    pub unit_price_cents: i64,
    /// Line subtotal in cents, caller-supplied (frozen).
    pub subtotal_cents: i64,
}

/// Input for one order line at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// Computes an order total from its line inputs.
///
/// The subtotals are caller-supplied and summed exactly - the total is
/// *not* re-derived from price × quantity.
pub fn order_total(items: &[NewOrderItem]) -> Money {
    items
        .iter()
        .map(|i| Money::from_cents(i.subtotal_cents))
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(subtotal_cents: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: "p1".to_string(),
            quantity: 1,
            unit_price_cents: subtotal_cents,
            subtotal_cents,
        }
    }

    #[test]
    fn test_order_total_is_exact_sum_of_subtotals() {
        let items = vec![item(2000), item(1500), item(499)];
        assert_eq!(order_total(&items).cents(), 3999);
        assert_eq!(order_total(&[]).cents(), 0);
    }

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        let now = Utc::now();
        let mut product = Product {
            id: "p1".to_string(),
            manufacturer_id: "m1".to_string(),
            name: "Widget".to_string(),
            description: None,
            sku: "WID-1".to_string(),
            barcode: "4006381333931".to_string(),
            price_cents: 1000,
            cost_cents: None,
            quantity: 5,
            min_quantity: 5,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(product.is_low_stock());

        product.quantity = 6;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_status_default_and_display() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(OrderStatus::Confirmed.to_string(), "confirmed");
        assert_eq!(Role::Manufacturer.to_string(), "manufacturer");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Store).unwrap();
        assert_eq!(json, "\"store\"");
        let role: Role = serde_json::from_str("\"manufacturer\"").unwrap();
        assert_eq!(role, Role::Manufacturer);
    }
}
