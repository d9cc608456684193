//! # Access Policy
//!
//! Role-based access policy for Vendo B2B.
//!
//! ## Policy Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             Action × Role (✓ = allowed, · = denied)                     │
//! │                                                                         │
//! │  Action              Admin   Store   Manufacturer                       │
//! │  ──────────────────  ─────   ─────   ────────────                       │
//! │  ListProducts          ✓       ✓         ✓  (own catalog)               │
//! │  ReadProduct           ✓       ✓         ✓                              │
//! │  CreateProduct         ·       ·         ✓                              │
//! │  UpdateProduct         ·       ·         ✓  (own only)                  │
//! │  DeleteProduct         ·       ·         ✓  (own only)                  │
//! │  AdjustStock           ·       ·         ✓  (own only)                  │
//! │  ListLowStock          ·       ·         ✓                              │
//! │  ListOrders            ✓       ✓         ✓  (scoped per role)           │
//! │  ReadOrder             ✓       ✓ (own)   ✓                              │
//! │  CreateOrder           ·       ✓         ·                              │
//! │  UpdateOrderStatus     ·       ·         ✓                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ownership ("own only" above) is a second check on top of this table,
//! performed by the caller once the resource is loaded - existence is
//! checked before ownership, so clients see 404 before 403.

use crate::error::{CoreError, CoreResult};
use crate::types::Role;

// =============================================================================
// Actions
// =============================================================================

/// Every operation the API exposes, as a closed set.
///
/// The policy is a total function over (Role, Action): adding a variant
/// here forces the match below to be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListProducts,
    ReadProduct,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    AdjustStock,
    ListLowStock,
    ListOrders,
    ReadOrder,
    CreateOrder,
    UpdateOrderStatus,
}

impl Action {
    /// Human-readable action name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Action::ListProducts => "list products",
            Action::ReadProduct => "read product",
            Action::CreateProduct => "create product",
            Action::UpdateProduct => "update product",
            Action::DeleteProduct => "delete product",
            Action::AdjustStock => "adjust stock",
            Action::ListLowStock => "list low-stock products",
            Action::ListOrders => "list orders",
            Action::ReadOrder => "read order",
            Action::CreateOrder => "create order",
            Action::UpdateOrderStatus => "update order status",
        }
    }
}

// =============================================================================
// Policy Evaluation
// =============================================================================

/// The policy table: pure function of (role, action) → allow/deny.
pub fn allows(role: Role, action: Action) -> bool {
    use Action::*;

    match role {
        // Admin: unrestricted reads, no mutations.
        Role::Admin => matches!(action, ListProducts | ReadProduct | ListOrders | ReadOrder),

        // Store: orders for itself, read-only catalog access.
        Role::Store => matches!(
            action,
            ListProducts | ReadProduct | ListOrders | ReadOrder | CreateOrder
        ),

        // Manufacturer: full control of its own catalog, order fulfilment.
        Role::Manufacturer => matches!(
            action,
            ListProducts
                | ReadProduct
                | CreateProduct
                | UpdateProduct
                | DeleteProduct
                | AdjustStock
                | ListLowStock
                | ListOrders
                | ReadOrder
                | UpdateOrderStatus
        ),
    }
}

/// Evaluates the policy table, producing a `Forbidden` error on denial.
pub fn authorize(role: Role, action: Action) -> CoreResult<()> {
    if allows(role, action) {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            role: role.to_string(),
            action: action.name().to_string(),
        })
    }
}

/// Ownership check for a loaded resource.
///
/// Call only after the resource is known to exist (404 before 403).
pub fn ensure_owner(owner_id: &str, user_id: &str, entity: &str, id: &str) -> CoreResult<()> {
    if owner_id == user_id {
        Ok(())
    } else {
        Err(CoreError::NotOwner {
            entity: entity.to_string(),
            id: id.to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_permissions() {
        assert!(allows(Role::Store, Action::CreateOrder));
        assert!(allows(Role::Store, Action::ReadProduct));
        assert!(allows(Role::Store, Action::ListOrders));

        assert!(!allows(Role::Store, Action::CreateProduct));
        assert!(!allows(Role::Store, Action::UpdateProduct));
        assert!(!allows(Role::Store, Action::UpdateOrderStatus));
        assert!(!allows(Role::Store, Action::AdjustStock));
    }

    #[test]
    fn test_manufacturer_permissions() {
        assert!(allows(Role::Manufacturer, Action::CreateProduct));
        assert!(allows(Role::Manufacturer, Action::DeleteProduct));
        assert!(allows(Role::Manufacturer, Action::AdjustStock));
        assert!(allows(Role::Manufacturer, Action::ListLowStock));
        assert!(allows(Role::Manufacturer, Action::UpdateOrderStatus));

        assert!(!allows(Role::Manufacturer, Action::CreateOrder));
    }

    #[test]
    fn test_admin_is_read_only() {
        assert!(allows(Role::Admin, Action::ListOrders));
        assert!(allows(Role::Admin, Action::ListProducts));

        assert!(!allows(Role::Admin, Action::CreateProduct));
        assert!(!allows(Role::Admin, Action::CreateOrder));
        assert!(!allows(Role::Admin, Action::UpdateOrderStatus));
    }

    #[test]
    fn test_authorize_produces_forbidden() {
        let err = authorize(Role::Store, Action::CreateProduct).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
        assert_eq!(
            err.to_string(),
            "Role store is not permitted to create product"
        );
    }

    #[test]
    fn test_ensure_owner() {
        assert!(ensure_owner("u1", "u1", "Product", "p1").is_ok());

        let err = ensure_owner("u1", "u2", "Product", "p1").unwrap_err();
        assert!(matches!(err, CoreError::NotOwner { .. }));
    }
}
