//! # User Repository
//!
//! Database operations for accounts. Registration and login are plain
//! field-level persistence; the only invariant enforced here is email
//! uniqueness.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vendo_core::User;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, email, password_hash, full_name, role,
                company_name, phone, address, is_active, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by email (login path).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, email, password_hash, full_name, role,
                company_name, phone, address, is_active, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - email already registered
    pub async fn insert(&self, user: &User) -> DbResult<User> {
        debug!(email = %user.email, role = %user.role, "Inserting user");

        if self.get_by_email(&user.email).await?.is_some() {
            return Err(DbError::duplicate("email", &user.email));
        }

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, full_name, role,
                company_name, phone, address, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(&user.company_name)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::repository::testing;
    use vendo_core::Role;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = testing::test_db().await;
        let user = testing::user(Role::Store, "buyer@store.example");

        db.users().insert(&user).await.unwrap();

        let by_id = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "buyer@store.example");
        assert_eq!(by_id.role, Role::Store);

        let by_email = db
            .users()
            .get_by_email("buyer@store.example")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = testing::test_db().await;
        db.users()
            .insert(&testing::user(Role::Store, "dup@store.example"))
            .await
            .unwrap();

        let err = db
            .users()
            .insert(&testing::user(Role::Manufacturer, "dup@store.example"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let db = testing::test_db().await;
        assert!(db.users().get_by_id("nope").await.unwrap().is_none());
    }
}
