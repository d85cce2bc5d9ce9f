//! # User Repository
//!
//! Operator accounts. The password hash never leaves this crate's
//! [`UserAccount`]; everything shown to clients is a [`User`] or a
//! [`UserSummary`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockfast_core::{User, UserRole};

/// A stored account, including its argon2 PHC hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for User {
    fn from(account: UserAccount) -> Self {
        User {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            created_at: account.created_at,
        }
    }
}

/// The creator block nested in product details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts an account.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` on `users.email`
    pub async fn insert(&self, account: &UserAccount) -> DbResult<()> {
        debug!(user_id = %account.id, "Creating user account");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<UserAccount>> {
        let account = sqlx::query_as::<_, UserAccount>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn summary(&self, id: &str) -> DbResult<Option<UserSummary>> {
        let summary =
            sqlx::query_as::<_, UserSummary>("SELECT id, name, email FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;

    fn account(email: &str) -> UserAccount {
        UserAccount {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Awa".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            role: UserRole::Vendor,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let acc = account("awa@stockfast.cm");
        db.users().insert(&acc).await.unwrap();

        let found = db.users().find_by_email("awa@stockfast.cm").await.unwrap().unwrap();
        assert_eq!(found.password_hash, acc.password_hash);

        let user = db.users().get_by_id(&acc.id).await.unwrap().unwrap();
        assert_eq!(user.role, UserRole::Vendor);

        let summary = db.users().summary(&acc.id).await.unwrap().unwrap();
        assert_eq!(summary.email, "awa@stockfast.cm");
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = test_db().await;
        db.users().insert(&account("dup@stockfast.cm")).await.unwrap();
        let err = db.users().insert(&account("dup@stockfast.cm")).await.unwrap_err();
        assert!(err.is_unique_violation_on("users.email"));
    }
}
