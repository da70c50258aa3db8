use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::Account;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn account(&self) -> Account {
        Account {
            username: self.username.clone(),
            phone: self.phone.clone(),
        }
    }

    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, phone, password_hash, token, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find the one user holding a bearer token.
    pub async fn find_by_token(db: &PgPool, token: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, phone, password_hash, token, created_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password and freshly minted token.
    pub async fn create(
        db: &PgPool,
        email: &str,
        username: &str,
        phone: Option<&str>,
        password_hash: &str,
        token: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, phone, password_hash, token)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, username, phone, password_hash, token, created_at
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(phone)
        .bind(password_hash)
        .bind(token)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}
