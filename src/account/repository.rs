//! Data access for users and password-reset tokens.

use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use crate::error::Result;
use super::DatabaseConnection;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct ResetTokenRecord {
    pub id: i64,
    pub user_id: i64,
    pub expires_at: String,
    pub used: bool,
}

#[derive(Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let email = email.to_string();
        self.db
            .execute_async(move |conn| {
                let user = conn
                    .query_row(
                        "SELECT id, email, password FROM users WHERE email = ?1",
                        params![email],
                        |row| {
                            Ok(UserRecord {
                                id: row.get(0)?,
                                email: row.get(1)?,
                                password_hash: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(user)
            })
            .await
    }

    pub async fn find_by_id(&self, user_id: i64) -> Result<Option<UserRecord>> {
        self.db
            .execute_async(move |conn| {
                let user = conn
                    .query_row(
                        "SELECT id, email, password FROM users WHERE id = ?1",
                        params![user_id],
                        |row| {
                            Ok(UserRecord {
                                id: row.get(0)?,
                                email: row.get(1)?,
                                password_hash: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(user)
            })
            .await
    }

    pub async fn insert_user(&self, email: &str, password_hash: &str) -> Result<i64> {
        let email = email.to_string();
        let password_hash = password_hash.to_string();
        self.db
            .execute_async(move |conn| {
                let now = Utc::now().to_rfc3339();
                conn.execute(
                    "INSERT INTO users (email, password, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                    params![email, password_hash, now],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
    }

    pub async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<()> {
        let password_hash = password_hash.to_string();
        self.db
            .execute_async(move |conn| {
                let now = Utc::now().to_rfc3339();
                conn.execute(
                    "UPDATE users SET password = ?1, updated_at = ?2 WHERE id = ?3",
                    params![password_hash, now, user_id],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn insert_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: &str,
    ) -> Result<()> {
        let token_hash = token_hash.to_string();
        let expires_at = expires_at.to_string();
        self.db
            .execute_async(move |conn| {
                let now = Utc::now().to_rfc3339();
                conn.execute(
                    "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![user_id, token_hash, expires_at, now],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn find_reset_token(&self, token_hash: &str) -> Result<Option<ResetTokenRecord>> {
        let token_hash = token_hash.to_string();
        self.db
            .execute_async(move |conn| {
                let token = conn
                    .query_row(
                        "SELECT id, user_id, expires_at, used FROM password_reset_tokens
                         WHERE token_hash = ?1 ORDER BY id DESC LIMIT 1",
                        params![token_hash],
                        |row| {
                            Ok(ResetTokenRecord {
                                id: row.get(0)?,
                                user_id: row.get(1)?,
                                expires_at: row.get(2)?,
                                used: row.get::<_, i64>(3)? != 0,
                            })
                        },
                    )
                    .optional()?;
                Ok(token)
            })
            .await
    }

    pub async fn mark_token_used(&self, token_id: i64) -> Result<()> {
        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "UPDATE password_reset_tokens SET used = 1 WHERE id = ?1",
                    params![token_id],
                )?;
                Ok(())
            })
            .await
    }
}
