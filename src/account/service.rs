//! Account operations: registration, login, password reset.
//!
//! Responses stay deliberately uniform ("Invalid email or password", the
//! non-revealing forgot-password message); anything more specific is logged,
//! not returned.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::{Result, SubvoxError};
use super::auth;
use super::connection::DatabaseConnection;
use super::repository::AccountRepository;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
}

pub struct AccountService {
    repository: AccountRepository,
    config: AuthConfig,
}

impl AccountService {
    pub fn new(config: AuthConfig) -> Result<Self> {
        let db = DatabaseConnection::new(&config.database_path)?;
        Ok(Self {
            repository: AccountRepository::new(db),
            config,
        })
    }

    /// Build a service over an existing connection (tests use in-memory).
    pub fn with_connection(db: DatabaseConnection, config: AuthConfig) -> Self {
        Self {
            repository: AccountRepository::new(db),
            config,
        }
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Register a new user. Email is normalized so casing/whitespace can't
    /// create duplicate accounts.
    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        let email = Self::normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(SubvoxError::InvalidRequest(
                "Email and password required".to_string(),
            ));
        }

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(SubvoxError::Auth(
                "Email already registered. Try logging in.".to_string(),
            ));
        }

        let password_hash = auth::hash_password(password);
        self.repository.insert_user(&email, &password_hash).await?;

        info!("Registered user: {}", email);
        Ok(())
    }

    /// Log in and issue a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, String)> {
        let email = Self::normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(SubvoxError::InvalidRequest(
                "Email and password required".to_string(),
            ));
        }

        let Some(user) = self.repository.find_by_email(&email).await? else {
            warn!("Login attempt for unknown email: {}", email);
            return Err(SubvoxError::Auth("Invalid email or password".to_string()));
        };

        if !auth::verify_password(password, &user.password_hash) {
            warn!("Password mismatch for: {}", email);
            return Err(SubvoxError::Auth("Invalid email or password".to_string()));
        }

        let token = auth::create_jwt(&email, &self.config.jwt_secret, self.config.jwt_expiry_days)?;
        info!("Login success: {}", email);
        Ok((token, email))
    }

    /// Create a single-use reset token for the account, if it exists.
    ///
    /// Returns `None` for unknown emails so callers can answer without
    /// revealing whether the address is registered.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
        let email = Self::normalize_email(email);

        let Some(user) = self.repository.find_by_email(&email).await? else {
            return Ok(None);
        };

        let raw_token = auth::generate_reset_token();
        let token_hash = auth::hash_token(&raw_token);
        let expires_at =
            Utc::now() + chrono::Duration::minutes(self.config.reset_token_expiry_minutes);

        self.repository
            .insert_reset_token(user.id, &token_hash, &expires_at.to_rfc3339())
            .await?;

        Ok(Some(raw_token))
    }

    /// The link a reset email (or the dev-mode log line) should carry.
    pub fn reset_link(&self, raw_token: &str) -> String {
        format!("{}?token={}", self.config.reset_link_base, raw_token)
    }

    /// Redeem a reset token and set a new password.
    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> Result<()> {
        if raw_token.is_empty() || new_password.is_empty() {
            return Err(SubvoxError::InvalidRequest(
                "Token and new password are required".to_string(),
            ));
        }

        let token_hash = auth::hash_token(raw_token);
        let Some(token) = self.repository.find_reset_token(&token_hash).await? else {
            return Err(SubvoxError::Auth("Invalid or expired token".to_string()));
        };

        if token.used {
            return Err(SubvoxError::Auth("Invalid or expired token".to_string()));
        }

        let expires_at = DateTime::parse_from_rfc3339(&token.expires_at)
            .map_err(|_| SubvoxError::Auth("Invalid or expired token".to_string()))?;
        if Utc::now() > expires_at {
            return Err(SubvoxError::Auth("Invalid or expired token".to_string()));
        }

        let password_hash = auth::hash_password(new_password);
        self.repository
            .update_password(token.user_id, &password_hash)
            .await?;
        self.repository.mark_token_used(token.id).await?;

        info!("Password reset completed for user {}", token.user_id);
        Ok(())
    }

    /// Change the password of an authenticated user.
    pub async fn change_password(
        &self,
        user: &AuthenticatedUser,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let Some(record) = self.repository.find_by_id(user.id).await? else {
            return Err(SubvoxError::Auth("User not found".to_string()));
        };

        if !auth::verify_password(old_password, &record.password_hash) {
            return Err(SubvoxError::Auth("Old password incorrect".to_string()));
        }

        let password_hash = auth::hash_password(new_password);
        self.repository
            .update_password(user.id, &password_hash)
            .await?;

        Ok(())
    }

    /// Resolve a bearer token to the user it belongs to.
    pub async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = auth::decode_jwt(token, &self.config.jwt_secret)?;

        let Some(user) = self.repository.find_by_email(&claims.email).await? else {
            return Err(SubvoxError::Auth("User not found".to_string()));
        };

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
        })
    }
}
