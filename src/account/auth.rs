//! Password hashing and bearer-token helpers.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Result, SubvoxError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: usize,
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Pre-hash raw passwords so arbitrarily long inputs reduce to a fixed-size
/// digest before salting.
fn preprocess_password(raw: &str) -> String {
    sha256_hex(raw)
}

/// Hash a password with a fresh random salt. Stored as `salt$digest`.
pub fn hash_password(raw: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = sha256_hex(&format!("{}{}", salt, preprocess_password(raw)));
    format!("{}${}", salt, digest)
}

/// Verify a password against a stored `salt$digest` hash.
pub fn verify_password(raw: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    sha256_hex(&format!("{}{}", salt, preprocess_password(raw))) == digest
}

/// Hash a reset token for storage; only the hash ever touches the database.
pub fn hash_token(token: &str) -> String {
    sha256_hex(token)
}

/// Generate opaque reset-token material.
pub fn generate_reset_token() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// Issue an HS256 bearer token carrying the user's email.
pub fn create_jwt(email: &str, secret: &str, expiry_days: i64) -> Result<String> {
    let expiry = chrono::Utc::now() + chrono::Duration::days(expiry_days);
    let claims = Claims {
        email: email.to_string(),
        exp: expiry.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SubvoxError::Auth(format!("Failed to issue token: {}", e)))
}

/// Decode and validate a bearer token. Expiry is checked; internal detail is
/// not surfaced to the caller.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            SubvoxError::Auth("Token expired".to_string())
        }
        _ => SubvoxError::Auth("Invalid token".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn test_password_hashes_are_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_verify_rejects_malformed_stored_hash() {
        assert!(!verify_password("anything", "not-a-valid-entry"));
    }

    #[test]
    fn test_jwt_roundtrip() {
        let token = create_jwt("user@example.com", "secret", 7).unwrap();
        let claims = decode_jwt(&token, "secret").unwrap();
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn test_jwt_rejects_wrong_secret() {
        let token = create_jwt("user@example.com", "secret", 7).unwrap();
        assert!(decode_jwt(&token, "other-secret").is_err());
    }
}
