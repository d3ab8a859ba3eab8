//! Account subsystem tests over an in-memory store.

use std::path::PathBuf;

use subvox::account::{AccountService, DatabaseConnection};
use subvox::config::AuthConfig;

fn test_service() -> AccountService {
    let db = DatabaseConnection::new_in_memory().expect("in-memory database");
    AccountService::with_connection(
        db,
        AuthConfig {
            database_path: PathBuf::from(":memory:"),
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_days: 7,
            reset_token_expiry_minutes: 60,
            reset_link_base: "http://localhost:3000/reset-password".to_string(),
        },
    )
}

#[tokio::test]
async fn register_then_login_roundtrip() {
    let service = test_service();

    service
        .register("user@example.com", "hunter2")
        .await
        .expect("registration should succeed");

    let (token, email) = service
        .login("user@example.com", "hunter2")
        .await
        .expect("login should succeed");

    assert_eq!(email, "user@example.com");

    let user = service
        .verify_token(&token)
        .await
        .expect("issued token should verify");
    assert_eq!(user.email, "user@example.com");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let service = test_service();
    service.register("user@example.com", "hunter2").await.unwrap();

    assert!(service.login("user@example.com", "wrong").await.is_err());
    assert!(service.login("nobody@example.com", "hunter2").await.is_err());
}

#[tokio::test]
async fn register_normalizes_email_and_rejects_duplicates() {
    let service = test_service();

    service
        .register("  User@Example.COM ", "hunter2")
        .await
        .expect("registration should succeed");

    // Same address modulo case/whitespace is a duplicate.
    assert!(service.register("user@example.com", "other").await.is_err());

    // And the normalized form logs in.
    service
        .login("user@example.com", "hunter2")
        .await
        .expect("normalized email should log in");
}

#[tokio::test]
async fn password_reset_flow_is_single_use() {
    let service = test_service();
    service.register("user@example.com", "oldpass").await.unwrap();

    let token = service
        .forgot_password("user@example.com")
        .await
        .expect("forgot-password should succeed")
        .expect("known email should yield a token");

    service
        .reset_password(&token, "newpass")
        .await
        .expect("reset should succeed");

    // Old password is gone, new one works.
    assert!(service.login("user@example.com", "oldpass").await.is_err());
    service.login("user@example.com", "newpass").await.unwrap();

    // The token is spent.
    assert!(service.reset_password(&token, "again").await.is_err());
}

#[tokio::test]
async fn forgot_password_does_not_reveal_unknown_emails() {
    let service = test_service();

    let token = service
        .forgot_password("nobody@example.com")
        .await
        .expect("forgot-password should not error");

    assert!(token.is_none());
}

#[tokio::test]
async fn reset_rejects_bogus_tokens() {
    let service = test_service();
    service.register("user@example.com", "hunter2").await.unwrap();

    assert!(service.reset_password("not-a-token", "x").await.is_err());
    assert!(service.reset_password("", "x").await.is_err());
}

#[tokio::test]
async fn change_password_requires_the_old_one() {
    let service = test_service();
    service.register("user@example.com", "hunter2").await.unwrap();

    let (token, _) = service.login("user@example.com", "hunter2").await.unwrap();
    let user = service.verify_token(&token).await.unwrap();

    assert!(
        service
            .change_password(&user, "wrong-old", "newpass")
            .await
            .is_err()
    );

    service
        .change_password(&user, "hunter2", "newpass")
        .await
        .expect("change with correct old password should succeed");

    service.login("user@example.com", "newpass").await.unwrap();
}
