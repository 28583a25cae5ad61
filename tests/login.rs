mod common;

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use chrono::Utc;
use common::{auth_config, auth_with_admin, login_request, ADMIN, ONE_DAY, PASSWORD};
use portfolio_guard::{Auth, AuthConfig, AuthError, Credential, CredentialStore, Username};

#[tokio::test]
async fn correct_password_issues_token_for_subject() {
    let auth = auth_with_admin().await;

    let before = Utc::now();
    let response = auth.login(&login_request(ADMIN, PASSWORD)).await.unwrap();
    let after = Utc::now();

    assert_eq!(response.username, Username(ADMIN.into()));
    assert_eq!(auth.authenticate(&response.token), Some(Username(ADMIN.into())));
    assert!(auth.validate_token(&response.token, &Username(ADMIN.into())));

    let one_day = chrono::Duration::hours(24);
    // expiry carries whole seconds only
    assert!(response.expires_at >= before + one_day - chrono::Duration::seconds(1));
    assert!(response.expires_at <= after + one_day);
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let auth = auth_with_admin().await;

    let unknown = auth
        .login(&login_request("nobody", PASSWORD))
        .await
        .unwrap_err();
    let wrong = auth
        .login(&login_request(ADMIN, "hunter2"))
        .await
        .unwrap_err();

    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(unknown.to_string(), "Invalid username or password");
}

#[tokio::test]
async fn token_stops_validating_at_expiry() {
    let auth = auth_with_admin().await;
    let admin = Username(ADMIN.into());
    let issued_at = UNIX_EPOCH + Duration::from_secs(1_750_000_000);

    let response = auth
        .login_at(&login_request(ADMIN, PASSWORD), issued_at)
        .await
        .unwrap();

    assert_eq!(response.expires_at.timestamp(), 1_750_000_000 + 86_400);
    assert!(auth.validate_token_at(&response.token, &admin, issued_at));
    assert!(auth.validate_token_at(
        &response.token,
        &admin,
        issued_at + ONE_DAY - Duration::from_secs(1)
    ));
    assert!(!auth.validate_token_at(&response.token, &admin, issued_at + ONE_DAY));
    assert!(!auth.validate_token_at(
        &response.token,
        &admin,
        issued_at + ONE_DAY + Duration::from_secs(60)
    ));
}

#[tokio::test]
async fn tampered_signature_is_rejected() {
    let auth = auth_with_admin().await;
    let admin = Username(ADMIN.into());
    let token = auth
        .login(&login_request(ADMIN, PASSWORD))
        .await
        .unwrap()
        .token;

    let signature_start = token.rfind('.').unwrap() + 1;
    let mut tampered = token.clone().into_bytes();
    tampered[signature_start] = if tampered[signature_start] == b'A' {
        b'B'
    } else {
        b'A'
    };
    let tampered = String::from_utf8(tampered).unwrap();

    assert_ne!(tampered, token);
    assert!(auth.validate_token(&token, &admin));
    assert!(!auth.validate_token(&tampered, &admin));
    assert_eq!(auth.authenticate(&tampered), None);
}

#[tokio::test]
async fn tampered_payload_is_rejected() {
    let auth = auth_with_admin().await;
    let token = auth
        .login(&login_request(ADMIN, PASSWORD))
        .await
        .unwrap()
        .token;

    // swap in the payload of a token issued to another subject
    let (other, _) = auth
        .issue_token(&Username("intruder".into()), SystemTime::now())
        .unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    assert_eq!(auth.authenticate(&forged), None);
}

#[tokio::test]
async fn token_from_another_deployment_is_rejected() {
    let auth = auth_with_admin().await;
    let token = auth
        .login(&login_request(ADMIN, PASSWORD))
        .await
        .unwrap()
        .token;

    let other = Auth::new(AuthConfig {
        token_secret: "a different secret".into(),
        ..auth_config()
    });

    assert!(!other.validate_token(&token, &Username(ADMIN.into())));
}

struct UnavailableStore;

#[async_trait]
impl CredentialStore for UnavailableStore {
    async fn find_by_subject(
        &self,
        _username: &Username,
    ) -> Result<Option<Credential>, Box<dyn Error + Send + Sync>> {
        Err("connection refused".into())
    }

    async fn create_if_not_exists(
        &self,
        _credential: Credential,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Err("connection refused".into())
    }
}

#[tokio::test]
async fn store_failure_is_not_reported_as_bad_credentials() {
    let auth = Auth::new(AuthConfig {
        credential_store: Arc::new(UnavailableStore),
        ..auth_config()
    });

    let error = auth
        .login(&login_request(ADMIN, PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(error, AuthError::Store { .. }));
}
