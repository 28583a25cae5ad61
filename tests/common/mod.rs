#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use portfolio_guard::{
    Auth, AuthConfig, Credential, InMemoryCredentialStore, LoginRequest, Username,
    DEFAULT_TOKEN_LIFETIME,
};

pub const ADMIN: &str = "admin";
pub const PASSWORD: &str = "correct horse battery staple";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        token_issuer: "portfolio-backend-tests".into(),
        token_secret: "this is a test-only secret".into(),
        token_lifetime: DEFAULT_TOKEN_LIFETIME,
        credential_store: Arc::new(InMemoryCredentialStore::new()),
    }
}

/// An [`Auth`] whose store holds a single admin with [`PASSWORD`].
pub async fn auth_with_admin() -> Auth {
    let auth = Auth::new(auth_config());

    let credential = Credential {
        username: Username(ADMIN.into()),
        password_hash: auth.hash_password(PASSWORD).unwrap(),
    };
    let created = auth
        .credential_store()
        .create_if_not_exists(credential)
        .await
        .unwrap();
    assert!(created);

    auth
}

pub fn login_request(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.into(),
        password: password.into(),
    }
}

pub const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);
