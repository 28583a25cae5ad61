use std::{
    error::Error,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use once_cell::sync::Lazy;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::AuthError,
    types::{AuthResponse, Claims, Credential, HashedPassword, LoginRequest, Username},
};

/// How long an issued token stays valid.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

// Verified against on the unknown-user path so both rejections cost one Argon2 run
static DUMMY_HASH: Lazy<Option<HashedPassword>> = Lazy::new(|| {
    argon2::hash_encoded(
        b"no such user",
        b"portfolio-guard-dummy-salt",
        &argon2::Config::default(),
    )
    .ok()
    .map(HashedPassword)
});

#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve the stored credential for `username`, or `None` when there is no such user.
    async fn find_by_subject(
        &self,
        username: &Username,
    ) -> Result<Option<Credential>, Box<dyn Error + Send + Sync>>;

    /// Store `credential` unless a user with the same name exists. Returns whether it was stored.
    async fn create_if_not_exists(
        &self,
        credential: Credential,
    ) -> Result<bool, Box<dyn Error + Send + Sync>>;
}

#[derive(Clone)]
pub struct AuthConfig {
    /// The issuer for auth tokens. We will validate that all auth tokens match the given issuer.
    pub token_issuer: String,
    /// The secret used to sign JWT authorization tokens.
    /// If the secret changes, all currently authenticated sessions will be terminated.
    pub token_secret: String,
    /// How long auth tokens should remain valid for. After this interval, the client will have to re-login.
    pub token_lifetime: Duration,
    pub credential_store: Arc<dyn CredentialStore>,
}

struct AuthInternal {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

/// Login and token checks for the admin surface.
///
/// Holds no mutable state; clones share the same keys and store.
#[derive(Clone)]
pub struct Auth {
    internal: Arc<AuthInternal>,
}

impl Auth {
    pub fn new(config: AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.token_issuer]);
        // expiry is compared against an explicit clock in `check_token`, strictly and without leeway
        validation.validate_exp = false;

        let internal = AuthInternal {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            validation,
            config,
        };

        Self {
            internal: Arc::new(internal),
        }
    }

    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        &self.internal.config.credential_store
    }

    /// Argon2-hash a password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<HashedPassword, AuthError> {
        let salt = Uuid::new_v4();
        let encoded = argon2::hash_encoded(
            password.as_bytes(),
            salt.as_bytes(),
            &argon2::Config::default(),
        )?;

        Ok(HashedPassword(encoded))
    }

    /// A hash that cannot be decoded never matches.
    pub fn verify_password(&self, password: &str, hash: &HashedPassword) -> bool {
        argon2::verify_encoded(&hash.0, password.as_bytes()).unwrap_or(false)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        self.login_at(request, SystemTime::now()).await
    }

    /// Check `request` against the credential store and issue a token valid from `now`.
    ///
    /// An unknown user and a wrong password produce the same
    /// [`AuthError::InvalidCredentials`].
    pub async fn login_at(
        &self,
        request: &LoginRequest,
        now: SystemTime,
    ) -> Result<AuthResponse, AuthError> {
        debug!(username = %request.username, "attempting login");

        let username = Username(request.username.clone());

        let credential = self
            .internal
            .config
            .credential_store
            .find_by_subject(&username)
            .await?;

        let Some(credential) = credential else {
            if let Some(dummy) = DUMMY_HASH.as_ref() {
                let _ = self.verify_password(&request.password, dummy);
            }
            warn!(username = %username, "login attempt for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(&request.password, &credential.password_hash) {
            warn!(username = %username, "invalid password attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let (token, claims) = self.issue_token(&credential.username, now)?;
        let expires_at = timestamp(claims.exp)?;

        info!(username = %credential.username, "user logged in successfully");

        Ok(AuthResponse {
            token,
            username: credential.username,
            expires_at,
        })
    }

    /// Sign a token for `username` issued at `now`.
    pub fn issue_token(
        &self,
        username: &Username,
        now: SystemTime,
    ) -> Result<(String, Claims), AuthError> {
        let iat = unix_seconds(now)?;
        let expiry = now
            .checked_add(self.internal.config.token_lifetime)
            .ok_or(AuthError::Token { source: None })?;
        let exp = unix_seconds(expiry)?;

        let claims = Claims {
            sub: username.0.clone(),
            iss: self.internal.config.token_issuer.clone(),
            iat,
            exp,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.internal.encoding_key,
        )?;

        Ok((token, claims))
    }

    pub fn validate_token(&self, token: &str, subject: &Username) -> bool {
        self.validate_token_at(token, subject, SystemTime::now())
    }

    /// True only when the signature and issuer verify, the expiry lies strictly
    /// after `now` and the embedded subject equals `subject`. Every failure is `false`.
    pub fn validate_token_at(&self, token: &str, subject: &Username, now: SystemTime) -> bool {
        match self.authenticate_at(token, now) {
            Some(embedded) if embedded == *subject => true,
            Some(embedded) => {
                debug!(expected = %subject, embedded = %embedded, "token subject mismatch");
                false
            }
            None => false,
        }
    }

    pub fn authenticate(&self, token: &str) -> Option<Username> {
        self.authenticate_at(token, SystemTime::now())
    }

    /// The subject of a currently valid token, or `None` for any failure.
    pub fn authenticate_at(&self, token: &str, now: SystemTime) -> Option<Username> {
        match self.check_token(token, now) {
            Ok(claims) => Some(Username(claims.sub)),
            Err(error) => {
                debug!(%error, "token rejected");
                None
            }
        }
    }

    fn check_token(&self, token: &str, now: SystemTime) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(
            token,
            &self.internal.decoding_key,
            &self.internal.validation,
        )?
        .claims;

        if claims.exp <= unix_seconds(now)? {
            return Err(jsonwebtoken::errors::Error::from(ErrorKind::ExpiredSignature).into());
        }

        Ok(claims)
    }
}

fn unix_seconds(time: SystemTime) -> Result<u64, AuthError> {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|_| AuthError::Token { source: None })
}

fn timestamp(seconds: u64) -> Result<DateTime<Utc>, AuthError> {
    i64::try_from(seconds)
        .ok()
        .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
        .ok_or(AuthError::Token { source: None })
}
