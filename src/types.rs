use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{FieldRule, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Username(pub String);

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Argon2 encoded hash, salt and parameters included.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct HashedPassword(pub String);

/// A stored admin login. Owned by the credential store and only ever read here.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: Username,
    pub password_hash: HashedPassword,
}

/// JWT payload. Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub const USERNAME: FieldRule = FieldRule::required("username").max_len(50);
    pub const PASSWORD: FieldRule = FieldRule::required("password").max_len(100);

    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::validation::validate(&[
            (Self::USERNAME, Some(self.username.as_str())),
            (Self::PASSWORD, Some(self.password.as_str())),
        ])
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub username: Username,
    pub expires_at: DateTime<Utc>,
}
