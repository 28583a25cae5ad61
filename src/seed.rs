//! Development-only creation of the admin login.

use tracing::{info, warn};

use crate::{
    auth::Auth,
    error::AuthError,
    settings::{Environment, Settings},
    types::{Credential, Username},
    validation::{self, FieldRule, ValidationError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyPresent,
    /// Production environment, or no admin username/password configured.
    Skipped,
}

#[derive(thiserror::Error, Debug)]
pub enum SeedError {
    #[error("invalid admin seed settings")]
    Invalid {
        #[from]
        source: ValidationError,
    },
    #[error("failed to store admin credential")]
    Auth {
        #[from]
        source: AuthError,
    },
}

const ADMIN_USERNAME: FieldRule = FieldRule::required("admin_username").max_len(50);
const ADMIN_PASSWORD: FieldRule = FieldRule::required("admin_password").max_len(100);

/// Create the configured admin user, but only in [`Environment::Development`].
///
/// An existing user with the same name is left untouched.
pub async fn seed_admin(auth: &Auth, settings: &Settings) -> Result<SeedOutcome, SeedError> {
    if settings.environment != Environment::Development {
        if settings.admin_username.is_some() || settings.admin_password.is_some() {
            warn!("admin seed settings are ignored outside development");
        }
        return Ok(SeedOutcome::Skipped);
    }

    let (Some(username), Some(password)) = (&settings.admin_username, &settings.admin_password)
    else {
        info!("no admin seed configured");
        return Ok(SeedOutcome::Skipped);
    };

    validation::validate(&[
        (ADMIN_USERNAME, Some(username.as_str())),
        (ADMIN_PASSWORD, Some(password.as_str())),
    ])?;

    let credential = Credential {
        username: Username(username.clone()),
        password_hash: auth.hash_password(password)?,
    };

    let created = auth
        .credential_store()
        .create_if_not_exists(credential)
        .await
        .map_err(AuthError::from)?;

    if created {
        info!(username = %username, "created admin user");
        Ok(SeedOutcome::Created)
    } else {
        info!(username = %username, "admin user already present");
        Ok(SeedOutcome::AlreadyPresent)
    }
}
