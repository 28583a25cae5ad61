//! Service settings, read from an optional `portfolio.toml` and `PORTFOLIO_*`
//! environment variables (the environment wins).

use std::{fmt, net::SocketAddr, sync::Arc, time::Duration};

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;

use crate::auth::{AuthConfig, CredentialStore, DEFAULT_TOKEN_LIFETIME};

const CONFIG_FILE: &str = "portfolio";
const ENV_PREFIX: &str = "PORTFOLIO";
const MAX_TOKEN_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to load settings")]
    Load {
        #[from]
        source: ConfigError,
    },
    #[error("token_secret must be set to a non-empty value")]
    MissingSecret,
    #[error("token_lifetime_secs must be greater than zero")]
    ZeroLifetime,
    #[error("token_lifetime_secs must not exceed {max} (one year)")]
    LifetimeTooLong { max: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Clone, Deserialize)]
pub struct Settings {
    pub token_issuer: String,
    pub token_secret: String,
    pub token_lifetime_secs: u64,
    pub environment: Environment,
    /// Only read when seeding in [`Environment::Development`].
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub bind_addr: SocketAddr,
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        let config = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Self::from_config(config)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, SettingsError> {
        let config = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, SettingsError> {
        let settings: Self = config.try_deserialize()?;

        if settings.token_secret.trim().is_empty() {
            return Err(SettingsError::MissingSecret);
        }
        if settings.token_lifetime_secs == 0 {
            return Err(SettingsError::ZeroLifetime);
        }
        if settings.token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS {
            return Err(SettingsError::LifetimeTooLong {
                max: MAX_TOKEN_LIFETIME_SECS,
            });
        }

        Ok(settings)
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_secs)
    }

    pub fn auth_config(&self, credential_store: Arc<dyn CredentialStore>) -> AuthConfig {
        AuthConfig {
            token_issuer: self.token_issuer.clone(),
            token_secret: self.token_secret.clone(),
            token_lifetime: self.token_lifetime(),
            credential_store,
        }
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("token_issuer", "portfolio-backend")?
        .set_default("token_lifetime_secs", DEFAULT_TOKEN_LIFETIME.as_secs() as i64)?
        .set_default("environment", "production")?
        .set_default("bind_addr", "127.0.0.1:8080")
}

// keeps the signing secret and admin password out of logs
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("token_issuer", &self.token_issuer)
            .field("token_secret", &"<redacted>")
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .field("environment", &self.environment)
            .field("admin_username", &self.admin_username)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
