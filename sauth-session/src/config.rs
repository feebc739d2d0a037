//! Configuration of the session broker.
mod file;

pub use self::file::{EnvLoader, FileStore};
use crate::error::{Error, Result};
use crate::keyset::Keyset;
use crate::session::DEFAULT_MAX_AGE;
use crate::utils::is_local_dev;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// The scope requested from the authorization server.
pub const OAUTH_SCOPE: &str = "atproto transition:generic";

/// Secrets shorter than this are rejected by [`Config::check`].
pub const MIN_SECRET_LEN: usize = 32;

/// A misconfiguration found by [`Config::check`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    #[error("serve local development from 127.0.0.1 instead of localhost")]
    PreferIpOverLocalhost,
    #[error("secret is missing or shorter than {MIN_SECRET_LEN} bytes")]
    BlankSecret,
    #[error("a private JWK is required outside local development")]
    PrivateJwkNotFound,
    #[error("the private JWK cannot be used as a client key")]
    InvalidPrivateJwk,
}

impl SettingsError {
    /// The stable code reported by the settings check endpoint.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PreferIpOverLocalhost => "prefer_ip_over_localhost",
            Self::BlankSecret => "blank_secret",
            Self::PrivateJwkNotFound => "private_jwk_not_found",
            Self::InvalidPrivateJwk => "invalid_private_jwk",
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// The secret session cookies are sealed with.
    pub secret: String,
    /// The client's ES256 private JWK, as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_jwk: Option<String>,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    /// Lifetime of session cookies, in seconds.
    #[serde(default = "default_session_max_age")]
    pub session_max_age: u64,
}

impl Config {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self> {
        loader.load().await.map_err(Error::ConfigLoad)
    }
    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<()> {
        saver.save(self).await.map_err(Error::ConfigSave)
    }
    /// Checks that the deployment at `root_url` can run with this configuration.
    pub fn check(&self, root_url: &str) -> core::result::Result<(), SettingsError> {
        if root_url.starts_with("http://localhost:") {
            return Err(SettingsError::PreferIpOverLocalhost);
        }
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(SettingsError::BlankSecret);
        }
        match self.private_jwk.as_deref().filter(|jwk| !jwk.is_empty()) {
            Some(jwk) => {
                if let Err(e) = Keyset::from_private_jwk(jwk) {
                    tracing::warn!(error = %e, "configured private JWK is unusable");
                    return Err(SettingsError::InvalidPrivateJwk);
                }
            }
            None if !is_local_dev(root_url) => return Err(SettingsError::PrivateJwkNotFound),
            None => {}
        }
        Ok(())
    }
    /// The client keyset, or `None` when no private JWK is configured.
    pub fn keyset(&self) -> Result<Option<Keyset>> {
        match self.private_jwk.as_deref().filter(|jwk| !jwk.is_empty()) {
            Some(jwk) => Ok(Some(Keyset::from_private_jwk(jwk)?)),
            None => Ok(None),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret: String::new(),
            private_jwk: None,
            scope: default_scope(),
            client_name: None,
            session_max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret", &"[redacted]")
            .field("private_jwk", &self.private_jwk.as_ref().map(|_| "[redacted]"))
            .field("scope", &self.scope)
            .field("client_name", &self.client_name)
            .field("session_max_age", &self.session_max_age)
            .finish()
    }
}

fn default_scope() -> String {
    String::from(OAUTH_SCOPE)
}

fn default_session_max_age() -> u64 {
    DEFAULT_MAX_AGE
}

/// The trait for loading configuration data.
pub trait Loader {
    fn load(
        &self,
    ) -> impl Future<
        Output = core::result::Result<Config, Box<dyn std::error::Error + Send + Sync + 'static>>,
    > + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    fn save(
        &self,
        config: &Config,
    ) -> impl Future<
        Output = core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>,
    > + Send;
}
