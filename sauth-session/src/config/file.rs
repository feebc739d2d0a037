use super::{Config, Loader, Saver};
use crate::session::DEFAULT_MAX_AGE;
use anyhow::anyhow;
use std::path::{Path, PathBuf};

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a JSON configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl Loader for FileStore {
    async fn load(
        &self,
    ) -> core::result::Result<Config, Box<dyn std::error::Error + Send + Sync + 'static>> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&std::fs::read_to_string(&self.path)?)?),
            _ => Err(anyhow!("Unsupported file format").into()),
        }
    }
}

impl Saver for FileStore {
    async fn save(
        &self,
        config: &Config,
    ) -> core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(std::fs::write(&self.path, serde_json::to_string_pretty(config)?)?),
            _ => Err(anyhow!("Unsupported file format").into()),
        }
    }
}

/// A [`Loader`] reading `SECRET`, `PRIVATE_JWK`, `CLIENT_NAME` and `SESSION_MAX_AGE` from the
/// process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }
    /// Reads `<prefix>SECRET`, `<prefix>PRIVATE_JWK` and so on instead.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(format!("{}{name}", self.prefix)).ok()
    }
}

impl Loader for EnvLoader {
    async fn load(
        &self,
    ) -> core::result::Result<Config, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let session_max_age = match self.var("SESSION_MAX_AGE") {
            Some(max_age) => max_age
                .parse::<u64>()
                .map_err(|e| anyhow!("invalid SESSION_MAX_AGE: {e}"))?,
            None => DEFAULT_MAX_AGE,
        };
        // a missing secret is reported by `Config::check`
        Ok(Config {
            secret: self.var("SECRET").unwrap_or_default(),
            private_jwk: self.var("PRIVATE_JWK").filter(|jwk| !jwk.is_empty()),
            client_name: self.var("CLIENT_NAME"),
            session_max_age,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    #[tokio::test]
    async fn file_store() {
        let path = temp_dir().join(format!("sauth-config-{}.json", std::process::id()));
        let store = FileStore::new(&path);
        let config = Config {
            secret: String::from("0123456789abcdef0123456789abcdef"),
            client_name: Some(String::from("demo")),
            ..Default::default()
        };
        config.save(&store).await.expect("config should save");
        let loaded = Config::load(&store).await.expect("config should load");
        std::fs::remove_file(&path).expect("file should be removed");
        assert_eq!(loaded.secret, config.secret);
        assert_eq!(loaded.client_name, config.client_name);
        assert_eq!(loaded.session_max_age, config.session_max_age);

        let unsupported = FileStore::new(temp_dir().join("sauth-config.yaml"));
        assert!(Config::load(&unsupported).await.is_err());
        assert!(config.save(&unsupported).await.is_err());
    }

    #[tokio::test]
    async fn env_loader() {
        let prefix = format!("SAUTH_TEST_{}_", std::process::id());
        std::env::set_var(format!("{prefix}SECRET"), "from-env");
        std::env::set_var(format!("{prefix}PRIVATE_JWK"), "");
        std::env::set_var(format!("{prefix}SESSION_MAX_AGE"), "60");
        let config = Config::load(&EnvLoader::with_prefix(&prefix))
            .await
            .expect("config should load");
        assert_eq!(config.secret, "from-env");
        assert_eq!(config.private_jwk, None);
        assert_eq!(config.session_max_age, 60);

        std::env::set_var(format!("{prefix}SESSION_MAX_AGE"), "soon");
        assert!(Config::load(&EnvLoader::with_prefix(&prefix)).await.is_err());
    }
}
