use crate::commands::Command;
use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::ThreadRng;
use rand::RngCore;
use sauth_crypto::{Algorithm, DpopKey};
use sauth_session::config::{Config, EnvLoader, FileStore, MIN_SECRET_LEN};
use sauth_session::seal::{seal, unseal};
use sauth_session::Session;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

pub struct Runner {
    config: Config,
    debug: bool,
}

impl Runner {
    pub async fn new(config_path: Option<PathBuf>, debug: bool) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load(&FileStore::new(&path))
                .await
                .with_context(|| format!("Failed to load config from {path:?}"))?,
            None => Config::load(&EnvLoader::new()).await?,
        };
        tracing::debug!(?config, "loaded config");
        Ok(Self { config, debug })
    }
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::GenerateSecrets => {
                let (secret, private_jwk) = generate_secrets()?;
                println!("SECRET={secret}");
                println!("PRIVATE_JWK={private_jwk}");
                Ok(())
            }
            Command::Check(args) => {
                let error = self.config.check(&args.root_url).err();
                self.print(&serde_json::json!({ "error": error.as_ref().map(|e| e.code()) }))?;
                match error {
                    Some(e) => bail!("settings check failed: {e}"),
                    None => Ok(()),
                }
            }
            Command::Seal(args) => {
                let sealed = seal(&Session { did: args.did }, self.secret()?, args.max_age)?;
                println!("{sealed}");
                Ok(())
            }
            Command::Unseal(args) => {
                let session = unseal::<Session>(args.value.trim(), self.secret()?)
                    .with_context(|| "Failed to unseal value")?;
                self.print(&session)
            }
        }
    }
    fn secret(&self) -> Result<&str> {
        if self.config.secret.len() < MIN_SECRET_LEN {
            bail!("SECRET must be set and at least {MIN_SECRET_LEN} bytes long");
        }
        Ok(&self.config.secret)
    }
    fn print<T: std::fmt::Debug + Serialize>(&self, result: &T) -> Result<()> {
        if self.debug {
            println!("{:#?}", result);
        } else {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        Ok(())
    }
}

/// A fresh `SECRET` and an ES256 `PRIVATE_JWK` with a random `kid`.
fn generate_secrets() -> Result<(String, String)> {
    let mut rng = ThreadRng::default();
    let mut secret = [0u8; 32];
    rng.fill_bytes(&mut secret);
    let mut kid = [0u8; 8];
    rng.fill_bytes(&mut kid);

    let jwk = DpopKey::generate(Algorithm::Es256)
        .private_jwk()
        .context("generated key should be extractable")?;
    let mut jwk = serde_json::to_value(jwk)?;
    if let Value::Object(map) = &mut jwk {
        map.insert(String::from("kid"), Value::from(URL_SAFE_NO_PAD.encode(kid)));
    }
    Ok((URL_SAFE_NO_PAD.encode(secret), jwk.to_string()))
}
