use sauth_crypto::{Algorithm, DpopKey, JwkEcKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("duplicate kid: {0}")]
    DuplicateKid(String),
    #[error("keys must not be empty")]
    EmptyKeys,
    #[error("key must have a `kid`")]
    EmptyKid,
    #[error("key for signing must be a secret key")]
    PublicKey,
    #[error("client keys must be ES256, got {0}")]
    UnsupportedAlgorithm(Algorithm),
    #[error("crypto error: {0}")]
    Crypto(#[from] sauth_crypto::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JwkSet {
    pub keys: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq)]
struct KeyEntry {
    kid: String,
    key: DpopKey,
}

/// The client's own signing keys.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyset(Vec<KeyEntry>);

impl Keyset {
    /// Parses a single private JWK, as found in the `PRIVATE_JWK` setting.
    pub fn from_private_jwk(json: &str) -> Result<Self> {
        Self::try_from(vec![serde_json::from_str::<Value>(json)?])
    }
    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.kid.as_str())
    }
    pub fn get(&self, kid: &str) -> Option<&DpopKey> {
        self.0.iter().find(|entry| entry.kid == kid).map(|entry| &entry.key)
    }
    /// The JWK set to publish in the client metadata, without private parameters.
    pub fn public_jwks(&self) -> Result<JwkSet> {
        let mut keys = Vec::with_capacity(self.0.len());
        for KeyEntry { kid, key } in &self.0 {
            let mut jwk =
                serde_json::from_value::<Map<_, _>>(serde_json::to_value(key.public_jwk())?)?;
            jwk.insert(String::from("kid"), Value::from(kid.as_str()));
            jwk.insert(String::from("alg"), Value::from(key.algorithm().as_str()));
            jwk.insert(String::from("use"), Value::from("sig"));
            keys.push(Value::Object(jwk));
        }
        Ok(JwkSet { keys })
    }
}

impl TryFrom<Vec<Value>> for Keyset {
    type Error = Error;

    fn try_from(keys: Vec<Value>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::EmptyKeys);
        }
        let mut v = Vec::with_capacity(keys.len());
        let mut hs = HashSet::with_capacity(keys.len());
        for key in keys {
            let Some(kid) = key.get("kid").and_then(Value::as_str).filter(|kid| !kid.is_empty())
            else {
                return Err(Error::EmptyKid);
            };
            if !hs.insert(kid.to_string()) {
                return Err(Error::DuplicateKid(kid.into()));
            }
            // ensure that the key is a secret key
            if key.get("d").is_none() {
                return Err(Error::PublicKey);
            }
            let jwk = serde_json::from_value::<JwkEcKey>(key_parameters(&key))?;
            let key = DpopKey::from_private_jwk(&jwk)?;
            if key.algorithm() != Algorithm::Es256 {
                return Err(Error::UnsupportedAlgorithm(key.algorithm()));
            }
            v.push(KeyEntry { kid: kid.into(), key });
        }
        Ok(Self(v))
    }
}

fn key_parameters(key: &Value) -> Value {
    let params = ["kty", "crv", "x", "y", "d"]
        .into_iter()
        .filter_map(|name| Some((String::from(name), key.get(name)?.clone())))
        .collect::<Map<_, _>>();
    Value::Object(params)
}
