//! Sealing of small payloads into opaque, tamper-proof strings.
//!
//! A sealed value has the form
//!
//! ```text
//! sa1*<salt>*<nonce>*<ciphertext>*<expires>
//! ```
//!
//! where `salt`, `nonce` and `ciphertext` are unpadded base64url and `expires` is the expiry
//! in milliseconds since the Unix epoch. The payload is JSON encrypted with ChaCha20-Poly1305
//! under a key derived from the secret and the per-seal salt. Every field other than the
//! ciphertext is bound as associated data, so the expiry cannot be altered without failing
//! authentication. The result only contains characters that are valid in a cookie value.
use crate::utils::get_random_values;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::rngs::ThreadRng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

const VERSION: &str = "sa1";
const DELIMITER: char = '*';
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KDF_CONTEXT: &[u8] = b"sauth seal v1";

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug)]
pub enum Error {
    /// The value is malformed, was sealed with another secret, or was modified.
    #[error("sealed value failed integrity check")]
    Integrity,
    /// The value is authentic but its expiry has passed.
    #[error("sealed value has expired")]
    Expired,
    #[error("secret cannot be used as a key")]
    InvalidSecret,
    #[error("encryption failed")]
    Encryption,
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Seals `value` with `secret`, valid for `max_age` seconds from now.
pub fn seal<T: Serialize>(value: &T, secret: &str, max_age: u64) -> Result<String> {
    seal_at(value, secret, max_age, Utc::now())
}

/// Seals `value` as if the current time were `now`.
pub fn seal_at<T: Serialize>(
    value: &T,
    secret: &str,
    max_age: u64,
    now: DateTime<Utc>,
) -> Result<String> {
    let plaintext = serde_json::to_vec(value)?;
    let mut rng = ThreadRng::default();
    let salt = get_random_values::<_, SALT_LEN>(&mut rng);
    let nonce = get_random_values::<_, NONCE_LEN>(&mut rng);
    let max_age_ms = i64::try_from(max_age).unwrap_or(i64::MAX).saturating_mul(1000);
    let expires = now.timestamp_millis().saturating_add(max_age_ms);

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let nonce_b64 = URL_SAFE_NO_PAD.encode(nonce);
    let aad = associated_data(&salt_b64, &nonce_b64, &expires.to_string());
    let ciphertext = cipher(secret, &salt)?
        .encrypt(Nonce::from_slice(&nonce), Payload { msg: &plaintext, aad: aad.as_bytes() })
        .map_err(|_| Error::Encryption)?;
    Ok(format!(
        "{VERSION}{DELIMITER}{salt_b64}{DELIMITER}{nonce_b64}{DELIMITER}{}{DELIMITER}{expires}",
        URL_SAFE_NO_PAD.encode(ciphertext)
    ))
}

/// Opens a value sealed with [`seal`].
///
/// Authentication is checked before expiry: a modified value always fails with
/// [`Error::Integrity`], even when its expiry has also passed.
pub fn unseal<T: DeserializeOwned>(sealed: &str, secret: &str) -> Result<T> {
    unseal_at(sealed, secret, Utc::now())
}

/// Opens a sealed value as if the current time were `now`.
pub fn unseal_at<T: DeserializeOwned>(sealed: &str, secret: &str, now: DateTime<Utc>) -> Result<T> {
    let parts = sealed.split(DELIMITER).collect::<Vec<_>>();
    let [version, salt_b64, nonce_b64, ciphertext_b64, expires_str] = parts.as_slice() else {
        return Err(Error::Integrity);
    };
    if *version != VERSION {
        return Err(Error::Integrity);
    }
    let salt = decode_exact::<SALT_LEN>(salt_b64)?;
    let nonce = decode_exact::<NONCE_LEN>(nonce_b64)?;
    let ciphertext = URL_SAFE_NO_PAD.decode(ciphertext_b64).map_err(|_| Error::Integrity)?;
    if expires_str.is_empty() || !expires_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Integrity);
    }
    let expires = expires_str.parse::<i64>().map_err(|_| Error::Integrity)?;

    let aad = associated_data(salt_b64, nonce_b64, expires_str);
    let plaintext = cipher(secret, &salt)
        .map_err(|_| Error::Integrity)?
        .decrypt(Nonce::from_slice(&nonce), Payload { msg: &ciphertext, aad: aad.as_bytes() })
        .map_err(|_| Error::Integrity)?;
    if now.timestamp_millis() >= expires {
        return Err(Error::Expired);
    }
    serde_json::from_slice(&plaintext).map_err(|_| Error::Integrity)
}

fn associated_data(salt: &str, nonce: &str, expires: &str) -> String {
    format!("{VERSION}{DELIMITER}{salt}{DELIMITER}{nonce}{DELIMITER}{expires}")
}

fn cipher(secret: &str, salt: &[u8]) -> Result<ChaCha20Poly1305> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|_| Error::InvalidSecret)?;
    mac.update(KDF_CONTEXT);
    mac.update(salt);
    let key: Key = mac.finalize().into_bytes();
    Ok(<ChaCha20Poly1305 as KeyInit>::new(&key))
}

fn decode_exact<const LEN: usize>(input: &str) -> Result<[u8; LEN]> {
    URL_SAFE_NO_PAD
        .decode(input)
        .ok()
        .and_then(|bytes| <[u8; LEN]>::try_from(bytes).ok())
        .ok_or(Error::Integrity)
}
