use super::keyed::{export_key, import_key, KeyError, KeyedRecord, KeyedRecordStore};
use super::kv::KvRecordStore;
use super::{MemoryStore, A_HUNDRED_DAYS};
use chrono::{DateTime, Utc};
use sauth_common::kv::KvNamespace;
use sauth_common::types::Did;
use sauth_crypto::{DpopKey, JwkEcKey};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthTokenType {
    DPoP,
    Bearer,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub access_token: String,
    pub token_type: OAuthTokenType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// The OAuth session of one subject.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionEntry {
    pub dpop_key: DpopKey,
    pub token_set: TokenSet,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSessionEntry {
    pub token_set: TokenSet,
    pub dpop_jwk: JwkEcKey,
}

impl KeyedRecord for SessionEntry {
    type Stored = StoredSessionEntry;

    fn to_storable(&self) -> Result<Self::Stored, KeyError> {
        Ok(StoredSessionEntry {
            token_set: self.token_set.clone(),
            dpop_jwk: export_key(&self.dpop_key)?,
        })
    }
    fn from_storable(stored: Self::Stored) -> Result<Self, KeyError> {
        Ok(Self { dpop_key: import_key(&stored.dpop_jwk)?, token_set: stored.token_set })
    }
}

pub type SessionStore<N> = KeyedRecordStore<KvRecordStore<N, StoredSessionEntry>, SessionEntry>;

pub type MemorySessionStore =
    KeyedRecordStore<MemoryStore<Did, StoredSessionEntry>, SessionEntry>;

/// A session store over `namespace`, keyed by DID, writing entries with a hundred-day TTL.
pub fn session_store<N: KvNamespace>(namespace: N) -> SessionStore<N> {
    KeyedRecordStore::new(KvRecordStore::new(namespace, A_HUNDRED_DAYS))
}
