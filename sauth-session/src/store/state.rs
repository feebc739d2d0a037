use super::keyed::{export_key, import_key, KeyError, KeyedRecord, KeyedRecordStore};
use super::kv::KvRecordStore;
use super::{MemoryStore, A_HUNDRED_DAYS};
use sauth_common::kv::KvNamespace;
use sauth_crypto::{DpopKey, JwkEcKey};
use serde::{Deserialize, Serialize};

/// An authorization attempt in progress, keyed by its `state` parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct StateEntry {
    pub iss: String,
    pub dpop_key: DpopKey,
    pub verifier: String,
    pub app_state: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredStateEntry {
    pub iss: String,
    pub verifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_state: Option<String>,
    pub dpop_jwk: JwkEcKey,
}

impl KeyedRecord for StateEntry {
    type Stored = StoredStateEntry;

    fn to_storable(&self) -> Result<Self::Stored, KeyError> {
        Ok(StoredStateEntry {
            iss: self.iss.clone(),
            verifier: self.verifier.clone(),
            app_state: self.app_state.clone(),
            dpop_jwk: export_key(&self.dpop_key)?,
        })
    }
    fn from_storable(stored: Self::Stored) -> Result<Self, KeyError> {
        Ok(Self {
            dpop_key: import_key(&stored.dpop_jwk)?,
            iss: stored.iss,
            verifier: stored.verifier,
            app_state: stored.app_state,
        })
    }
}

pub type StateStore<N> = KeyedRecordStore<KvRecordStore<N, StoredStateEntry>, StateEntry>;

pub type MemoryStateStore = KeyedRecordStore<MemoryStore<String, StoredStateEntry>, StateEntry>;

/// A state store over `namespace`, writing entries with a hundred-day TTL.
pub fn state_store<N: KvNamespace>(namespace: N) -> StateStore<N> {
    KeyedRecordStore::new(KvRecordStore::new(namespace, A_HUNDRED_DAYS))
}
