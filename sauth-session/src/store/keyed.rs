//! Storage of records that carry a live DPoP key.
//!
//! A [`DpopKey`] is kept in memory as a signing key, but written to storage as its private JWK.
//! [`KeyedRecordStore`] performs that conversion around any [`Store`] of the storable form.
use super::Store;
use sauth_crypto::{DpopKey, JwkEcKey};
use std::hash::Hash;
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("private DPoP key material is missing or not exportable")]
    Missing,
    #[error("stored DPoP key is invalid: {0}")]
    Invalid(#[from] sauth_crypto::Error),
}

#[derive(Error, Debug)]
pub enum Error<E> {
    #[error("private DPoP key material is missing or not exportable")]
    MissingKeyMaterial,
    #[error("stored DPoP key is invalid: {0}")]
    InvalidKey(#[source] sauth_crypto::Error),
    #[error(transparent)]
    Store(E),
}

impl<E> From<KeyError> for Error<E> {
    fn from(value: KeyError) -> Self {
        match value {
            KeyError::Missing => Self::MissingKeyMaterial,
            KeyError::Invalid(e) => Self::InvalidKey(e),
        }
    }
}

/// A record holding exactly one DPoP key, with a serializable counterpart.
pub trait KeyedRecord: Sized {
    type Stored: Clone;

    fn to_storable(&self) -> Result<Self::Stored, KeyError>;
    fn from_storable(stored: Self::Stored) -> Result<Self, KeyError>;
}

/// The private JWK of `key`, which must be able to sign and allow export.
pub fn export_key(key: &DpopKey) -> Result<JwkEcKey, KeyError> {
    key.private_jwk().ok_or_else(|| {
        tracing::warn!(
            alg = %key.algorithm(),
            "refusing to store a DPoP key without private material"
        );
        KeyError::Missing
    })
}

pub fn import_key(jwk: &JwkEcKey) -> Result<DpopKey, KeyError> {
    Ok(DpopKey::from_private_jwk(jwk)?)
}

/// A [`Store`] of `V` backed by a store of `V::Stored`.
pub struct KeyedRecordStore<S, V> {
    inner: S,
    _record: PhantomData<fn() -> V>,
}

impl<S, V> KeyedRecordStore<S, V> {
    pub fn new(inner: S) -> Self {
        Self { inner, _record: PhantomData }
    }
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Clone, V> Clone for KeyedRecordStore<S, V> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<S: Default, V> Default for KeyedRecordStore<S, V> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<K, V, S> Store<K, V> for KeyedRecordStore<S, V>
where
    K: Eq + Hash + Send + Sync,
    V: KeyedRecord + Clone + Send,
    V::Stored: Send,
    S: Store<K, V::Stored> + Sync,
{
    type Error = Error<S::Error>;

    async fn get(&self, key: &K) -> Result<Option<V>, Self::Error> {
        match self.inner.get(key).await.map_err(Error::Store)? {
            Some(stored) => Ok(Some(V::from_storable(stored)?)),
            None => Ok(None),
        }
    }
    async fn set(&self, key: K, value: V) -> Result<(), Self::Error> {
        let stored = value.to_storable()?;
        self.inner.set(key, stored).await.map_err(Error::Store)
    }
    async fn del(&self, key: &K) -> Result<(), Self::Error> {
        self.inner.del(key).await.map_err(Error::Store)
    }
    async fn clear(&self) -> Result<(), Self::Error> {
        self.inner.clear().await.map_err(Error::Store)
    }
}
