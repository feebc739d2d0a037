use super::Store;
use sauth_common::kv::KvNamespace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::hash::Hash;
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error<E> {
    #[error(transparent)]
    Unavailable(E),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error("a KV namespace cannot be cleared")]
    ClearUnsupported,
}

/// A [`Store`] of JSON-encoded values in a [`KvNamespace`], written with a fixed TTL.
pub struct KvRecordStore<N, T> {
    namespace: N,
    ttl_secs: u64,
    _value: PhantomData<fn() -> T>,
}

impl<N, T> KvRecordStore<N, T> {
    pub fn new(namespace: N, ttl_secs: u64) -> Self {
        Self { namespace, ttl_secs, _value: PhantomData }
    }
    pub fn namespace(&self) -> &N {
        &self.namespace
    }
}

impl<N: Clone, T> Clone for KvRecordStore<N, T> {
    fn clone(&self) -> Self {
        Self::new(self.namespace.clone(), self.ttl_secs)
    }
}

impl<N, K, T> Store<K, T> for KvRecordStore<N, T>
where
    N: KvNamespace + Sync,
    K: AsRef<str> + Eq + Hash + Send + Sync,
    T: Serialize + DeserializeOwned + Clone + Send,
{
    type Error = Error<N::Error>;

    async fn get(&self, key: &K) -> Result<Option<T>, Self::Error> {
        tracing::trace!(key = key.as_ref(), "kv get");
        match self.namespace.get(key.as_ref()).await.map_err(Error::Unavailable)? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }
    async fn set(&self, key: K, value: T) -> Result<(), Self::Error> {
        tracing::trace!(key = key.as_ref(), ttl_secs = self.ttl_secs, "kv put");
        let value = serde_json::to_string(&value)?;
        self.namespace.put(key.as_ref(), value, self.ttl_secs).await.map_err(Error::Unavailable)
    }
    async fn del(&self, key: &K) -> Result<(), Self::Error> {
        tracing::trace!(key = key.as_ref(), "kv delete");
        self.namespace.delete(key.as_ref()).await.map_err(Error::Unavailable)
    }
    async fn clear(&self) -> Result<(), Self::Error> {
        Err(Error::ClearUnsupported)
    }
}
