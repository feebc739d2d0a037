//! The boundary to an external key/value service.
//!
//! Values are opaque strings and every write carries a time-to-live, which is how
//! networked KV services (for example Cloudflare Workers KV) expose storage.
pub mod memory;

use std::error::Error;
use std::future::Future;

/// A string-valued key/value namespace with per-entry expiration.
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(Send))]
pub trait KvNamespace {
    type Error: Error + Send + Sync + 'static;

    /// Returns the value for `key`, or `None` if it is absent or expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, Self::Error>>;
    /// Writes `value` under `key`, expiring after `ttl_secs` seconds.
    fn put(
        &self,
        key: &str,
        value: String,
        ttl_secs: u64,
    ) -> impl Future<Output = Result<(), Self::Error>>;
    /// Removes `key`. Removing a missing key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), Self::Error>>;
}
