use super::KvNamespace;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// An in-memory [`KvNamespace`] honoring TTLs on read.
#[derive(Clone, Default)]
pub struct MemoryNamespace {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryNamespace {
    /// Number of entries currently held, including ones that expired but were not read yet.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock should never be poisoned").len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        let mut entries = self.entries.lock().expect("lock should never be poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
    fn put_at(&self, key: &str, value: String, ttl_secs: u64, now: DateTime<Utc>) {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries
            .lock()
            .expect("lock should never be poisoned")
            .insert(key.to_string(), Entry { value, expires_at });
    }
}

impl KvNamespace for MemoryNamespace {
    type Error = Infallible;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.get_at(key, Utc::now()))
    }
    async fn put(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), Self::Error> {
        tracing::trace!(key, ttl_secs, "memory namespace put");
        self.put_at(key, value, ttl_secs, Utc::now());
        Ok(())
    }
    async fn delete(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.lock().expect("lock should never be poisoned").remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let ns = MemoryNamespace::default();
        assert_eq!(ns.get("k").await.expect("get should succeed"), None);

        ns.put("k", String::from("v"), 60).await.expect("put should succeed");
        assert_eq!(ns.get("k").await.expect("get should succeed"), Some(String::from("v")));
        assert_eq!(ns.len(), 1);

        ns.delete("k").await.expect("delete should succeed");
        ns.delete("k").await.expect("delete of missing key should succeed");
        assert_eq!(ns.get("k").await.expect("get should succeed"), None);
        assert!(ns.is_empty());
    }

    #[test]
    fn entries_expire() {
        let ns = MemoryNamespace::default();
        let now = Utc::now();
        ns.put_at("k", String::from("v"), 10, now);
        assert_eq!(ns.get_at("k", now + TimeDelta::seconds(9)), Some(String::from("v")));
        assert_eq!(ns.get_at("k", now + TimeDelta::seconds(10)), None);
        // expired entries are dropped once observed
        assert!(ns.is_empty());
    }

    #[test]
    fn huge_ttl_does_not_overflow() {
        let ns = MemoryNamespace::default();
        let now = Utc::now();
        ns.put_at("k", String::from("v"), u64::MAX, now);
        assert_eq!(ns.get_at("k", now + TimeDelta::days(365 * 100)), Some(String::from("v")));
    }
}
