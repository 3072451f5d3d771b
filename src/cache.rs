use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// In-memory cache where every entry shares one freshness window.
#[derive(Clone)]
pub struct TtlCache<K, V> {
    inner: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
}

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    fetched_at: DateTime<Utc>,
}

/// A fresh hit, with the wall-clock time it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue<V> {
    pub value: V,
    pub fetched_at: DateTime<Utc>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the entry only while `now - stored_at < ttl`.
    pub async fn get_fresh(&self, key: &K) -> Option<CachedValue<V>> {
        let guard = self.inner.read().await;
        let entry = guard.get(key)?;

        if entry.is_fresh(self.ttl, Instant::now()) {
            Some(CachedValue {
                value: entry.value.clone(),
                fetched_at: entry.fetched_at,
            })
        } else {
            None
        }
    }

    /// Insert or overwrite, stamping the entry with the current time.
    pub async fn insert(&self, key: K, value: V) -> DateTime<Utc> {
        let fetched_at = Utc::now();
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
            fetched_at,
        };

        let mut guard = self.inner.write().await;
        guard.insert(key, entry);
        fetched_at
    }

    pub async fn invalidate(&self, key: &K) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(key).is_some()
    }

    pub async fn clear(&self) -> usize {
        let mut guard = self.inner.write().await;
        let removed = guard.len();
        guard.clear();
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}
