use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use log::debug;
use tokio::sync::RwLock;
use tokio::time::{self, Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub enabled: bool,
    pub ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl: Duration::from_secs(3600),
        }
    }
}

struct Slot<V> {
    value: Arc<V>,
    expires: Instant,
}

/// Parsed schedules keyed by sport, each kept for `ttl` after its latest
/// insertion.
///
/// A disabled cache stores nothing: inserts hand the value straight back and
/// lookups always miss.
pub struct Cache<K, V> {
    enabled: bool,
    ttl: Duration,
    slots: RwLock<HashMap<K, Slot<V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            enabled: config.enabled,
            ttl: config.ttl,
            slots: RwLock::default(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stores `value` and schedules its eviction. Re-inserting a key pushes
    /// its deadline back; an eviction only fires for the slot it was
    /// scheduled for.
    pub async fn insert(self: Arc<Self>, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if !self.enabled {
            return value;
        }

        let expires = Instant::now() + self.ttl;
        self.slots.write().await.insert(
            key.clone(),
            Slot {
                value: Arc::clone(&value),
                expires,
            },
        );

        let cache = Arc::clone(&self);
        tokio::spawn(async move {
            time::sleep_until(expires).await;
            cache.evict(&key, expires).await;
        });

        value
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        if !self.enabled {
            return None;
        }

        let slots = self.slots.read().await;
        let slot = slots.get(key)?;
        (Instant::now() < slot.expires).then(|| Arc::clone(&slot.value))
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    async fn evict(&self, key: &K, expires: Instant) {
        let mut slots = self.slots.write().await;
        if slots.get(key).is_some_and(|slot| slot.expires == expires) {
            slots.remove(key);
            debug!("Evicted cache entry, {} left", slots.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(ttl: u64) -> Arc<Cache<String, u32>> {
        Cache::new(Config {
            enabled: true,
            ttl: Duration::from_secs(ttl),
        })
    }

    fn rowing() -> String {
        "Rowing".to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = enabled(60);
        Arc::clone(&cache).insert(rowing(), 7).await;

        assert_eq!(cache.get(&rowing()).await.as_deref(), Some(&7));

        time::sleep(Duration::from_secs(61)).await;
        assert!(cache.get(&rowing()).await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reinsert_outlives_the_first_deadline() {
        let cache = enabled(60);
        Arc::clone(&cache).insert(rowing(), 7).await;

        time::sleep(Duration::from_secs(50)).await;
        Arc::clone(&cache).insert(rowing(), 8).await;

        time::sleep(Duration::from_secs(11)).await;
        assert_eq!(cache.get(&rowing()).await.as_deref(), Some(&8));
        assert_eq!(cache.len().await, 1);

        time::sleep(Duration::from_secs(50)).await;
        assert!(cache.get(&rowing()).await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let cache: Arc<Cache<String, u32>> = Cache::new(Config::default());

        let value = Arc::clone(&cache).insert(rowing(), 7).await;

        assert_eq!(*value, 7);
        assert!(!cache.is_enabled());
        assert!(cache.get(&rowing()).await.is_none());
        assert_eq!(cache.len().await, 0);
    }
}
