// src/cache.rs
//
// Cache-aside helper for the read-heavy list endpoints. Backed by Redis when
// REDIS_URL is set, otherwise by an in-process TTL map. Values are JSON
// strings; staleness within the TTL window is accepted, so every operation
// is best-effort and failures only log.

use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub enum Cache {
    Redis(redis::aio::ConnectionManager),
    Memory(Arc<Mutex<HashMap<String, MemoryEntry>>>),
}

#[derive(Clone)]
pub struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl Cache {
    pub async fn connect(redis_url: Option<&str>) -> Self {
        if let Some(url) = redis_url {
            match Self::connect_redis(url).await {
                Ok(manager) => {
                    tracing::info!("cache: connected to redis");
                    return Cache::Redis(manager);
                }
                Err(e) => {
                    tracing::warn!("cache: redis unavailable ({e}), using in-memory fallback");
                }
            }
        }
        Cache::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    async fn connect_redis(url: &str) -> redis::RedisResult<redis::aio::ConnectionManager> {
        let client = redis::Client::open(url)?;
        client.get_connection_manager().await
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match self {
            Cache::Redis(manager) => {
                let mut conn = manager.clone();
                match conn.get::<_, Option<String>>(key).await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!("cache get {key}: {e}");
                        None
                    }
                }
            }
            Cache::Memory(map) => {
                let mut guard = map.lock().expect("cache mutex poisoned");
                match guard.get(key) {
                    Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
                    Some(_) => {
                        guard.remove(key);
                        None
                    }
                    None => None,
                }
            }
        }
    }

    pub async fn set(&self, key: &str, value: String, ttl: Duration) {
        match self {
            Cache::Redis(manager) => {
                let mut conn = manager.clone();
                if let Err(e) = conn
                    .set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                    .await
                {
                    tracing::warn!("cache set {key}: {e}");
                }
            }
            Cache::Memory(map) => {
                let mut guard = map.lock().expect("cache mutex poisoned");
                guard.insert(
                    key.to_string(),
                    MemoryEntry {
                        value,
                        expires_at: Instant::now() + ttl,
                    },
                );
            }
        }
    }

    pub async fn del(&self, key: &str) {
        match self {
            Cache::Redis(manager) => {
                let mut conn = manager.clone();
                if let Err(e) = conn.del::<_, ()>(key).await {
                    tracing::warn!("cache del {key}: {e}");
                }
            }
            Cache::Memory(map) => {
                let mut guard = map.lock().expect("cache mutex poisoned");
                guard.remove(key);
            }
        }
    }

    /// Drops every key matching a `prefix:*` glob. Write paths call this to
    /// invalidate the list caches of the entity they touched.
    pub async fn clear_pattern(&self, pattern: &str) {
        match self {
            Cache::Redis(manager) => {
                let mut conn = manager.clone();
                let keys: Vec<String> = match redis::cmd("KEYS")
                    .arg(pattern)
                    .query_async(&mut conn)
                    .await
                {
                    Ok(keys) => keys,
                    Err(e) => {
                        tracing::warn!("cache keys {pattern}: {e}");
                        return;
                    }
                };
                if keys.is_empty() {
                    return;
                }
                if let Err(e) = conn.del::<_, ()>(keys).await {
                    tracing::warn!("cache clear {pattern}: {e}");
                }
            }
            Cache::Memory(map) => {
                let prefix = pattern.trim_end_matches('*');
                let mut guard = map.lock().expect("cache mutex poisoned");
                guard.retain(|key, _| !key.starts_with(prefix));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Cache {
        Cache::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    #[tokio::test]
    async fn set_get_roundtrip() {
        let cache = memory();
        cache
            .set("inquiries:list:1", "[1,2]".into(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("inquiries:list:1").await.as_deref(), Some("[1,2]"));
        assert_eq!(cache.get("inquiries:list:2").await, None);
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = memory();
        cache.set("k", "v".into(), Duration::ZERO).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn clear_pattern_drops_prefix_only() {
        let cache = memory();
        cache
            .set("inquiries:list:a", "1".into(), Duration::from_secs(60))
            .await;
        cache
            .set("inquiries:list:b", "2".into(), Duration::from_secs(60))
            .await;
        cache
            .set("customers:list:a", "3".into(), Duration::from_secs(60))
            .await;

        cache.clear_pattern("inquiries:*").await;

        assert_eq!(cache.get("inquiries:list:a").await, None);
        assert_eq!(cache.get("inquiries:list:b").await, None);
        assert_eq!(cache.get("customers:list:a").await.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn del_removes_single_key() {
        let cache = memory();
        cache.set("a", "1".into(), Duration::from_secs(60)).await;
        cache.del("a").await;
        assert_eq!(cache.get("a").await, None);
    }
}
