mod redis_store;

use std::future::Future;
use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use redis_store::RedisCacheStore;

/// Catalog rows only change through out-of-band imports.
pub const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);
/// User profiles are invalidated on every progression write.
pub const USER_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
enum CacheBackend {
    /// Every read misses and every write is dropped.
    Disabled,
    Redis(RedisCacheStore),
}

#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    backend: CacheBackend,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Disabled,
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Redis(RedisCacheStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, CacheBackend::Redis(_))
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.ping().await,
        }
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    fn redis_store(&self) -> Option<&RedisCacheStore> {
        match &self.backend {
            CacheBackend::Disabled => None,
            CacheBackend::Redis(store) => Some(store),
        }
    }

    pub async fn remove(&self, key: &str) -> anyhow::Result<()> {
        match self.redis_store() {
            Some(store) => store.del(key).await,
            None => Ok(()),
        }
    }

    /// Serve `key` from Redis, or run `loader` and store its result for `ttl`.
    ///
    /// Cache faults never fail the call. An entry that no longer decodes as
    /// `T` is evicted and reloaded.
    pub async fn read_through<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let Some(store) = self.redis_store() else {
            return loader().await;
        };

        match store.get(key).await {
            Ok(Some(bytes)) => match decode_entry::<T>(key, &bytes) {
                Ok(hit) => return Ok(hit),
                Err(e) => {
                    warn!(?e, cache_key = key, "evicting undecodable cache entry");
                    if let Err(e) = store.del(key).await {
                        warn!(?e, cache_key = key, "cache eviction failed");
                    }
                }
            },
            Ok(None) => {}
            Err(e) => warn!(?e, cache_key = key, "cache read failed; loading from postgres"),
        }

        let loaded = loader().await?;

        let stored = match encode_entry(key, &loaded) {
            Ok(payload) => store.set(key, payload, ttl.as_secs().max(1)).await,
            Err(e) => Err(e),
        };
        if let Err(e) = stored {
            warn!(?e, cache_key = key, "cache write failed; serving loaded value");
        }

        Ok(loaded)
    }
}

fn decode_entry<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> anyhow::Result<T> {
    serde_json::from_slice(bytes).with_context(|| format!("cache entry `{key}` is not valid JSON"))
}

fn encode_entry<T: Serialize>(key: &str, value: &T) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec(value).with_context(|| format!("cannot encode cache entry `{key}`"))
}

pub fn user_key(cache: &CacheService, user_id: u64) -> String {
    cache.key(format!("user:{user_id}"))
}

pub fn categories_key(cache: &CacheService) -> String {
    cache.key("catalog:categories")
}

pub fn category_key(cache: &CacheService, category_id: u64) -> String {
    cache.key(format!("catalog:category:{category_id}"))
}

pub fn available_products_key(cache: &CacheService) -> String {
    cache.key("catalog:products:available")
}

pub fn category_products_key(cache: &CacheService, category_id: u64) -> String {
    cache.key(format!("catalog:category:{category_id}:products"))
}

pub fn product_key(cache: &CacheService, product_id: u64) -> String {
    cache.key(format!("catalog:product:{product_id}"))
}

pub fn events_key(cache: &CacheService) -> String {
    cache.key("catalog:events")
}

pub fn event_key(cache: &CacheService, event_id: u64) -> String {
    cache.key(format!("catalog:event:{event_id}"))
}

/// Drop a cached user profile after its progression changed.
///
/// Failures are only logged; a stale entry lives at most [`USER_CACHE_TTL`].
pub async fn invalidate_user(cache: &CacheService, user_id: u64) {
    let key = user_key(cache, user_id);
    if let Err(e) = cache.remove(&key).await {
        warn!(?e, cache_key = %key, "cache invalidation failed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn keys_are_prefixed() {
        let cache = CacheService::disabled("mollysou:test");
        assert_eq!(user_key(&cache, 7), "mollysou:test:user:7");
        assert_eq!(
            category_products_key(&cache, 3),
            "mollysou:test:catalog:category:3:products"
        );
        assert_eq!(events_key(&cache), "mollysou:test:catalog:events");
    }

    #[tokio::test]
    async fn disabled_cache_always_loads() {
        let cache = CacheService::disabled("mollysou:test");
        assert!(!cache.is_redis_enabled());
        cache.ping().await.unwrap();

        let mut calls = 0;
        for _ in 0..2 {
            let value: u32 = cache
                .read_through("k", Duration::from_secs(5), || {
                    calls += 1;
                    async { Ok(42) }
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn entries_decode_only_as_their_type() {
        let payload = encode_entry("k", &vec![1u32, 2, 3]).unwrap();
        assert_eq!(decode_entry::<Vec<u32>>("k", &payload).unwrap(), vec![1, 2, 3]);

        let err = decode_entry::<Vec<u32>>("mollysou:test:user:7", b"{\"id\":7}").unwrap_err();
        assert!(err.to_string().contains("mollysou:test:user:7"));
    }
}
