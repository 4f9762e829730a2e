use async_trait::async_trait;
use carbon_repository::ports::CacheStore;
use moka::Expiry;
use moka::future::Cache;
use shared::{Minutes, Result};
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Clone, Debug)]
struct StoredValue<V> {
    value: V,
    // None = never expires
    ttl: Option<Duration>,
}

/// Expiry policy that reads the TTL carried by each entry
struct PerEntryExpiry;

impl<V> Expiry<String, StoredValue<V>> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Moka-based store with per-entry TTL support
/// Provides a lock-free, concurrent cache with optional size bounds
pub struct MokaStore<V>
where
    V: Debug + Send + Sync + Clone + 'static,
{
    cache: Cache<String, StoredValue<V>>,
}

impl<V> MokaStore<V>
where
    V: Debug + Send + Sync + Clone + 'static,
{
    /// Create a Moka store from name and optional capacity
    pub fn new(name: &str, max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().name(name).expire_after(PerEntryExpiry);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
        }
    }

    /// Create a new unbounded Moka store
    pub fn new_unbounded() -> Self {
        Self {
            cache: Cache::builder().expire_after(PerEntryExpiry).build(),
        }
    }

    fn stored(value: V, ttl: Option<Minutes>) -> StoredValue<V> {
        StoredValue {
            value,
            ttl: ttl.map(|m| m.as_duration()),
        }
    }
}

#[async_trait]
impl<V> CacheStore<V> for MokaStore<V>
where
    V: Debug + Send + Sync + Clone + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>> {
        // Either doesn't exist or TTL expired
        Ok(self.cache.get(key).await.map(|stored| stored.value))
    }

    async fn many(&self, keys: &[String]) -> Result<Vec<(String, Option<V>)>> {
        let mut found = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self.cache.get(key).await.map(|stored| stored.value);
            found.push((key.clone(), value));
        }
        Ok(found)
    }

    async fn put(&self, key: &str, value: V, ttl: Minutes) -> Result<()> {
        self.cache
            .insert(key.to_string(), Self::stored(value, Some(ttl)))
            .await;
        Ok(())
    }

    async fn put_many(&self, entries: Vec<(String, V)>, ttl: Minutes) -> Result<()> {
        for (key, value) in entries {
            self.cache.insert(key, Self::stored(value, Some(ttl))).await;
        }
        Ok(())
    }

    async fn forever(&self, key: &str, value: V) -> Result<()> {
        self.cache
            .insert(key.to_string(), Self::stored(value, None))
            .await;
        Ok(())
    }

    async fn add(&self, key: &str, value: V, ttl: Minutes) -> Result<bool> {
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert(Self::stored(value, Some(ttl)))
            .await;
        if !entry.is_fresh() {
            trace!("Key '{}' already present, add skipped", key);
        }
        Ok(entry.is_fresh())
    }

    async fn forget(&self, key: &str) -> Result<bool> {
        let existed = self.cache.remove(key).await.is_some();
        if !existed {
            trace!("Key '{}' not present, nothing to forget", key);
        }
        Ok(existed)
    }
}

impl<V> Debug for MokaStore<V>
where
    V: Debug + Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbon_repository::Repository;
    use std::sync::Arc;

    fn store() -> MokaStore<String> {
        MokaStore::new("test", None)
    }

    #[tokio::test]
    async fn test_moka_store_put_and_get() {
        let store = store();

        store.put("hello", "world".to_string(), Minutes(5)).await.unwrap();

        assert_eq!(store.get("hello").await.unwrap(), Some("world".to_string()));
    }

    #[tokio::test]
    async fn test_moka_store_get_nonexistent() {
        let store = store();
        assert_eq!(store.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_moka_store_overwrite() {
        let store = store();

        store.put("key", "value1".to_string(), Minutes(5)).await.unwrap();
        store.forever("key", "value2".to_string()).await.unwrap();

        assert_eq!(store.get("key").await.unwrap(), Some("value2".to_string()));
    }

    #[tokio::test]
    async fn test_moka_store_many_keeps_key_order() {
        let store = store();
        store
            .put_many(
                vec![
                    ("a".to_string(), "1".to_string()),
                    ("c".to_string(), "3".to_string()),
                ],
                Minutes(5),
            )
            .await
            .unwrap();

        let keys = vec!["c".to_string(), "b".to_string(), "a".to_string()];
        let found = store.many(&keys).await.unwrap();

        assert_eq!(
            found,
            vec![
                ("c".to_string(), Some("3".to_string())),
                ("b".to_string(), None),
                ("a".to_string(), Some("1".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_moka_store_add_only_inserts_absent_keys() {
        let store = store();

        assert!(store.add("key", "first".to_string(), Minutes(5)).await.unwrap());
        assert!(!store.add("key", "second".to_string(), Minutes(5)).await.unwrap());

        assert_eq!(store.get("key").await.unwrap(), Some("first".to_string()));
    }

    #[tokio::test]
    async fn test_moka_store_forget() {
        let store = store();

        store.forever("key", "value".to_string()).await.unwrap();

        assert!(store.forget("key").await.unwrap());
        assert!(!store.forget("key").await.unwrap());
        assert_eq!(store.get("key").await.unwrap(), None);
    }

    #[test]
    fn test_per_entry_expiry_uses_entry_ttl() {
        let expiry = PerEntryExpiry;
        let key = "key".to_string();

        let timed = MokaStore::stored("v".to_string(), Some(Minutes(2)));
        assert_eq!(
            expiry.expire_after_create(&key, &timed, Instant::now()),
            Some(Duration::from_secs(120))
        );

        let permanent = MokaStore::stored("v".to_string(), None);
        assert_eq!(
            expiry.expire_after_update(&key, &permanent, Instant::now(), Some(Duration::from_secs(1))),
            None
        );
    }

    #[tokio::test]
    async fn test_repository_over_moka_store() {
        let repo: Repository<String> = Repository::new(Arc::new(MokaStore::new_unbounded()));

        let value = repo
            .remember("greeting", 10, || async { Ok("hello".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "hello");
        assert!(repo.has("greeting").await.unwrap());

        assert_eq!(repo.pull("greeting").await.unwrap(), Some("hello".to_string()));
        assert!(!repo.has("greeting").await.unwrap());
    }
}
