use crate::domain::Fallback;
use crate::events::CacheEvent;
use crate::ports::{CacheStore, EventDispatcher};
use shared::config::Config;
use shared::{Expiry, Minutes, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

/// Cache repository: convenience semantics on top of a pluggable [`CacheStore`].
///
/// Handles fallbacks on miss, TTL normalization, fetch-or-compute and
/// lifecycle notifications. All storage work is delegated to the store.
pub struct Repository<V>
where
    V: Debug + Clone + Send + Sync + 'static,
{
    store: Arc<dyn CacheStore<V>>,
    event_dispatcher: Option<Arc<dyn EventDispatcher>>,
    default_minutes: i64,
}

impl<V> Repository<V>
where
    V: Debug + Clone + Send + Sync + 'static,
{
    const DEFAULT_CACHE_MINUTES: i64 = 60;

    pub fn new(store: Arc<dyn CacheStore<V>>) -> Self {
        Self {
            store,
            event_dispatcher: None,
            default_minutes: Self::DEFAULT_CACHE_MINUTES,
        }
    }

    pub fn from_config(store: Arc<dyn CacheStore<V>>, config: &Config) -> Self {
        let mut repository = Self::new(store);
        repository.set_default_cache_time(config.default_cache_minutes);
        repository
    }

    pub fn with_event_dispatcher(
        store: Arc<dyn CacheStore<V>>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        let mut repository = Self::new(store);
        repository.set_event_dispatcher(dispatcher);
        repository
    }

    pub fn store(&self) -> &Arc<dyn CacheStore<V>> {
        &self.store
    }

    pub fn event_dispatcher(&self) -> Option<&Arc<dyn EventDispatcher>> {
        self.event_dispatcher.as_ref()
    }

    pub fn set_event_dispatcher(&mut self, dispatcher: Arc<dyn EventDispatcher>) {
        self.event_dispatcher = Some(dispatcher);
    }

    pub fn default_cache_time(&self) -> i64 {
        self.default_minutes
    }

    pub fn set_default_cache_time(&mut self, minutes: i64) {
        self.default_minutes = minutes;
    }

    /// Look up a single key. `None` means the store reported a miss.
    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        let value = self.store.get(key).await?;
        self.record_lookup(key, value.is_some());
        Ok(value)
    }

    /// Look up a key, resolving `fallback` only when the key is missing.
    pub async fn get_with(&self, key: &str, fallback: Fallback<V>) -> Result<V> {
        Ok(match self.get(key).await? {
            Some(value) => value,
            None => fallback.resolve(),
        })
    }

    pub async fn get_or(&self, key: &str, default: V) -> Result<V> {
        self.get_with(key, Fallback::value(default)).await
    }

    pub async fn get_or_else<F>(&self, key: &str, producer: F) -> Result<V>
    where
        F: FnOnce() -> V + Send + 'static,
    {
        self.get_with(key, Fallback::producer(producer)).await
    }

    /// Look up several keys with a single batch call, in input order.
    pub async fn many<I, K>(&self, keys: I) -> Result<Vec<(String, Option<V>)>>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let entries: Vec<(String, Option<Fallback<V>>)> =
            keys.into_iter().map(|key| (key.into(), None)).collect();
        self.many_with(entries).await
    }

    /// Batch lookup where each key may carry its own fallback.
    /// Missed keys without a fallback stay `None`.
    pub async fn many_with<I, K>(&self, entries: I) -> Result<Vec<(String, Option<V>)>>
    where
        I: IntoIterator<Item = (K, Option<Fallback<V>>)>,
        K: Into<String>,
    {
        let (keys, fallbacks): (Vec<String>, Vec<Option<Fallback<V>>>) = entries
            .into_iter()
            .map(|(key, fallback)| (key.into(), fallback))
            .unzip();

        let found: HashMap<String, Option<V>> =
            self.store.many(&keys).await?.into_iter().collect();

        let mut resolved = Vec::with_capacity(keys.len());
        for (key, fallback) in keys.into_iter().zip(fallbacks) {
            let value = found.get(&key).cloned().flatten();
            self.record_lookup(&key, value.is_some());

            let value = match value {
                Some(value) => Some(value),
                None => fallback.map(Fallback::resolve),
            };
            resolved.push((key, value));
        }

        Ok(resolved)
    }

    pub async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Write a value. An expiry that leaves no whole minute is a silent no-op.
    pub async fn put(&self, key: &str, value: V, ttl: impl Into<Expiry>) -> Result<()> {
        match ttl.into().minutes() {
            Some(minutes) => {
                self.store.put(key, value, minutes).await?;
                self.record_write(key, Some(minutes));
            }
            None => trace!("Expiry for key '{}' already passed, skipping put", key),
        }
        Ok(())
    }

    /// Write several values with one shared expiry through the store's batch write.
    pub async fn put_many<I, K>(&self, entries: I, ttl: impl Into<Expiry>) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let entries: Vec<(String, V)> = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();

        let Some(minutes) = ttl.into().minutes() else {
            trace!("Expiry already passed, skipping put of {} key(s)", entries.len());
            return Ok(());
        };
        if entries.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = entries.iter().map(|(key, _)| key.clone()).collect();
        self.store.put_many(entries, minutes).await?;

        for key in &keys {
            self.record_write(key, Some(minutes));
        }
        Ok(())
    }

    /// Write a value for the default cache time.
    pub async fn put_default(&self, key: &str, value: V) -> Result<()> {
        self.put(key, value, self.default_minutes).await
    }

    /// Write a value only if the key is absent.
    ///
    /// Returns `false` without touching the store when the expiry leaves no
    /// whole minute.
    pub async fn add(&self, key: &str, value: V, ttl: impl Into<Expiry>) -> Result<bool> {
        let Some(minutes) = ttl.into().minutes() else {
            trace!("Expiry for key '{}' already passed, skipping add", key);
            return Ok(false);
        };

        let inserted = self.store.add(key, value, minutes).await?;
        if inserted {
            self.record_write(key, Some(minutes));
        }
        Ok(inserted)
    }

    pub async fn forever(&self, key: &str, value: V) -> Result<()> {
        self.store.forever(key, value).await?;
        self.record_write(key, None);
        Ok(())
    }

    /// Return the cached value, or run `resolver` once and store its result.
    /// A failing resolver writes nothing.
    pub async fn remember<F, Fut>(
        &self,
        key: &str,
        ttl: impl Into<Expiry>,
        resolver: F,
    ) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.get(key).await? {
            return Ok(value);
        }

        let value = resolver().await?;
        self.put(key, value.clone(), ttl).await?;
        Ok(value)
    }

    /// Like [`Repository::remember`], but stores the result permanently.
    pub async fn remember_forever<F, Fut>(&self, key: &str, resolver: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.get(key).await? {
            return Ok(value);
        }

        let value = resolver().await?;
        self.forever(key, value.clone()).await?;
        Ok(value)
    }

    pub async fn forget(&self, key: &str) -> Result<bool> {
        let existed = self.store.forget(key).await?;
        if existed {
            debug!("Forgot key '{}'", key);
            self.fire(CacheEvent::forgotten(key));
        }
        Ok(existed)
    }

    /// Fetch a value and remove it from the store.
    pub async fn pull(&self, key: &str) -> Result<Option<V>> {
        let value = self.get(key).await?;
        if value.is_some() {
            self.forget(key).await?;
        }
        Ok(value)
    }

    fn record_lookup(&self, key: &str, hit: bool) {
        if hit {
            debug!("Cache hit for key '{}'", key);
            self.fire(CacheEvent::hit(key));
        } else {
            debug!("Cache miss for key '{}'", key);
            self.fire(CacheEvent::missed(key));
        }
    }

    fn record_write(&self, key: &str, minutes: Option<Minutes>) {
        debug!("Wrote key '{}' (ttl: {:?})", key, minutes);
        self.fire(CacheEvent::written(key, minutes.map(|m| m.0)));
    }

    fn fire(&self, event: CacheEvent) {
        if let Some(ref dispatcher) = self.event_dispatcher {
            dispatcher.dispatch(event);
        }
    }
}

impl<V> Debug for Repository<V>
where
    V: Debug + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("store", &"<dyn CacheStore>")
            .field("event_dispatcher", &self.event_dispatcher.is_some())
            .field("default_minutes", &self.default_minutes)
            .finish()
    }
}
