#![deny(clippy::all)]

use crate::events::CacheEvent;
use async_trait::async_trait;
use shared::{Minutes, Result};

// Ports are the pluggable extension points the repository delegates to

/// Port for the underlying key-value store.
/// `None` is the miss sentinel; a store never reports a stored "nothing".
#[async_trait]
pub trait CacheStore<V>: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<V>>;

    /// Batch lookup, answered in the order of `keys`.
    async fn many(&self, keys: &[String]) -> Result<Vec<(String, Option<V>)>>;

    async fn put(&self, key: &str, value: V, ttl: Minutes) -> Result<()>;

    async fn put_many(&self, entries: Vec<(String, V)>, ttl: Minutes) -> Result<()>;

    async fn forever(&self, key: &str, value: V) -> Result<()>;

    /// Insert only when `key` is absent. Returns whether the value was inserted.
    async fn add(&self, key: &str, value: V, ttl: Minutes) -> Result<bool>;

    /// Remove `key`. Returns whether it existed.
    async fn forget(&self, key: &str) -> Result<bool>;
}

/// Port for lifecycle notifications
pub trait EventDispatcher: Send + Sync + 'static {
    fn dispatch(&self, event: CacheEvent);
}
