use crate::ports::CacheStore;
use async_trait::async_trait;
use shared::{Error, Minutes, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// A store call as observed by [`RecordingStore`]. TTLs are recorded in minutes.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall<V> {
    Get(String),
    Many(Vec<String>),
    Put(String, V, u64),
    PutMany(Vec<(String, V)>, u64),
    Forever(String, V),
    Add(String, V, u64),
    Forget(String),
}

/// In-memory store double that records every call made against it
pub struct RecordingStore<V> {
    entries: Mutex<HashMap<String, V>>,
    calls: Mutex<Vec<StoreCall<V>>>,
    error: Mutex<Option<String>>,
}

impl<V: Clone> RecordingStore<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            error: Mutex::new(None),
        }
    }

    pub fn with_entry(self, key: &str, value: V) -> Self {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value);
        self
    }

    pub fn with_error(self, error: impl Into<String>) -> Self {
        *self.error.lock().unwrap() = Some(error.into());
        self
    }

    pub fn calls(&self) -> Vec<StoreCall<V>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn entry(&self, key: &str) -> Option<V> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn record(&self, call: StoreCall<V>) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.error.lock().unwrap().clone() {
            Some(error) => Err(Error::Store(error)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<V> CacheStore<V> for RecordingStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>> {
        self.record(StoreCall::Get(key.to_string()))?;
        Ok(self.entry(key))
    }

    async fn many(&self, keys: &[String]) -> Result<Vec<(String, Option<V>)>> {
        self.record(StoreCall::Many(keys.to_vec()))?;
        Ok(keys.iter().map(|k| (k.clone(), self.entry(k))).collect())
    }

    async fn put(&self, key: &str, value: V, ttl: Minutes) -> Result<()> {
        self.record(StoreCall::Put(key.to_string(), value.clone(), ttl.0))?;
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn put_many(&self, entries: Vec<(String, V)>, ttl: Minutes) -> Result<()> {
        self.record(StoreCall::PutMany(entries.clone(), ttl.0))?;
        self.entries.lock().unwrap().extend(entries);
        Ok(())
    }

    async fn forever(&self, key: &str, value: V) -> Result<()> {
        self.record(StoreCall::Forever(key.to_string(), value.clone()))?;
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn add(&self, key: &str, value: V, ttl: Minutes) -> Result<bool> {
        self.record(StoreCall::Add(key.to_string(), value.clone(), ttl.0))?;
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value);
        Ok(true)
    }

    async fn forget(&self, key: &str) -> Result<bool> {
        self.record(StoreCall::Forget(key.to_string()))?;
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }
}
