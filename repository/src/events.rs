use crate::ports::EventDispatcher;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CacheEvent {
    Hit(KeyEvent),
    Missed(KeyEvent),
    Written(KeyWrittenEvent),
    Forgotten(KeyEvent),
}

impl CacheEvent {
    pub fn hit(key: &str) -> Self {
        CacheEvent::Hit(KeyEvent::new(key))
    }

    pub fn missed(key: &str) -> Self {
        CacheEvent::Missed(KeyEvent::new(key))
    }

    /// `minutes` is `None` for permanent writes.
    pub fn written(key: &str, minutes: Option<u64>) -> Self {
        CacheEvent::Written(KeyWrittenEvent {
            key: key.to_string(),
            minutes,
            timestamp: now_timestamp(),
        })
    }

    pub fn forgotten(key: &str) -> Self {
        CacheEvent::Forgotten(KeyEvent::new(key))
    }

    pub fn key(&self) -> &str {
        match self {
            CacheEvent::Hit(e) | CacheEvent::Missed(e) | CacheEvent::Forgotten(e) => &e.key,
            CacheEvent::Written(e) => &e.key,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CacheEvent::Hit(_) => "hit",
            CacheEvent::Missed(_) => "missed",
            CacheEvent::Written(_) => "written",
            CacheEvent::Forgotten(_) => "forgotten",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    pub timestamp: i64,
}

impl KeyEvent {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            timestamp: now_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWrittenEvent {
    pub key: String,
    pub minutes: Option<u64>,
    pub timestamp: i64,
}

/// Current timestamp in seconds since UNIX epoch
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

impl EventDispatcher for broadcast::Sender<CacheEvent> {
    fn dispatch(&self, event: CacheEvent) {
        let kind = event.kind();
        let key = event.key().to_string();

        match self.send(event) {
            Ok(subscriber_count) => {
                tracing::debug!(
                    "Broadcasted {} event for key '{}' to {} subscriber(s)",
                    kind,
                    key,
                    subscriber_count
                );
            }
            Err(_) => {
                tracing::trace!("No subscribers for {} event on key '{}'", kind, key);
            }
        }
    }
}
