// shared/src/lib.rs

use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("method {0} does not exist")]
    MethodNotFound(String),
    #[error("store: {0}")]
    Store(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A normalized, strictly positive time-to-live in whole minutes.
/// This is the only TTL shape a store ever receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Minutes(pub u64);

impl Minutes {
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0.saturating_mul(60))
    }
}

/// Expiry as given by a caller: relative minutes or an absolute point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    Minutes(i64),
    At(DateTime<Utc>),
}

impl Expiry {
    /// Resolve against the current time.
    pub fn minutes(&self) -> Option<Minutes> {
        self.minutes_from(Utc::now())
    }

    /// Resolve to whole minutes remaining after `now`.
    /// Partial minutes are truncated; `None` when nothing positive remains.
    /// Relative values go through the same rule, so `Expiry::Minutes(0)` or a
    /// negative count also resolves to `None`.
    pub fn minutes_from(&self, now: DateTime<Utc>) -> Option<Minutes> {
        let minutes = match self {
            Expiry::Minutes(m) => *m,
            Expiry::At(at) => (*at - now).num_minutes(),
        };

        if minutes > 0 {
            Some(Minutes(minutes as u64))
        } else {
            None
        }
    }
}

impl From<i32> for Expiry {
    fn from(minutes: i32) -> Self {
        Expiry::Minutes(i64::from(minutes))
    }
}

impl From<i64> for Expiry {
    fn from(minutes: i64) -> Self {
        Expiry::Minutes(minutes)
    }
}

impl From<u32> for Expiry {
    fn from(minutes: u32) -> Self {
        Expiry::Minutes(i64::from(minutes))
    }
}

impl From<u64> for Expiry {
    fn from(minutes: u64) -> Self {
        Expiry::Minutes(i64::try_from(minutes).unwrap_or(i64::MAX))
    }
}

impl From<Minutes> for Expiry {
    fn from(minutes: Minutes) -> Self {
        minutes.0.into()
    }
}

/// Durations are truncated to whole minutes: anything under 60 seconds
/// becomes zero and the write is dropped.
impl From<Duration> for Expiry {
    fn from(duration: Duration) -> Self {
        (duration.as_secs() / 60).into()
    }
}

impl From<DateTime<Utc>> for Expiry {
    fn from(at: DateTime<Utc>) -> Self {
        Expiry::At(at)
    }
}

pub mod config;
