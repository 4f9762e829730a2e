pub mod domain;
pub mod events;
pub mod macros;
pub mod ports;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

pub use domain::Fallback;
pub use events::CacheEvent;
pub use macros::{MacroFn, MacroFuture};
pub use ports::{CacheStore, EventDispatcher};
pub use repository::Repository;
pub use shared::{Error, Expiry, Minutes, Result};
