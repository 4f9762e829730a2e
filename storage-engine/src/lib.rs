//! Store adapters for the carbon repository.

pub mod moka_cache;

pub use moka_cache::MokaStore;
