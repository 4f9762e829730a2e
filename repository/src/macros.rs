//! Type-level extension registry.
//!
//! Macros are registered once per value type and become callable by name on
//! every [`Repository`] of that type. Entries live for the rest of the process.

use crate::repository::Repository;
use dashmap::DashMap;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use serde_json::Value;
use shared::{Error, Result};
use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

pub type MacroFuture<'a> = BoxFuture<'a, Result<Value>>;

pub type MacroFn<V> =
    Arc<dyn for<'a> Fn(&'a Repository<V>, Vec<Value>) -> MacroFuture<'a> + Send + Sync>;

// (value type, name) -> MacroFn<V>, erased so one table serves every V
static MACROS: Lazy<DashMap<(TypeId, String), Box<dyn Any + Send + Sync>>> =
    Lazy::new(DashMap::new);

impl<V> Repository<V>
where
    V: Debug + Clone + Send + Sync + 'static,
{
    /// Register `f` under `name` for every repository holding `V` values.
    /// Registering an existing name replaces it.
    pub fn register_macro<F>(name: impl Into<String>, f: F)
    where
        F: for<'a> Fn(&'a Repository<V>, Vec<Value>) -> MacroFuture<'a> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!("Registering repository macro '{}'", name);

        let f: MacroFn<V> = Arc::new(f);
        MACROS.insert((TypeId::of::<V>(), name), Box::new(f));
    }

    pub fn has_macro(name: &str) -> bool {
        MACROS.contains_key(&(TypeId::of::<V>(), name.to_string()))
    }

    fn lookup_macro(name: &str) -> Option<MacroFn<V>> {
        let entry = MACROS.get(&(TypeId::of::<V>(), name.to_string()))?;
        let erased: &(dyn Any + Send + Sync) = entry.value().as_ref();
        erased.downcast_ref::<MacroFn<V>>().cloned()
    }

    /// Invoke a registered macro with this repository and `args`.
    pub async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let Some(f) = Self::lookup_macro(name) else {
            return Err(Error::MethodNotFound(name.to_string()));
        };
        f(self, args).await
    }
}
