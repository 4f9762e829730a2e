use std::fmt;

/// What a lookup falls back to on a miss: a literal value,
/// or a producer that is only run when the key is missing.
pub enum Fallback<V> {
    Value(V),
    Producer(Box<dyn FnOnce() -> V + Send>),
}

impl<V> Fallback<V> {
    pub fn value(value: V) -> Self {
        Fallback::Value(value)
    }

    pub fn producer<F>(f: F) -> Self
    where
        F: FnOnce() -> V + Send + 'static,
    {
        Fallback::Producer(Box::new(f))
    }

    pub fn resolve(self) -> V {
        match self {
            Fallback::Value(value) => value,
            Fallback::Producer(f) => f(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Fallback<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Fallback::Producer(_) => f.write_str("Producer(<fn>)"),
        }
    }
}
