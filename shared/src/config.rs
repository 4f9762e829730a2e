use tracing::warn;

pub struct Config {
    pub cache_name: String,
    pub default_cache_minutes: i64,
    pub max_entries: Option<u64>,
    pub log_level: String,
}

impl Config {
    const DEFAULT_CACHE_NAME: &str = "carbon";
    const DEFAULT_CACHE_MINUTES: i64 = 60;
    const DEFAULT_LOG_LEVEL: &str = "info";

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_cache_minutes = match lookup("CARBON_DEFAULT_CACHE_MINUTES") {
            Some(raw) => raw.trim().parse::<i64>().unwrap_or_else(|_| {
                warn!(
                    "CARBON_DEFAULT_CACHE_MINUTES '{}' is not a number, using {}",
                    raw,
                    Self::DEFAULT_CACHE_MINUTES
                );
                Self::DEFAULT_CACHE_MINUTES
            }),
            None => Self::DEFAULT_CACHE_MINUTES,
        };

        let max_entries = lookup("CARBON_MAX_ENTRIES").and_then(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| warn!("CARBON_MAX_ENTRIES '{}' is not a number, cache is unbounded", raw))
                .ok()
        });

        Self {
            cache_name: lookup("CARBON_CACHE_NAME")
                .unwrap_or_else(|| Self::DEFAULT_CACHE_NAME.to_string()),
            default_cache_minutes,
            max_entries,
            log_level: lookup("CARBON_LOG_LEVEL")
                .unwrap_or_else(|| Self::DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}
