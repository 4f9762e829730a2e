use carbon_repository::{CacheEvent, Fallback, Repository};
use chrono::{TimeDelta, Utc};
use serde_json::json;
use shared::config::Config;
use std::sync::Arc;
use storage_engine::MokaStore;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables before reading the log level
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    let config = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Carbon repository demo");
    if dotenv_loaded {
        info!("Loaded environment variables from .env file");
    } else {
        info!("No .env file found, using system environment variables");
    }

    let store = Arc::new(MokaStore::<String>::new(&config.cache_name, config.max_entries));
    let mut repo: Repository<String> = Repository::from_config(store, &config);

    let (tx, mut rx) = broadcast::channel::<CacheEvent>(256);
    repo.set_event_dispatcher(Arc::new(tx));

    let listener = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            info!("event: {} '{}'", event.kind(), event.key());
        }
    });

    Repository::<String>::register_macro("describe", |repo, _args| {
        Box::pin(async move { Ok(json!(format!("{:?}", repo))) })
    });

    let greeting = repo
        .remember("greeting", 10, || async { Ok("hello".to_string()) })
        .await?;
    info!("remember(greeting) -> {}", greeting);

    repo.put_many(
        [("a", "1".to_string()), ("b", "2".to_string())],
        Utc::now() + TimeDelta::minutes(5),
    )
    .await?;

    let values = repo
        .many_with([
            ("a", None),
            ("b", None),
            ("c", Some(Fallback::value("fallback".to_string()))),
        ])
        .await?;
    info!("many(a, b, c) -> {:?}", values);

    let added = repo.add("a", "changed".to_string(), 5).await?;
    info!("add(a) -> {}", added);

    repo.put_default("session", "token".to_string()).await?;
    info!("pull(session) -> {:?}", repo.pull("session").await?);

    info!("describe -> {}", repo.call("describe", vec![]).await?);

    // Dropping the repository closes the event channel
    drop(repo);
    listener.await?;

    info!("Carbon repository demo finished");
    Ok(())
}
