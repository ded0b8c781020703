use anyhow::Result;
use localization_api::config::{Config, StoreBackend};
use localization_api::queries::QueryService;
use localization_api::server;
use localization_api::store::{LocalizationStore, PostgresStore, RestStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("localization_api=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Starting localization API ({}, {} store)",
        config.environment,
        config.store.name()
    );

    let store = connect_store(&config.store).await?;
    let queries = QueryService::new(store);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    server::serve(listener, queries).await
}

async fn connect_store(backend: &StoreBackend) -> Result<Arc<dyn LocalizationStore>> {
    let store: Arc<dyn LocalizationStore> = match backend {
        StoreBackend::Rest { url, api_key } => {
            info!("Using remote query API at {}", url);
            Arc::new(RestStore::new(url, api_key))
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresStore::connect(database_url, *max_connections).await?;
            info!("✓ Connected to Postgres ({} max connections)", max_connections);
            Arc::new(store)
        }
    };
    Ok(store)
}
