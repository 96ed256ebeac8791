//! Meridian server binary.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use meridian::config::{AppConfig, StorageBackend};
use meridian::server::ServerBuilder;
use meridian::storage::InMemoryDocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.clone())),
        )
        .init();

    let app = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("using the in-memory store; data will not survive a restart");
            ServerBuilder::new()
                .with_store(InMemoryDocumentStore::new())
                .build()?
        }
        StorageBackend::Postgres => build_postgres(&config).await?,
    };

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "meridian server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Configuration comes from the file named by MERIDIAN_CONFIG, falling
/// back to built-in defaults.
fn load_config() -> Result<AppConfig> {
    match std::env::var("MERIDIAN_CONFIG") {
        Ok(path) => AppConfig::from_yaml_file(&path),
        Err(_) => Ok(AppConfig::default()),
    }
}

#[cfg(feature = "postgres")]
async fn build_postgres(config: &AppConfig) -> Result<axum::Router> {
    let url = config
        .storage
        .url
        .as_deref()
        .context("storage.url is required for the postgres backend")?;
    let store = meridian::storage::PostgresDocumentStore::connect(url).await?;
    ServerBuilder::new().with_store(store).build()
}

#[cfg(not(feature = "postgres"))]
async fn build_postgres(_config: &AppConfig) -> Result<axum::Router> {
    anyhow::bail!("this build does not include the postgres backend; enable the 'postgres' feature")
}
