use std::net::SocketAddr;

use anyhow::Context;
use common::storage::BlobStoreHandle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use admissions::config::AppConfig;
use admissions::database::{ensure_indexes, init_db};
use admissions::state::AppState;
use admissions::storage::open_blob_store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;
    info!("Database ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    // Requests can arrive before the blob store is ready; they get
    // STORE_UNAVAILABLE until it opens.
    let blob_store = BlobStoreHandle::new();
    {
        let handle = blob_store.clone();
        let storage = config.storage.clone();
        let db = db.clone();
        tokio::spawn(async move {
            match open_blob_store(&storage, &db).await {
                Ok(store) => {
                    handle.open(store);
                }
                Err(e) => error!(error = %e, "Failed to open blob store"),
            }
        });
    }

    let state = AppState {
        db,
        blob_store,
        config,
    };
    let app = admissions::build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
