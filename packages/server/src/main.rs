use std::net::SocketAddr;

use anyhow::Context;
use bidbuy_server::config::AppConfig;
use bidbuy_server::database::init_db;
use bidbuy_server::state::AppState;
use common::storage::open_blob_store;
use tracing::{Level, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to connect to the database")?;
    info!("Database ready");

    let blob_store = open_blob_store(&config.storage)
        .await
        .context("Failed to open blob storage")?;
    info!(backend = ?config.storage.backend, "Blob storage ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host/server.port")?;

    let app = bidbuy_server::build_router(AppState::new(db, config, blob_store));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("BidBuy server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
