use anyhow::{Context, Result};
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::AppConfig;
use crate::database;
use crate::matchmaking::MatchResolver;
use crate::services::{CatalogService, ImageQueue, MaintenanceService};
use crate::store::SqliteStore;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let store = open_store(&self.config)?;
        let (images, _worker) = ImageQueue::spawn(store.clone(), self.config.storage.image_cache_dir.clone());

        let state = Arc::new(AppState {
            store: store.clone(),
            resolver: MatchResolver::new(Arc::new(store.clone())),
            catalog: CatalogService::new(store.clone(), self.config.rating.clone()),
            maintenance: MaintenanceService::new(store, self.config.rating.clone(), &self.config.storage),
            images,
            config: self.config.clone(),
        });

        let app = create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Opens the configured database, creating its directory on first run.
pub fn open_store(config: &AppConfig) -> Result<SqliteStore> {
    let db_path = &config.storage.database_path;
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }

    let pool = database::create_pool(&db_path.to_string_lossy())?;
    info!("Using database at {}", db_path.display());
    SqliteStore::open(pool)
}
