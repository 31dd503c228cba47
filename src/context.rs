/// Application context and dependency injection
use crate::{
    config::{ServerConfig, StoreBackend},
    db,
    error::{ShelfError, ShelfResult},
    feed::{Clock, FeedService, SystemClock},
    seed,
    store::{DataStore, MemoryStore, SqliteStore},
};
use std::sync::Arc;
use tracing::info;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn DataStore>,
    pub feed: Arc<FeedService>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ShelfResult<Self> {
        // Validate configuration
        config.validate()?;

        let store: Arc<dyn DataStore> = match &config.storage.backend {
            StoreBackend::Sqlite { location } => {
                let pool = db::create_pool(location, db::DatabaseOptions::default()).await?;
                db::run_migrations(&pool).await?;
                db::test_connection(&pool).await?;
                info!("Using SQLite store at {}", location.display());
                Arc::new(SqliteStore::new(pool))
            }
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        if let Some(seed_file) = &config.storage.seed_file {
            seed::load_seed(seed_file, store.as_ref()).await.map_err(|e| {
                ShelfError::Internal(format!("Failed to load seed {:?}: {}", seed_file, e))
            })?;
        }

        Ok(Self::with_store(config, store, Arc::new(SystemClock)))
    }

    /// Assemble a context around an existing store
    pub fn with_store(config: ServerConfig, store: Arc<dyn DataStore>, clock: Arc<dyn Clock>) -> Self {
        let feed = Arc::new(FeedService::new(
            Arc::clone(&store),
            clock,
            config.feed.clone(),
        ));

        Self {
            config: Arc::new(config),
            store,
            feed,
        }
    }

    /// Get service address
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
