use std::sync::Arc;

use marketplace_service::config::{AppConfig, ConfigError, StorageKind};
use marketplace_service::domain::ports::MarketStore;
use marketplace_service::infrastructure::{DieselStore, MemoryStore};
use marketplace_service::{build_server, create_pool, run_migrations};

fn open_store(config: &AppConfig) -> Result<Arc<dyn MarketStore>, Box<dyn std::error::Error + Send + Sync>> {
    match config.storage {
        StorageKind::Memory => {
            log::warn!("using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let pool = create_pool(database_url, config.db_pool_size)?;
            run_migrations(&pool)?;
            Ok(Arc::new(DieselStore::new(pool)))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let store = open_store(&config).map_err(std::io::Error::other)?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(store, &config.host, config.port)?.await
}
