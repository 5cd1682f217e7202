use sea_orm::Database;
use tracing::{info, warn};

use ekpool_core::config::Config;
use ekpool_core::tracing::init_tracing;
use ekpool_domain::country::CountryCatalog;
use ekpool_pool::config::PoolConfig;
use ekpool_pool::infra::StoreBackend;
use ekpool_pool::infra::memory::MemoryStore;
use ekpool_pool::router::build_router;
use ekpool_pool::state::AppState;
use ekpool_pool_migration::{Migrator, MigratorTrait};

#[tokio::main]
async fn main() {
    init_tracing("info,tower_http=debug");

    let config = PoolConfig::from_env();

    let catalog = match &config.country_catalog_path {
        Some(path) => {
            let json = std::fs::read_to_string(path).expect("failed to read country catalog");
            CountryCatalog::from_json(&json).expect("invalid country catalog")
        }
        None => CountryCatalog::builtin(),
    };
    info!(countries = catalog.entries().len(), "country catalog loaded");

    let store = match &config.database_url {
        Some(url) => {
            let db = Database::connect(url)
                .await
                .expect("failed to connect to database");
            if config.run_migrations {
                Migrator::up(&db, None)
                    .await
                    .expect("failed to run migrations");
                info!("migrations applied");
            }
            StoreBackend::Postgres(db)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            StoreBackend::Memory(MemoryStore::new())
        }
    };

    let state = AppState::new(store, catalog, &config.jwt_secret);

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.pool_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("pool service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
