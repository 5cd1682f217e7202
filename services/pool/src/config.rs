use std::path::PathBuf;

use serde::Deserialize;

use ekpool_core::config::Config;

/// Pool service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct PoolConfig {
    /// PostgreSQL connection URL. When absent the service runs on the in-memory store.
    #[serde(default)]
    pub database_url: Option<String>,
    /// TCP port for the HTTP server (default 3120). Env var: `POOL_PORT`.
    #[serde(default = "default_pool_port")]
    pub pool_port: u16,
    /// HMAC secret for validating bearer access tokens.
    pub jwt_secret: String,
    /// JSON country table; the built-in catalog is used when unset.
    #[serde(default)]
    pub country_catalog_path: Option<PathBuf>,
    /// Apply pending migrations at startup. Env var: `RUN_MIGRATIONS`.
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_pool_port() -> u16 {
    3120
}

impl Config for PoolConfig {}
