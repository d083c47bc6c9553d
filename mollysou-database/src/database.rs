use anyhow::Context as _;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, migrate::Migrator};
use tracing::info;

use crate::cache::CacheService;

/// Schema for users, catalog and carts.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres pool plus read cache, cloned into every request.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
    cache: CacheService,
}

impl Database {
    /// Wrap a pool with caching disabled.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: CacheService::disabled("mollysou:prod"),
        }
    }

    pub fn with_cache(pool: PgPool, cache: CacheService) -> Self {
        Self { pool, cache }
    }

    /// Open a pool of at most `max_connections` against `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        cache: CacheService,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to PostgreSQL")?;
        info!(max_connections, "PostgreSQL connection established.");

        Ok(Self::with_cache(pool, cache))
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .context("failed to run database migrations")?;
        info!("Database migrations applied.");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }
}
