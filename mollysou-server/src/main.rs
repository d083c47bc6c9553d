mod shutdown;

use std::sync::Arc;

use anyhow::Context as _;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;

use mollysou_core::{Data, ProgressService};
use mollysou_database::{CacheService, Database};
use mollysou_progression::CooldownWindows;
use mollysou_utils::env::{env_bool, env_or, env_required};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(filter_fn(|metadata| *metadata.level() <= tracing::Level::INFO));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let database_url: String = env_required("DATABASE_URL")?;
    let reflex_hours: u32 = env_required("REFLEX_COOLDOWN_HOURS")?;
    let bind_address: String = env_or("BIND_ADDRESS", DEFAULT_BIND_ADDRESS.to_string());
    let max_connections: u32 = env_or("DATABASE_MAX_CONNECTIONS", 5);

    let redis_enabled = env_bool("REDIS_ENABLED", false);
    let redis_key_prefix: String = env_or("REDIS_KEY_PREFIX", "mollysou:prod".to_string());

    let cache = if redis_enabled {
        match std::env::var("REDIS_URL") {
            Ok(redis_url) => match CacheService::redis(&redis_url, redis_key_prefix.clone()) {
                Ok(cache) => {
                    info!(key_prefix = %redis_key_prefix, "Redis cache enabled.");
                    cache
                }
                Err(err) => {
                    warn!(?err, key_prefix = %redis_key_prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
                    CacheService::disabled(redis_key_prefix.clone())
                }
            },
            Err(_) => {
                warn!(key_prefix = %redis_key_prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
                CacheService::disabled(redis_key_prefix.clone())
            }
        }
    } else {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        CacheService::disabled(redis_key_prefix.clone())
    };

    if cache.is_redis_enabled() {
        if let Err(err) = cache.ping().await {
            warn!(
                ?err,
                "Redis cache ping failed; cache operations will continue with fallback behavior."
            );
        } else {
            info!("Redis cache health check passed.");
        }
    }

    let db = Database::connect(&database_url, max_connections, cache).await?;

    if env_bool("AUTO_RUN_MIGRATIONS", true) {
        db.migrate().await?;
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let windows = CooldownWindows::new(reflex_hours);
    info!(
        wheel_hours = windows.wheel_hours,
        puzzle_hours = windows.puzzle_hours,
        video_hours = windows.video_hours,
        reflex_hours = windows.reflex_hours,
        "Cooldown windows configured."
    );

    let progress = ProgressService::new(Arc::new(db.clone()), windows);
    let app = mollysou_api::router(Data { db, progress });

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(%bind_address, "MollySou API listening.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await?;

    info!("MollySou API stopped.");
    Ok(())
}
