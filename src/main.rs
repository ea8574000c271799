//! GeoIP API - IP geolocation lookup service
//!
//! This is the composition root that wires together all the components.

use anyhow::Context;
use geoip_api::adapters::inbound::ApiServer;
use geoip_api::adapters::outbound::{DashMapCacheBackend, MaxMindGeoDataset, RedisCacheBackend};
use geoip_api::config::{load_config, CacheBackendKind, Config, LogFormat};
use geoip_api::domain::ports::{CacheBackend, GeoDataset};
use geoip_api::infrastructure::{
    fetch_dataset, listen_for_signals, Shutdown, DEFAULT_FETCH_TIMEOUT,
};
use geoip_api::ResolutionService;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    init_logging(&cfg);

    tracing::info!(
        "starting geoip-api listen={} cache={:?}",
        cfg.listen_addr,
        cfg.cache_backend
    );

    // ===== COMPOSITION ROOT =====

    // 1. Materialize the dataset file if a remote source is configured
    if let Some(url) = &cfg.dataset_url {
        fetch_dataset(url, Path::new(&cfg.local_db_path), DEFAULT_FETCH_TIMEOUT)
            .await
            .context("failed to download GeoIP database")?;
    }

    // 2. Create outbound adapters
    let dataset = MaxMindGeoDataset::open(&cfg.local_db_path)
        .context("failed to open GeoIP database")?;
    tracing::info!(
        "GeoIP DB loaded from {} ({})",
        cfg.local_db_path,
        dataset.database_type()
    );
    let dataset: Arc<dyn GeoDataset> = Arc::new(dataset);

    let cache: Arc<dyn CacheBackend> = match cfg.cache_backend {
        CacheBackendKind::Redis => {
            let settings = cfg.redis_settings();
            let redis = RedisCacheBackend::connect(&settings)
                .await
                .context("failed to connect to Redis")?;
            tracing::info!("connected to Redis at {} db={}", settings.addr, settings.db);
            Arc::new(redis)
        }
        CacheBackendKind::Memory => {
            let memory = DashMapCacheBackend::new();
            memory.start_gc(Duration::from_secs(cfg.cache_gc_interval_secs.max(1)));
            tracing::info!("using in-memory cache");
            Arc::new(memory)
        }
    };

    // 3. Create application service
    let resolver = Arc::new(
        ResolutionService::new(dataset, cache)
            .with_cache_ttl(Duration::from_secs(cfg.cache_ttl_secs)),
    );

    // 4. Create inbound adapter and run until a shutdown signal arrives
    let shutdown = Shutdown::new();
    tokio::spawn(listen_for_signals(shutdown.clone()));

    let server = ApiServer::new(cfg.listen_addr.clone(), resolver);
    server.run(shutdown.wait()).await
}

fn init_logging(cfg: &Config) {
    let default_level = if cfg.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match cfg.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
