use crate::adapters::outbound::RedisSettings;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // HTTP server
    pub listen_addr: String,

    // Cache settings
    pub cache_backend: CacheBackendKind,
    pub redis_addr: String,
    pub redis_password: Option<String>,
    pub redis_db: i64,
    pub cache_ttl_secs: u64,
    pub cache_gc_interval_secs: u64,

    // Dataset settings
    pub local_db_path: String,
    pub dataset_url: Option<String>,

    // Logging
    pub log_format: LogFormat,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            cache_backend: CacheBackendKind::Redis,
            redis_addr: "localhost:6379".to_string(),
            redis_password: None,
            redis_db: 0,
            cache_ttl_secs: 86_400,
            cache_gc_interval_secs: 60,
            local_db_path: "./geoip.mmdb".to_string(),
            dataset_url: None,
            log_format: LogFormat::Text,
            debug: false,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("CACHE_TTL_SECS must be greater than zero")]
    ZeroCacheTtl,
    #[error("LOCAL_DB_PATH is required")]
    MissingDatasetPath,
    #[error("unknown CACHE_BACKEND {0:?} (expected \"redis\" or \"memory\")")]
    UnknownCacheBackend(String),
    #[error("unknown LOG_FORMAT {0:?} (expected \"text\" or \"json\")")]
    UnknownLogFormat(String),
}

impl Config {
    /// Build a configuration from a variable lookup function.
    ///
    /// Numbers that fail to parse fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| {
            let port = lookup("PORT").unwrap_or_else(|| "8080".to_string());
            format!("0.0.0.0:{}", port)
        });

        let cache_backend = match lookup("CACHE_BACKEND") {
            None => defaults.cache_backend,
            Some(v) => match v.to_lowercase().as_str() {
                "redis" => CacheBackendKind::Redis,
                "memory" => CacheBackendKind::Memory,
                _ => return Err(ConfigError::UnknownCacheBackend(v)),
            },
        };

        let redis_addr = lookup("REDIS_ADDR").unwrap_or(defaults.redis_addr);
        let redis_password = lookup("REDIS_PASSWORD").filter(|p| !p.is_empty());

        let redis_db = lookup("REDIS_DB")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.redis_db);

        let cache_ttl_secs = lookup("CACHE_TTL_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache_ttl_secs);

        let cache_gc_interval_secs = lookup("CACHE_GC_INTERVAL_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache_gc_interval_secs);

        let local_db_path = lookup("LOCAL_DB_PATH").unwrap_or(defaults.local_db_path);
        let dataset_url = lookup("DATASET_URL").filter(|u| !u.is_empty());

        let log_format = match lookup("LOG_FORMAT") {
            None => defaults.log_format,
            Some(v) => match v.to_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::UnknownLogFormat(v)),
            },
        };

        let debug = lookup("DEBUG")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.debug);

        let config = Config {
            listen_addr,
            cache_backend,
            redis_addr,
            redis_password,
            redis_db,
            cache_ttl_secs,
            cache_gc_interval_secs,
            local_db_path,
            dataset_url,
            log_format,
            debug,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::ZeroCacheTtl);
        }
        if self.local_db_path.trim().is_empty() {
            return Err(ConfigError::MissingDatasetPath);
        }
        Ok(())
    }

    pub fn redis_settings(&self) -> RedisSettings {
        RedisSettings {
            addr: self.redis_addr.clone(),
            password: self.redis_password.clone(),
            db: self.redis_db,
        }
    }
}

/// Load configuration from the process environment.
///
/// A `.env` file in the working directory is read first when present.
pub fn load_config() -> anyhow::Result<Config> {
    // Logging is not up yet, so a missing or unreadable .env stays silent
    let _ = dotenvy::dotenv();

    let config = Config::from_lookup(|key| std::env::var(key).ok())?;
    Ok(config)
}
