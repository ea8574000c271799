mod dashmap_cache_backend;
mod maxmind_geo_dataset;
mod redis_cache_backend;

pub use dashmap_cache_backend::DashMapCacheBackend;
pub use maxmind_geo_dataset::MaxMindGeoDataset;
pub use redis_cache_backend::{RedisCacheBackend, RedisSettings};
