mod cache_backend;
mod geo_dataset;

pub use cache_backend::CacheBackend;
pub use geo_dataset::GeoDataset;
