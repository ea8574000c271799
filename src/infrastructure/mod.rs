//! Infrastructure Layer
//!
//! Cross-cutting concerns and startup components.

pub mod dataset_fetcher;
pub mod shutdown;

pub use dataset_fetcher::{fetch_dataset, FetchError, DEFAULT_FETCH_TIMEOUT};
pub use shutdown::{listen_for_signals, Shutdown};
