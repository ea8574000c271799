//! Application Layer
//!
//! Use cases that orchestrate the domain ports.

mod batch_resolver;
mod resolution_service;

pub use batch_resolver::{BatchResolver, MAX_BATCH_SIZE};
pub use resolution_service::{ResolutionService, DEFAULT_CACHE_TTL};
