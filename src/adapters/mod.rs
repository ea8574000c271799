//! Adapters Layer
//!
//! Inbound adapters drive the application (HTTP); outbound adapters
//! implement the domain ports (MaxMind, Redis, in-memory cache).

pub mod inbound;
pub mod outbound;
