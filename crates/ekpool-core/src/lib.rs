//! Cross-cutting service plumbing: configuration loading, health probes,
//! request ids, tracing setup, serde helpers and sea-orm query extensions.

pub mod config;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
