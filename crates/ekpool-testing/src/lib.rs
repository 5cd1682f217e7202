//! Test utilities for the pool service.
//!
//! Import from `[dev-dependencies]` only, never in production code.

pub mod auth;
