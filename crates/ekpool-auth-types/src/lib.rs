//! Auth types shared by the pool service and its test tooling.
//!
//! Provides JWT validation and the bearer-token `Identity` extractor.

pub mod identity;
pub mod token;
