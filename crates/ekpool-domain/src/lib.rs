//! Domain types shared across all EK-pool crates.
//!
//! This crate contains only pure types with no framework dependencies.

pub mod audit;
pub mod code;
pub mod country;
pub mod family;
pub mod pagination;
pub mod user;
