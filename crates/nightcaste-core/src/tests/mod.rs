//! Cross-module tests.
//!
//! - `determinism.rs`: identical inputs give identical event streams and stores
//! - `integration.rs`: configuration → entities → behaviours → events → store
//! - `helpers.rs`: shared components, systems and setup functions

mod helpers;
mod integration;

pub use helpers::*;
