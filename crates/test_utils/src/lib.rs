//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! retail backend test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `world`: A fully wired in-memory branch for end-to-end flows
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod world;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use world::*;
