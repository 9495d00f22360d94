//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! school fees test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built students, subjects, and seeded mock ports
//! - `builders`: Builder patterns for charge requests and charge inputs
//! - `database`: Database test helpers and container management
//! - `assertions`: Assertion helpers for invoice invariants
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
