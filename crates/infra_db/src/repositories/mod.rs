//! Repository implementations for the fee ledger
//!
//! Repositories encapsulate SQL and speak in row types; the adapters map
//! rows to and from domain types.
//!
//! Queries are built at runtime with `sqlx::query_as` and `QueryBuilder`,
//! so the crate compiles without a live database.

pub mod fees;
pub mod roster;

pub use fees::{FeeFilter, FeeRepository, FeeRow};
pub use roster::{RosterRepository, StudentRow, SubjectRow};
