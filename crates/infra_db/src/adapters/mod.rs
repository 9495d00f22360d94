//! Domain Adapters
//!
//! Adapter implementations for the fee domain ports, connecting them to the
//! PostgreSQL repositories.
//!
//! Each adapter:
//! - Implements a domain port trait
//! - Translates between domain models and database row types
//! - Converts `DatabaseError` into `PortError`

pub mod fees;
pub mod roster;

pub use fees::PostgresFeeAdapter;
pub use roster::PostgresRosterAdapter;
