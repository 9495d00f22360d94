//! Infrastructure Database Layer
//!
//! This crate provides PostgreSQL persistence for the school fee ledger
//! using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories own the SQL and
//! speak in row types; adapters implement the domain ports on top of them.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresFeeAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/school_fees")).await?;
//! run_migrations(&pool).await?;
//! let fees = PostgresFeeAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{PostgresFeeAdapter, PostgresRosterAdapter};
