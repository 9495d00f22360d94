//! Core Kernel - Foundational types shared by the school fees crates
//!
//! This crate provides the building blocks used across the domain and
//! infrastructure layers:
//! - Strongly-typed identifiers for students, subjects, and fee records
//! - Port infrastructure (error type, marker traits, health checks) for
//!   the ports and adapters architecture

pub mod identifiers;
pub mod ports;

pub use identifiers::{StudentId, SubjectId, FeeId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
