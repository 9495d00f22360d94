//! Fee domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the fee domain
///
/// Every variant is raised before any mutation is persisted, so a failed
/// call leaves the stored invoice exactly as it was.
#[derive(Debug, Error)]
pub enum FeeError {
    /// Referenced student, subject, or fee record does not exist
    #[error("{entity} not found with id: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    /// Percentage discount outside 0-100, or a negative discount value
    #[error("Invalid discount value {value}. Percentage must be between 0-100.")]
    InvalidDiscount {
        value: Decimal,
    },

    /// Non-positive payment, or a negative amount paid on update
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    /// Payment would push the amount paid past the amount due
    #[error("Payment amount exceeds amount due. Maximum payment: {max_payment}")]
    OverpaymentRejected {
        max_payment: Decimal,
    },

    /// Required creation input is absent or non-positive
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Update both sets and clears the status override
    #[error("Invalid status update: {0}")]
    InvalidStatusUpdate(String),

    /// Persistence or lookup failure reported by an adapter
    #[error("Port error: {0}")]
    Port(PortError),
}

impl FeeError {
    /// Creates a NotFound error for an entity type and identifier
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        FeeError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a MissingRequiredField error
    pub fn missing(field: impl Into<String>) -> Self {
        FeeError::MissingRequiredField(field.into())
    }

    /// Returns true if the caller supplied something the domain rejects
    ///
    /// Client errors are surfaced as-is and never retried.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FeeError::Port(_))
    }
}

impl From<PortError> for FeeError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => FeeError::NotFound {
                entity: entity_type,
                id,
            },
            other => FeeError::Port(other),
        }
    }
}
