//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_fees::FeeError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone()),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<FeeError> for ApiError {
    fn from(err: FeeError) -> Self {
        match err {
            FeeError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            FeeError::InvalidDiscount { .. }
            | FeeError::InvalidPayment(_)
            | FeeError::OverpaymentRejected { .. }
            | FeeError::MissingRequiredField(_)
            | FeeError::InvalidStatusUpdate(_) => ApiError::BadRequest(err.to_string()),
            FeeError::Port(port) => port.into(),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Validation { message } => ApiError::Validation(message),
            ref transient if transient.is_transient() => ApiError::Unavailable(err.to_string()),
            other => {
                error!(error = %other, "Port failure");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingPermission(_) => ApiError::Forbidden(err.to_string()),
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_fee_error_status_codes() {
        assert_eq!(status_of(FeeError::not_found("Fee", "FEE-1")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(FeeError::InvalidDiscount { value: dec!(150) }), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(FeeError::OverpaymentRejected { max_payment: dec!(40) }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(FeeError::missing("Student ID is required")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(FeeError::Port(PortError::internal("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_overpayment_message_names_maximum() {
        let err: ApiError = FeeError::OverpaymentRejected { max_payment: dec!(40) }.into();
        assert!(err.to_string().contains("Maximum payment: 40"));
    }

    #[test]
    fn test_missing_permission_is_forbidden() {
        assert_eq!(
            status_of(AuthError::MissingPermission("fee:write".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(AuthError::TokenExpired), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_concurrent_modification_is_conflict() {
        let err = FeeError::from(PortError::conflict("Fee FEE-1 was modified concurrently"));
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_transient_port_error_is_unavailable() {
        assert_eq!(
            status_of(PortError::connection("refused")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
