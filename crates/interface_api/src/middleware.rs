//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

use crate::auth::validate_token;
use crate::error::ApiError;
use crate::AppState;

/// Acting user, attached to the response so the outer audit layer can log it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditUser(pub String);

/// Authentication middleware
///
/// Validates the bearer token and stores its [`Claims`](crate::auth::Claims) in the request
/// extensions for the handlers' permission checks.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| {
            warn!(uri = %request.uri(), "Missing or invalid Authorization header");
            ApiError::Unauthorized
        })?;

    let claims = validate_token(token, &state.config.jwt_secret).map_err(|e| {
        warn!(error = %e, "Token validation failed");
        ApiError::from(e)
    })?;

    let user = AuditUser(claims.sub.clone());
    request.extensions_mut().insert(claims);
    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

/// Audit logging middleware
///
/// Wraps authentication, so rejected requests are logged as `anonymous`.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = Instant::now();
    let response = next.run(request).await;
    let status = response.status();
    let user_id = response
        .extensions()
        .get::<AuditUser>()
        .map_or("anonymous", |u| u.0.as_str());

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        status = status.as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Fee API request"
    );

    response
}
