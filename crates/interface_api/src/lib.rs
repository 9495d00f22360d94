//! HTTP API Layer
//!
//! This crate exposes the fee ledger over REST using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: fee and health endpoints
//! - **Middleware**: bearer-token authentication and audit logging
//! - **DTOs**: request/response bodies, validated before reaching the service
//! - **Error Handling**: `FeeError` and `PortError` mapped to status codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(service, fee_port, config);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_fees::FeeService;

use crate::config::ApiConfig;
use crate::handlers::{fees, health};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub fees: Arc<FeeService>,
    /// Probed by the readiness check
    pub health: Arc<dyn HealthCheckable>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(fees: FeeService, health: Arc<dyn HealthCheckable>, config: ApiConfig) -> Self {
        Self {
            fees: Arc::new(fees),
            health,
            config: Arc::new(config),
        }
    }
}

/// Creates the main API router
///
/// Health endpoints are public; everything under `/api/v1` requires a
/// bearer token.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let fee_routes = Router::new()
        .route("/", post(fees::create_fee).get(fees::list_fees))
        .route("/summary", get(fees::fee_summary))
        .route(
            "/:id",
            get(fees::get_fee).put(fees::update_fee).delete(fees::delete_fee),
        )
        .route("/:id/payments", post(fees::record_payment));

    // The last layer added runs first, so audit also sees requests auth rejects
    let api_routes = Router::new()
        .nest("/fees", fee_routes)
        .route("/students/:id/fees", delete(fees::delete_student_fees))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
