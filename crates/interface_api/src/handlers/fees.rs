//! Fee handlers
//!
//! Reads need `fee:read`; anything that changes the ledger needs `fee:write`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{FeeId, StudentId};
use domain_fees::{FeeQuery, FeeUpdate};

use crate::auth::{permissions, require_permission, Claims};
use crate::dto::fees::*;
use crate::{error::ApiError, AppState};

/// Creates charges for a student across one or more subjects
pub async fn create_fee(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateFeeRequest>,
) -> Result<(StatusCode, Json<CreateFeeResponse>), ApiError> {
    require_permission(&claims, permissions::FEE_WRITE)?;
    request.validate()?;

    let created = state.fees.create_charge(request.into()).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Lists fees matching the query-string filters
pub async fn list_fees(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<FeeListParams>,
) -> Result<Json<Vec<FeeResponse>>, ApiError> {
    require_permission(&claims, permissions::FEE_READ)?;
    params.validate()?;

    let fees = state.fees.list_charges(FeeQuery::try_from(params)?).await?;
    Ok(Json(fees.into_iter().map(FeeResponse::from).collect()))
}

/// Gets a fee by ID
pub async fn get_fee(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeeResponse>, ApiError> {
    require_permission(&claims, permissions::FEE_READ)?;

    let fee = state.fees.get_charge(FeeId::from(id)).await?;
    Ok(Json(fee.into()))
}

/// Updates a fee
pub async fn update_fee(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFeeRequest>,
) -> Result<Json<FeeResponse>, ApiError> {
    require_permission(&claims, permissions::FEE_WRITE)?;
    request.validate()?;

    let update = FeeUpdate::try_from(request)?;
    let fee = state.fees.update_charge(FeeId::from(id), update).await?;
    Ok(Json(fee.into()))
}

/// Records a payment against a fee
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<FeeResponse>, ApiError> {
    require_permission(&claims, permissions::FEE_WRITE)?;

    let fee = state.fees.record_payment(FeeId::from(id), request.amount).await?;
    Ok(Json(fee.into()))
}

/// Deletes a fee
pub async fn delete_fee(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_permission(&claims, permissions::FEE_WRITE)?;

    state.fees.delete_charge(FeeId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes every fee billed to a student
pub async fn delete_student_fees(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<DeletedFeesResponse>, ApiError> {
    require_permission(&claims, permissions::FEE_WRITE)?;

    let deleted = state
        .fees
        .delete_student_charges(StudentId::from(student_id))
        .await?;
    Ok(Json(DeletedFeesResponse { student_id, deleted }))
}

/// Category summary across all fees
pub async fn fee_summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SummaryResponse>, ApiError> {
    require_permission(&claims, permissions::FEE_READ)?;

    let summary = state.fees.summary_statistics().await?;
    Ok(Json(summary.into()))
}
