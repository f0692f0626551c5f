//! Payment handlers

use axum::{extract::{Path, State}, http::StatusCode, Json};
use validator::Validate;

use core_kernel::PaymentId;
use domain_billing::ReconciliationOutcome;

use crate::{AppState, error::ApiError};
use crate::dto::payments::*;

/// Records a family payment
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    request.validate()?;
    let recorded = state.payments.add_family_payment(request.into()).await?;
    Ok((StatusCode::CREATED, Json(recorded.into())))
}

/// Updates a payment
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let recorded = state.payments.update_family_payment(id, request.into()).await?;
    Ok(Json(recorded.into()))
}

/// Deletes a payment
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
) -> Result<Json<ReconciliationOutcome>, ApiError> {
    let outcome = state.payments.delete_family_payment(id).await?;
    Ok(Json(outcome))
}
