//! Membership and registration handlers

use axum::{extract::{Path, State}, http::StatusCode, Json};
use validator::Validate;

use core_kernel::RegistrationId;
use domain_membership::Membership;

use crate::{AppState, error::ApiError};
use crate::dto::enrollment::*;

/// Enrolls a member in a season
pub async fn create_membership(
    State(state): State<AppState>,
    Json(request): Json<CreateMembershipRequest>,
) -> Result<(StatusCode, Json<Membership>), ApiError> {
    request.validate()?;
    let membership = state.enrollment.enroll_member(request.into()).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// Registers a member to a workshop
pub async fn create_registration(
    State(state): State<AppState>,
    Json(request): Json<CreateRegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    let change = state.enrollment.create_registration(request.into()).await?;
    Ok((StatusCode::CREATED, Json(change.into())))
}

/// Changes the quantity of a registration
pub async fn update_registration(
    State(state): State<AppState>,
    Path(id): Path<RegistrationId>,
    Json(request): Json<UpdateRegistrationRequest>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let change = state
        .enrollment
        .update_registration_quantity(id, request.quantity)
        .await?;
    Ok(Json(change.into()))
}

/// Deletes a registration
pub async fn delete_registration(
    State(state): State<AppState>,
    Path(id): Path<RegistrationId>,
) -> Result<Json<RegistrationDeletedResponse>, ApiError> {
    let reconciliation = state.enrollment.delete_registration(id).await?;
    Ok(Json(RegistrationDeletedResponse { reconciliation }))
}
