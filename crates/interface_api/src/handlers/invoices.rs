//! Invoice and balance handlers

use axum::{extract::{Path, State}, http::StatusCode, Json};

use core_kernel::{FamilyId, SeasonId};
use domain_billing::{FinancialStats, Invoice};

use crate::{AppState, error::ApiError};

/// Gets the issued invoice, or the current draft
pub async fn get_invoice(
    State(state): State<AppState>,
    Path((family_id, season_id)): Path<(FamilyId, SeasonId)>,
) -> Result<Json<Invoice>, ApiError> {
    let invoice = state
        .invoices
        .get_invoice_for_family_and_season(family_id, season_id)
        .await?;
    Ok(Json(invoice))
}

/// Issues the family's invoice for the season
pub async fn issue_invoice(
    State(state): State<AppState>,
    Path((family_id, season_id)): Path<(FamilyId, SeasonId)>,
) -> Result<(StatusCode, Json<Invoice>), ApiError> {
    let invoice = state.invoices.issue_invoice(family_id, season_id).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Gets total due, total paid and balance
pub async fn get_balance(
    State(state): State<AppState>,
    Path((family_id, season_id)): Path<(FamilyId, SeasonId)>,
) -> Result<Json<FinancialStats>, ApiError> {
    let stats = state.payments.family_balance(family_id, season_id).await?;
    Ok(Json(stats))
}
