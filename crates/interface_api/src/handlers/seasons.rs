//! Season handlers

use axum::{extract::{Path, State}, http::StatusCode, Json};
use validator::Validate;

use core_kernel::SeasonId;
use domain_membership::Season;

use crate::{AppState, error::ApiError};
use crate::dto::seasons::*;

/// Creates an inactive season
pub async fn create_season(
    State(state): State<AppState>,
    Json(request): Json<CreateSeasonRequest>,
) -> Result<(StatusCode, Json<Season>), ApiError> {
    request.validate()?;
    let season = state.seasons.create_season(request.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(season)))
}

/// Makes a season the only active one
pub async fn activate_season(
    State(state): State<AppState>,
    Path(id): Path<SeasonId>,
) -> Result<Json<Season>, ApiError> {
    let season = state.seasons.activate_season(id).await?;
    Ok(Json(season))
}
