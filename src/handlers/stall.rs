// src/handlers/stall.rs
use axum::{
    extract::{Query, State},
    Json,
};
use crate::dtos::menu::StallQuery;
use crate::dtos::stall::StallSettingsResponse;
use crate::error::AppError;
use crate::models::stall::StallFlags;
use crate::state::AppState;
use tracing::instrument;

// GET /stall-settings?stallId= - Checkout options of a stall
#[instrument(skip(state))]
pub async fn get_stall_settings(
    State(state): State<AppState>,
    Query(query): Query<StallQuery>,
) -> Result<Json<StallSettingsResponse>, AppError> {
    let stall_id = query
        .stall_id
        .ok_or_else(|| AppError::validation("Stall ID is required"))?;

    // Unknown stalls get the defaults, like a stall that never set anything.
    let flags = state
        .store
        .stall(stall_id)
        .await?
        .map(|s| s.flags)
        .unwrap_or_else(StallFlags::default);

    Ok(Json(StallSettingsResponse::from(&flags)))
}
