// src/handlers/settings.rs
use axum::{extract::State, Extension, Json};
use crate::dtos::stall::{AdminSettingsResponse, UpdateStallSettingsRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::stall::StallFlags;
use crate::state::AppState;
use tracing::{info, instrument};

// GET /admin/settings - All switches of the merchant's stall
#[instrument(skip(state, auth), fields(stall_id = %auth.stall_id))]
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AdminSettingsResponse>, AppError> {
    let stall = state
        .store
        .stall(auth.stall_id)
        .await?
        .ok_or_else(|| AppError::not_found("Stall not found"))?;
    Ok(Json(AdminSettingsResponse::from(stall)))
}

// PATCH /admin/settings - Partial update of stall switches
#[instrument(skip(state, auth, payload), fields(stall_id = %auth.stall_id))]
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateStallSettingsRequest>,
) -> Result<Json<AdminSettingsResponse>, AppError> {
    if payload.is_empty() {
        return Err(AppError::validation("No settings to update"));
    }

    let patch = StallFlags::from(payload);
    let stall = state
        .store
        .update_stall_flags(auth.stall_id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Stall not found"))?;

    info!(role = %auth.role, accepting = stall.flags.accepts_orders(), "Stall settings updated");
    Ok(Json(AdminSettingsResponse::from(stall)))
}
