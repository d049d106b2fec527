// src/handlers/menu.rs
use axum::{
    extract::{Query, State},
    Json,
};
use crate::dtos::menu::{CategoryResponse, MenuItemResponse, MenuResponse, StallQuery};
use crate::error::AppError;
use crate::state::AppState;
use tracing::{error, instrument};

// GET /menu?stallId= - Public menu of a stall
#[instrument(skip(state))]
pub async fn get_menu(
    State(state): State<AppState>,
    Query(query): Query<StallQuery>,
) -> Result<Json<MenuResponse>, AppError> {
    let stall_id = query
        .stall_id
        .ok_or_else(|| AppError::validation("Stall ID is required"))?;

    let stall = state
        .store
        .stall(stall_id)
        .await?
        .ok_or_else(|| AppError::not_found("Stall not found"))?;
    if !stall.flags.digital_menu_enabled() {
        return Err(AppError::forbidden("Digital menu is disabled for this stall"));
    }

    match state.store.menu(stall_id).await {
        Ok((categories, items)) => Ok(Json(MenuResponse {
            categories: categories.into_iter().map(CategoryResponse::from).collect(),
            items: items.into_iter().map(MenuItemResponse::from).collect(),
        })),
        Err(e) => {
            error!(?e, "Failed to fetch menu");
            Err(e.into())
        }
    }
}
