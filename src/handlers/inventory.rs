// src/handlers/inventory.rs
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::collections::HashMap;
use uuid::Uuid;
use crate::dtos::inventory::{
    AdjustInventoryRequest, InventoryItemResponse, InventoryPreviewRequest,
    InventoryPreviewResponse,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::order::OrderLineItem;
use crate::services::inventory::{low_stock, process_order_inventory};
use crate::services::pricing::snapshot_line;
use crate::state::AppState;
use tracing::{info, instrument};

// GET /admin/inventory - Stock of the merchant's stall
#[instrument(skip(state, auth), fields(stall_id = %auth.stall_id))]
pub async fn get_inventory(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<InventoryItemResponse>>, AppError> {
    let items = state.store.inventory(auth.stall_id).await?;
    Ok(Json(items.into_iter().map(InventoryItemResponse::from).collect()))
}

// GET /admin/inventory/low-stock - Items at or below their threshold
#[instrument(skip(state, auth), fields(stall_id = %auth.stall_id))]
pub async fn get_low_stock(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<InventoryItemResponse>>, AppError> {
    let items = state.store.inventory(auth.stall_id).await?;
    Ok(Json(low_stock(&items).into_iter().map(InventoryItemResponse::from).collect()))
}

// PATCH /admin/inventory/{item_id} - Restock or correct a quantity
#[instrument(skip(state, auth, payload), fields(stall_id = %auth.stall_id))]
pub async fn adjust_inventory(
    Path(item_id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<AdjustInventoryRequest>,
) -> Result<Json<InventoryItemResponse>, AppError> {
    if !payload.quantity.is_finite() || payload.quantity < 0.0 {
        return Err(AppError::validation("Quantity must be a non-negative number"));
    }

    let item = state
        .store
        .set_inventory_quantity(auth.stall_id, item_id, payload.quantity)
        .await?
        .ok_or_else(|| AppError::not_found("Inventory item not found"))?;

    info!(item = %item.name, quantity = item.quantity, "Inventory adjusted");
    Ok(Json(InventoryItemResponse::from(item)))
}

// POST /admin/inventory/preview - Stock after a cart, without touching it
#[instrument(skip(state, auth, payload), fields(stall_id = %auth.stall_id))]
pub async fn preview_inventory(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<InventoryPreviewRequest>,
) -> Result<Json<InventoryPreviewResponse>, AppError> {
    if payload.items.iter().any(|l| l.quantity < 1) {
        return Err(AppError::validation("Quantities must be at least 1"));
    }

    let ids: Vec<Uuid> = payload.items.iter().map(|l| l.menu_item_id).collect();
    let recipes = state.store.menu_items(auth.stall_id, &ids).await?;
    let by_id: HashMap<Uuid, _> = recipes.iter().map(|r| (r.id, r)).collect();

    let lines = payload
        .items
        .iter()
        .map(|l| {
            by_id
                .get(&l.menu_item_id)
                .map(|item| snapshot_line(item, l.quantity, Default::default()))
                .ok_or_else(|| AppError::not_found(format!("Menu item {} not found", l.menu_item_id)))
        })
        .collect::<Result<Vec<OrderLineItem>, AppError>>()?;

    let inventory = state.store.inventory(auth.stall_id).await?;
    let outcome = process_order_inventory(&lines, &recipes, &inventory)?;

    Ok(Json(InventoryPreviewResponse {
        updated: outcome.updated.into_iter().map(InventoryItemResponse::from).collect(),
        low_stock_warnings: outcome
            .low_stock_warnings
            .into_iter()
            .map(InventoryItemResponse::from)
            .collect(),
    }))
}
