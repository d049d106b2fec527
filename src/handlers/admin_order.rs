// src/handlers/admin_order.rs
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use crate::dtos::order::{ListOrdersQuery, OrderResponse, UpdateOrderStatusRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::order::OrderFilter;
use crate::services::status::change_status;
use crate::state::AppState;
use tracing::{error, instrument};

// GET /admin/orders?status=&date= - Orders of the merchant's stall, newest first
#[instrument(skip(state, auth), fields(stall_id = %auth.stall_id))]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let filter = OrderFilter {
        status: query.status,
        day: query.date,
    };

    match state.store.list_orders(auth.stall_id, &filter).await {
        Ok(orders) => Ok(Json(orders.into_iter().map(OrderResponse::from).collect())),
        Err(e) => {
            error!(?e, "Failed to fetch orders");
            Err(e.into())
        }
    }
}

// PATCH /admin/orders/{order_id}/status - Move an order along
#[instrument(skip(state, auth, payload), fields(stall_id = %auth.stall_id))]
pub async fn update_order_status(
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = change_status(
        state.store.as_ref(),
        &state.bus,
        Some(auth.stall_id),
        order_id,
        payload.status,
    )
    .await?;

    Ok(Json(OrderResponse::from(order)))
}
