// src/handlers/order.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;
use crate::dtos::order::{CreateOrderRequest, CreateOrderResponse, OrderResponse};
use crate::error::AppError;
use crate::services::{demo, pipeline, stream};
use crate::state::AppState;
use tracing::{error, info, instrument};

// POST /orders - Place an order
#[instrument(skip(state, payload), fields(stall_id = %payload.stall_id))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let submission = payload
        .into_submission()
        .ok_or_else(|| AppError::validation("Fulfillment type is required"))?;

    let placed = pipeline::submit(state.store.as_ref(), state.config.local_today(), submission)
        .await
        .map_err(|e| {
            error!(error = %e, "Order submission failed");
            AppError::from(e)
        })?;

    if state.config.demo_auto_advance {
        info!(order_id = %placed.order_id, "Scheduling demo progression");
        demo::schedule(state.store.clone(), state.bus.clone(), placed.order_id);
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: placed.order_id,
            token: placed.token,
        }),
    ))
}

// GET /orders/{order_id}/status - Order snapshot
#[instrument(skip(state))]
pub async fn get_order_status(
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .store
        .order(order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    Ok(Json(OrderResponse::from(order)))
}

// GET /orders/{order_id}/stream - Live status over server-sent events
#[instrument(skip(state))]
pub async fn stream_order_status(
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let watch = stream::watch(
        state.store.clone(),
        &state.bus,
        order_id,
        state.config.status_poll_interval,
    )
    .await?;

    let events = ReceiverStream::new(watch.events).map(|event| Event::default().json_data(event));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
