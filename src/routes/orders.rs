use axum::{routing::{get, post}, Router};
use crate::handlers::order::{create_order, get_order_status, stream_order_status};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{order_id}/status", get(get_order_status))
        .route("/orders/{order_id}/stream", get(stream_order_status))
}
