use axum::{Router, routing::{get, patch, post}, middleware};
use crate::handlers::admin_order::{list_orders, update_order_status};
use crate::handlers::inventory::{adjust_inventory, get_inventory, get_low_stock, preview_inventory};
use crate::handlers::settings::{get_settings, update_settings};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/{order_id}/status", patch(update_order_status))
        .route("/admin/inventory", get(get_inventory))
        .route("/admin/inventory/low-stock", get(get_low_stock))
        .route("/admin/inventory/preview", post(preview_inventory))
        .route("/admin/inventory/{item_id}", patch(adjust_inventory))
        .route("/admin/settings", get(get_settings).patch(update_settings))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
