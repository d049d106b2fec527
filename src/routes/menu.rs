use axum::{routing::get, Router};
use crate::handlers::menu::get_menu;
use crate::handlers::stall::get_stall_settings;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(get_menu))
        .route("/stall-settings", get(get_stall_settings))
}
