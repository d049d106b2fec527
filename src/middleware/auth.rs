use axum::{response::{Response, IntoResponse}};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use crate::auth::jwt::verify_token;
use crate::state::AppState;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub stall_id: Uuid,
    pub role: String,
}

#[derive(Serialize)]
struct ErrorBody { error: String, code: &'static str }

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_header = match req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return unauthorized("Missing Authorization header"),
    };

    // Expect "Bearer <token>"
    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t.trim(),
        None => return unauthorized("Invalid Authorization format"),
    };

    if state.config.jwt_secret.is_empty() {
        return unauthorized("Server auth misconfiguration");
    }

    let claims = match verify_token(token, &state.config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return unauthorized("Invalid or expired token"),
    };
    let stall_id = match claims.stall_id() {
        Ok(id) => id,
        Err(_) => return unauthorized("Token is not bound to a stall"),
    };

    req.extensions_mut().insert(AuthContext {
        stall_id,
        role: claims.role,
    });

    next.run(req).await
}

fn unauthorized(msg: &str) -> Response {
    let body = axum::Json(ErrorBody { error: msg.to_string(), code: "unauthorized" });
    (StatusCode::UNAUTHORIZED, body).into_response()
}
