pub mod admin;
pub mod menu;
pub mod orders;

use axum::{routing::get, Router};
use http::{header::{AUTHORIZATION, CONTENT_TYPE}, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use crate::state::AppState;

/// Full application router, served under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(menu::routes())
        .merge(orders::routes())
        .merge(admin::routes(&state))
        .route("/health", get(health_check));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sign_token;
    use crate::config::Config;
    use crate::fixtures;
    use crate::models::order::OrderStatus;
    use crate::store::memory::MemoryStore;
    use crate::store::OrderStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        store: Arc<MemoryStore>,
        router: Router,
    }

    impl TestApp {
        fn new(store: MemoryStore) -> Self {
            let store = Arc::new(store);
            let config = Config {
                jwt_secret: fixtures::JWT_SECRET.into(),
                status_poll_interval: Duration::from_millis(20),
                ..Config::default()
            };
            let router = create_router(AppState::new(store.clone(), config));
            Self { store, router }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            (status, bytes.to_vec())
        }

        async fn json(&self, request: Request<Body>) -> (StatusCode, Value) {
            let (status, bytes) = self.send(request).await;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn with_json(method: Method, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn authed_get(uri: &str, token: &str) -> Request<Body> {
        Request::get(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn order_body(stall_id: Uuid, menu_item_id: Uuid, quantity: i32) -> Value {
        json!({
            "stallId": stall_id,
            "items": [{
                "menuItemId": menu_item_id,
                "quantity": quantity,
                "selectedModifiers": { "spice": "Hot" }
            }],
            "fulfillmentType": "takeaway",
            "paymentMethod": "cash"
        })
    }

    async fn open_stall() -> (TestApp, Uuid, Uuid) {
        let store = MemoryStore::new();
        let stall = fixtures::stall(true);
        let chicken = fixtures::dynamit_chicken(stall.id);
        fixtures::seed(&store, &stall, &[chicken.clone()], &[]).await;
        (TestApp::new(store), stall.id, chicken.id)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = TestApp::new(MemoryStore::new());
        let (status, body) = app.send(get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn order_on_closed_stall_is_forbidden() {
        let store = MemoryStore::new();
        let stall = fixtures::stall(false);
        let chicken = fixtures::dynamit_chicken(stall.id);
        fixtures::seed(&store, &stall, &[chicken.clone()], &[]).await;
        let app = TestApp::new(store);

        let (status, body) = app
            .json(with_json(Method::POST, "/api/orders", order_body(stall.id, chicken.id, 1), None))
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());
        assert!(app.store.tokens_for_day(stall.id, fixtures::day()).await.unwrap().is_empty());
        let listed = app
            .store
            .list_orders(stall.id, &Default::default())
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn placed_order_can_be_read_back() {
        let (app, stall_id, chicken_id) = open_stall().await;

        let (status, created) = app
            .json(with_json(Method::POST, "/api/orders", order_body(stall_id, chicken_id, 3), None))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let token = created["token"].as_i64().unwrap();
        assert!((100..=999).contains(&token));

        let order_id = created["orderId"].as_str().unwrap();
        let (status, order) = app.json(get(&format!("/api/orders/{order_id}/status"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["token"], token);
        assert_eq!(order["status"], "waiting");
        assert_eq!(order["total"], 450.0);
        assert_eq!(order["paymentMethod"], "cash");
        assert_eq!(order["fulfillment"]["type"], "takeaway");
        assert_eq!(order["items"][0]["menuItemId"], chicken_id.to_string());
        assert_eq!(order["items"][0]["image"], "/placeholder-food.jpg");
        assert_eq!(order["items"][0]["selectedModifiers"]["spice"], "Hot");
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let app = TestApp::new(MemoryStore::new());
        let (status, body) = app
            .json(get(&format!("/api/orders/{}/status", Uuid::new_v4())))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Order not found");
    }

    #[tokio::test]
    async fn empty_cart_is_a_bad_request() {
        let (app, stall_id, _) = open_stall().await;
        let body = json!({
            "stallId": stall_id,
            "items": [],
            "fulfillmentType": "dine-in",
            "paymentMethod": "cash"
        });
        let (status, body) = app.json(with_json(Method::POST, "/api/orders", body, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cart is empty");
    }

    #[tokio::test]
    async fn menu_lists_public_items_and_respects_the_switch() {
        let store = MemoryStore::new();
        let mut stall = fixtures::stall(true);
        let mains = fixtures::category(stall.id, "Mains", 0);
        let chicken = fixtures::dynamit_chicken(stall.id);
        let mut secret = fixtures::menu_item(stall.id, "Staff Meal", 50.0);
        secret.is_public = false;
        fixtures::seed(&store, &stall, &[chicken.clone(), secret], &[]).await;
        store.insert_category(mains).await;
        let app = TestApp::new(store);

        let (status, menu) = app.json(get(&format!("/api/menu?stallId={}", stall.id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(menu["categories"][0]["name"], "Mains");
        assert_eq!(menu["items"].as_array().unwrap().len(), 1);
        assert_eq!(menu["items"][0]["name"], "Dynamit Chicken");
        assert_eq!(menu["items"][0]["modifiers"][0]["type"], "radio");

        stall.flags.enable_digital_menu = Some(false);
        app.store.insert_stall(stall.clone()).await;
        let (status, _) = app.json(get(&format!("/api/menu?stallId={}", stall.id))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.json(get("/api/menu")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Stall ID is required");
    }

    #[tokio::test]
    async fn stall_settings_fall_back_to_defaults() {
        let store = MemoryStore::new();
        let mut stall = fixtures::stall(true);
        stall.flags.enable_delivery = Some(false);
        store.insert_stall(stall.clone()).await;
        let app = TestApp::new(store);

        let (status, settings) = app
            .json(get(&format!("/api/stall-settings?stallId={}", stall.id)))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            settings,
            json!({ "enable_delivery": false, "enable_dine_in": true, "enable_digital_payment": false })
        );

        let (status, _) = app.json(get("/api/stall-settings")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_routes_need_a_valid_token() {
        let app = TestApp::new(MemoryStore::new());

        let (status, body) = app.json(get("/api/admin/orders")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");

        let forged = sign_token(Uuid::new_v4(), "not-the-secret");
        let (status, _) = app.json(authed_get("/api/admin/orders", &forged)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn merchant_moves_order_and_terminal_state_sticks() {
        let (app, stall_id, chicken_id) = open_stall().await;
        let token = sign_token(stall_id, fixtures::JWT_SECRET);

        let (_, created) = app
            .json(with_json(Method::POST, "/api/orders", order_body(stall_id, chicken_id, 1), None))
            .await;
        let order_id = created["orderId"].as_str().unwrap().to_string();
        let uri = format!("/api/admin/orders/{order_id}/status");

        let (status, order) = app
            .json(with_json(Method::PATCH, &uri, json!({ "status": "cooking" }), Some(&token)))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], "cooking");

        let (status, _) = app
            .json(with_json(Method::PATCH, &uri, json!({ "status": "waiting" }), Some(&token)))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app
            .json(with_json(Method::PATCH, &uri, json!({ "status": "completed" }), Some(&token)))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .json(with_json(Method::PATCH, &uri, json!({ "status": "cancelled" }), Some(&token)))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Order is already completed");

        // Another merchant cannot see the order at all.
        let stranger = sign_token(Uuid::new_v4(), fixtures::JWT_SECRET);
        let (status, _) = app
            .json(with_json(Method::PATCH, &uri, json!({ "status": "ready" }), Some(&stranger)))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, listed) = app
            .json(authed_get("/api/admin/orders?status=completed", &token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(app.store.order_status(order_id.parse().unwrap()).await.unwrap(), Some(OrderStatus::Completed));
    }

    #[tokio::test]
    async fn inventory_can_be_read_adjusted_and_previewed() {
        let store = MemoryStore::new();
        let stall = fixtures::stall(true);
        let rice = fixtures::inventory_item(stall.id, "Rice", 0.5, 1.0);
        let chicken = fixtures::dynamit_chicken(stall.id).with_ingredient(rice.id, 0.2);
        fixtures::seed(&store, &stall, &[chicken.clone()], &[rice.clone()]).await;
        let app = TestApp::new(store);
        let token = sign_token(stall.id, fixtures::JWT_SECRET);

        let (status, low) = app.json(authed_get("/api/admin/inventory/low-stock", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(low[0]["name"], "Rice");
        assert_eq!(low[0]["isLowStock"], true);

        let preview = json!({ "items": [{ "menuItemId": chicken.id, "quantity": 3 }] });
        let (status, body) = app
            .json(with_json(Method::POST, "/api/admin/inventory/preview", preview.clone(), Some(&token)))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Insufficient stock for: Rice");

        let uri = format!("/api/admin/inventory/{}", rice.id);
        let (status, _) = app
            .json(with_json(Method::PATCH, &uri, json!({ "quantity": -1.0 }), Some(&token)))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, item) = app
            .json(with_json(Method::PATCH, &uri, json!({ "quantity": 10.0 }), Some(&token)))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(item["quantity"], 10.0);
        assert_eq!(item["isLowStock"], false);

        let (status, body) = app
            .json(with_json(Method::POST, "/api/admin/inventory/preview", preview, Some(&token)))
            .await;
        assert_eq!(status, StatusCode::OK);
        let left = body["updated"][0]["quantity"].as_f64().unwrap();
        assert!((left - 9.4).abs() < 1e-9);

        // Previewing leaves stock untouched.
        let (_, all) = app.json(authed_get("/api/admin/inventory", &token)).await;
        assert_eq!(all[0]["quantity"], 10.0);
    }

    #[tokio::test]
    async fn settings_patch_opens_the_stall() {
        let store = MemoryStore::new();
        let stall = fixtures::stall(false);
        let chicken = fixtures::dynamit_chicken(stall.id);
        fixtures::seed(&store, &stall, &[chicken.clone()], &[]).await;
        let app = TestApp::new(store);
        let token = sign_token(stall.id, fixtures::JWT_SECRET);

        let (status, _) = app
            .json(with_json(Method::PATCH, "/api/admin/settings", json!({}), Some(&token)))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, settings) = app
            .json(with_json(
                Method::PATCH,
                "/api/admin/settings",
                json!({ "accept_new_orders": true }),
                Some(&token),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["accept_new_orders"], true);
        assert_eq!(settings["enable_digital_payment"], false);

        let (status, _) = app
            .json(with_json(Method::POST, "/api/orders", order_body(stall.id, chicken.id, 1), None))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn stream_sends_status_changes_as_events() {
        let (app, stall_id, chicken_id) = open_stall().await;
        let (_, created) = app
            .json(with_json(Method::POST, "/api/orders", order_body(stall_id, chicken_id, 1), None))
            .await;
        let order_id: Uuid = created["orderId"].as_str().unwrap().parse().unwrap();

        let response = app
            .router
            .clone()
            .oneshot(get(&format!("/api/orders/{order_id}/stream")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE].to_str().unwrap(),
            "text/event-stream"
        );

        // Moved behind the service's back, only polling can pick it up.
        app.store
            .update_order_status(order_id, OrderStatus::Ready)
            .await
            .unwrap();

        let bytes = tokio::time::timeout(Duration::from_secs(5), response.into_body().collect())
            .await
            .expect("stream should end after ready")
            .unwrap()
            .to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let data: Vec<Value> = text
            .lines()
            .filter_map(|l| l.strip_prefix("data: "))
            .map(|d| serde_json::from_str(d).unwrap())
            .collect();

        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["orderId"], order_id.to_string());
        assert_eq!(data[0]["status"], "ready");
        assert!(data[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn stream_of_unknown_order_ends_immediately() {
        let app = TestApp::new(MemoryStore::new());
        let (status, body) = app
            .send(get(&format!("/api/orders/{}/stream", Uuid::new_v4())))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }
}
