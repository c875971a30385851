// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use serde_json::{json, Value};
use shop_api::state::AppState;
use shop_api::store::{MemoryStore, ShopStore};
use shop_api::web::configure_app_routes;
use std::sync::Arc;

// --- Helper for Tracing Setup (once per test binary) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init()
    .ok(); // Another test may have installed a subscriber already
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn memory_state() -> (AppState, Arc<MemoryStore>) {
  let store = Arc::new(MemoryStore::new());
  let shared: Arc<dyn ShopStore> = store.clone();
  (AppState::new(shared), store)
}

pub async fn init_app(
  state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
  setup_tracing();
  test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await
}

/// Sends a request and returns the status plus the parsed JSON body (Null when empty).
pub async fn call<S, B>(app: &S, req: test::TestRequest) -> (u16, Value)
where
  S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let resp = test::call_service(app, req.to_request()).await;
  let status = resp.status().as_u16();
  let bytes = test::read_body(resp).await;
  let body = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
  };
  (status, body)
}

pub async fn register<S, B>(app: &S, email: &str) -> i64
where
  S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let (status, body) = call(
    app,
    test::TestRequest::post().uri("/api/register").set_json(json!({
        "fullName": "Test Shopper",
        "email": email,
        "password": "hunter22",
    })),
  )
  .await;
  assert_eq!(status, 201, "register failed: {}", body);
  body["user_id"].as_i64().expect("user_id")
}

pub async fn create_product<S, B>(app: &S, name: &str, price: f64, stock: i64) -> i64
where
  S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let (status, body) = call(
    app,
    test::TestRequest::post().uri("/api/products").set_json(json!({
        "name": name,
        "price": price,
        "stock": stock,
        "category": "Test",
    })),
  )
  .await;
  assert_eq!(status, 201, "create product failed: {}", body);
  body["product_id"].as_i64().expect("product_id")
}

pub async fn add_to_cart<S, B>(app: &S, user_id: i64, product_id: i64, quantity: i64) -> (u16, Value)
where
  S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  call(
    app,
    test::TestRequest::post().uri("/api/cart").set_json(json!({
        "user_id": user_id,
        "product_id": product_id,
        "quantity": quantity,
    })),
  )
  .await
}

/// Compares JSON money values to two decimals.
pub fn money(v: &Value) -> f64 {
  (v.as_f64().expect("numeric money value") * 100.0).round() / 100.0
}
