// shop_api/src/web/handlers/health_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

pub async fn api_root_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({
      "status": "ok",
      "message": "Stationery shop API is running",
      "version": env!("CARGO_PKG_VERSION"),
  }))
}

/// Also round-trips to the store, so a dead database shows up as a 500.
#[instrument(name = "handler::health_check", skip(app_state))]
pub async fn health_check_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  app_state.store.ping().await?;
  Ok(HttpResponse::Ok().json(json!({ "status": "ok", "message": "API is healthy" })))
}
