// shop_api/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{instrument, warn};

use crate::errors::AppError;
use crate::services::checkout_service::{self, PlacedOrder};
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct CheckoutRequestPayload {
  pub user_id: Option<i64>,
}

#[derive(Serialize, Debug)]
struct CheckoutResponse {
  message: &'static str,
  #[serde(flatten)]
  placed: PlacedOrder,
}

#[instrument(name = "handler::checkout", skip(app_state, req_payload), fields(user_id = ?req_payload.user_id))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let user_id = req_payload.user_id.filter(|id| *id > 0).ok_or_else(|| {
    warn!("Checkout request without user_id.");
    AppError::Validation("user_id is required".to_string())
  })?;

  let placed = checkout_service::checkout(app_state.store.as_ref(), user_id).await?;
  Ok(HttpResponse::Created().json(CheckoutResponse {
    message: "Order placed successfully!",
    placed,
  }))
}

#[instrument(name = "handler::list_orders", skip(app_state, path), fields(user_id = %path.as_ref()))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.store.orders_for_user(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  match app_state.store.order_detail(order_id).await? {
    Some(order) => Ok(HttpResponse::Ok().json(json!({ "order": order }))),
    None => {
      warn!("Order {} not found.", order_id);
      Err(AppError::NotFound("Order not found".to_string()))
    }
  }
}
