// shop_api/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::cart_service::{self, AddToCartRequest, CartUpdate};
use crate::state::AppState;

// --- Request DTO ---
#[serde_as]
#[derive(Deserialize, Debug)]
pub struct UpdateCartRequestPayload {
  #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
  pub quantity: Option<i32>,
}

#[instrument(name = "handler::add_to_cart", skip(app_state, req_payload))]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
  cart_service::add_item(app_state.store.as_ref(), req_payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({ "message": "Item added to cart successfully" })))
}

#[instrument(name = "handler::get_cart", skip(app_state, path), fields(user_id = %path.as_ref()))]
pub async fn get_cart_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let cart = cart_service::summary(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "handler::update_cart_item", skip(app_state, path, req_payload), fields(cart_item_id = %path.as_ref()))]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  req_payload: web::Json<UpdateCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let cart_item_id = path.into_inner();
  let outcome = cart_service::update_quantity(app_state.store.as_ref(), cart_item_id, req_payload.quantity).await?;
  let message = match outcome {
    CartUpdate::Updated => "Cart item updated successfully",
    CartUpdate::Removed => "Cart item removed",
  };
  info!("Cart item {}: {}", cart_item_id, message);
  Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, path), fields(cart_item_id = %path.as_ref()))]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  if !app_state.store.remove_cart_item(path.into_inner()).await? {
    return Err(AppError::NotFound("Cart item not found".to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({ "message": "Item removed from cart" })))
}

#[instrument(name = "handler::clear_cart", skip(app_state, path), fields(user_id = %path.as_ref()))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  let removed = app_state.store.clear_cart(user_id).await?;
  info!("Cleared {} cart line(s) for user {}.", removed, user_id);
  Ok(HttpResponse::Ok().json(json!({ "message": "Cart cleared successfully" })))
}
