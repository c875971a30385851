// shop_api/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::services::catalog_service::ProductPayload;
use crate::state::AppState;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.store.list_products().await?;
  info!("Successfully fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  match app_state.store.get_product(product_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(json!({ "product": product }))),
    None => {
      warn!("Product with ID {} not found.", product_id);
      Err(AppError::NotFound("Product not found".to_string()))
    }
  }
}

#[instrument(name = "handler::create_product", skip(app_state, req_payload))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  let input = req_payload.into_inner().validate()?;
  let product_id = app_state.store.create_product(&input).await?;
  info!("Product {} created ({}).", product_id, input.name);
  Ok(HttpResponse::Created().json(json!({
      "message": "Product created successfully",
      "product_id": product_id,
  })))
}

#[instrument(name = "handler::update_product", skip(app_state, path, req_payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  req_payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let input = req_payload.into_inner().validate()?;
  if !app_state.store.update_product(product_id, &input).await? {
    warn!("Update skipped: product {} not found.", product_id);
    return Err(AppError::NotFound("Product not found".to_string()));
  }
  info!("Product {} updated.", product_id);
  Ok(HttpResponse::Ok().json(json!({ "message": "Product updated successfully" })))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  if !app_state.store.delete_product(product_id).await? {
    warn!("Delete skipped: product {} not found.", product_id);
    return Err(AppError::NotFound("Product not found".to_string()));
  }
  info!("Product {} deleted.", product_id);
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}
