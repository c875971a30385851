// shop_api/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Cart is empty")]
  EmptyCart,

  // Raised when the stock guard matches no row during checkout.
  #[error("Insufficient stock for product {product_id}")]
  InsufficientStock { product_id: i64 },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Database Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::EmptyCart => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) | AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migrate(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    let status = self.status_code();
    match self {
      AppError::Validation(m) | AppError::NotFound(m) | AppError::Conflict(m) => {
        HttpResponse::build(status).json(json!({"error": m}))
      }
      AppError::EmptyCart => HttpResponse::build(status).json(json!({"error": "Cart is empty"})),
      AppError::InsufficientStock { product_id } => HttpResponse::build(status).json(json!({
          "error": "Insufficient stock",
          "product_id": product_id,
      })),
      AppError::Config(m) => {
        HttpResponse::build(status).json(json!({"error": "Configuration issue", "detail": m}))
      }
      // The raw driver message is surfaced to the client on purpose.
      AppError::Sqlx(e) => {
        HttpResponse::build(status).json(json!({"error": "Database operation failed", "detail": e.to_string()}))
      }
      AppError::Migrate(e) => {
        HttpResponse::build(status).json(json!({"error": "Database migration failed", "detail": e.to_string()}))
      }
      AppError::Internal(m) => {
        HttpResponse::build(status).json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;

  async fn body_json(err: AppError) -> serde_json::Value {
    let resp = err.error_response();
    let bytes = to_bytes(resp.into_body()).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
  }

  #[test]
  fn maps_variants_to_status_codes() {
    assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::EmptyCart.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    assert_eq!(
      AppError::InsufficientStock { product_id: 3 }.status_code(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      AppError::Sqlx(sqlx::Error::RowNotFound).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
      AppError::Internal("boom".into()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[actix_web::test]
  async fn database_errors_surface_raw_message() {
    let body = body_json(AppError::Sqlx(sqlx::Error::RowNotFound)).await;
    assert_eq!(body["error"], "Database operation failed");
    assert!(body["detail"].as_str().unwrap_or_default().contains("no rows"));
  }

  #[actix_web::test]
  async fn insufficient_stock_names_the_product() {
    let body = body_json(AppError::InsufficientStock { product_id: 42 }).await;
    assert_eq!(body["error"], "Insufficient stock");
    assert_eq!(body["product_id"], 42);
  }
}
