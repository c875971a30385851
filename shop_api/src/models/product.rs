// shop_api/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub stock: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Validated field set for creating or replacing a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub category: String,
  pub image_url: String,
  pub stock: i32,
}
