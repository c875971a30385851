// shop_api/src/models/order_item.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Line item snapshot. `product_id` goes null once the product is deleted;
/// name and price stay as they were at purchase time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: i64,
  pub order_id: i64,
  pub product_id: Option<i64>,
  pub product_name: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub product_price: Decimal,
  pub quantity: i32,
  #[serde(with = "rust_decimal::serde::float")]
  pub subtotal: Decimal,
  pub image_url: Option<String>, // current product image, via LEFT JOIN
}
