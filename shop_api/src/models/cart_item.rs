// shop_api/src/models/cart_item.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// One cart row joined with the product it points at.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
  pub id: i64, // cart_items.id
  pub quantity: i32,
  pub product_id: i64,
  pub name: String,
  pub description: Option<String>,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  pub image_url: Option<String>,
  pub stock: i32,
  #[serde(with = "rust_decimal::serde::float")]
  pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
  pub cart_items: Vec<CartLine>,
  #[serde(with = "rust_decimal::serde::float")]
  pub total: Decimal,
  pub item_count: usize,
}

impl CartSummary {
  pub fn from_lines(cart_items: Vec<CartLine>) -> Self {
    let total = cart_items.iter().map(|line| line.subtotal).sum::<Decimal>().round_dp(2);
    let item_count = cart_items.len();
    Self {
      cart_items,
      total,
      item_count,
    }
  }
}
