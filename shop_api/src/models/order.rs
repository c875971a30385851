// shop_api/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::order_item::OrderItem;

/// Orders are written once at checkout and never change status afterwards.
pub const ORDER_STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: i64,
  pub user_id: i64,
  #[serde(with = "rust_decimal::serde::float")]
  pub total_amount: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub tax_amount: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub grand_total: Decimal,
  pub status: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
}
