// shop_api/src/services/checkout_service.rs

//! Turns a user's cart into an order.
//!
//! Totals are derived here from the cart lines; stores call
//! [`OrderDraft::from_cart`] inside their own transaction so the lines they
//! price are the lines they lock and delete.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result};
use crate::models::CartLine;
use crate::store::ShopStore;

/// Flat sales tax applied to every order (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Rounds to cents, half away from zero, the same way a DECIMAL(10,2) column does.
pub fn round_money(amount: Decimal) -> Decimal {
  amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
  pub cart_item_id: i64,
  pub product_id: i64,
  pub product_name: String,
  pub product_price: Decimal,
  pub quantity: i32,
  pub subtotal: Decimal,
}

/// A priced, not yet persisted order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
  pub user_id: i64,
  pub lines: Vec<DraftLine>,
  pub total_amount: Decimal,
  pub tax_amount: Decimal,
  pub grand_total: Decimal,
}

impl OrderDraft {
  pub fn from_cart(user_id: i64, cart: &[CartLine]) -> Result<Self> {
    if cart.is_empty() {
      return Err(AppError::EmptyCart);
    }

    let lines: Vec<DraftLine> = cart
      .iter()
      .map(|line| DraftLine {
        cart_item_id: line.id,
        product_id: line.product_id,
        product_name: line.name.clone(),
        product_price: line.price,
        quantity: line.quantity,
        subtotal: round_money(line.price * Decimal::from(line.quantity)),
      })
      .collect();

    let total_amount = lines.iter().map(|l| l.subtotal).sum::<Decimal>();
    let tax_amount = round_money(total_amount * TAX_RATE);
    let grand_total = total_amount + tax_amount;

    Ok(Self {
      user_id,
      lines,
      total_amount,
      tax_amount,
      grand_total,
    })
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
  pub order_id: i64,
  #[serde(with = "rust_decimal::serde::float")]
  pub grand_total: Decimal,
}

#[instrument(name = "checkout_service::checkout", skip(store))]
pub async fn checkout(store: &dyn ShopStore, user_id: i64) -> Result<PlacedOrder> {
  if user_id <= 0 {
    return Err(AppError::Validation("user_id is required".to_string()));
  }

  match store.checkout(user_id).await {
    Ok(placed) => {
      info!(
        "Order {} placed for user {}. Grand total: {}",
        placed.order_id, user_id, placed.grand_total
      );
      Ok(placed)
    }
    Err(AppError::EmptyCart) => {
      warn!("Checkout refused for user {}: cart is empty.", user_id);
      Err(AppError::EmptyCart)
    }
    Err(e) => {
      warn!("Checkout failed for user {}: {}", user_id, e);
      Err(e)
    }
  }
}
