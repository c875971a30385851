// shop_api/src/services/catalog_service.rs

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::errors::{AppError, Result};
use crate::models::ProductInput;
use crate::services::checkout_service::round_money;

/// Largest value a DECIMAL(10,2) price column holds: 99,999,999.99.
const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Body of `POST /api/products` and `PUT /api/products/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPayload {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub stock: Option<i32>,
}

impl ProductPayload {
  pub fn validate(self) -> Result<ProductInput> {
    let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
    let Some(price) = self.price.filter(|_| !name.is_empty()) else {
      warn!("Product rejected: name or price missing.");
      return Err(AppError::Validation("Name and price are required".to_string()));
    };

    let stock = self.stock.unwrap_or(0);
    if price.is_sign_negative() || stock < 0 {
      warn!("Product rejected: negative price ({}) or stock ({}).", price, stock);
      return Err(AppError::Validation("Price and stock must be non-negative".to_string()));
    }
    let price = round_money(price);
    if price > MAX_PRICE {
      return Err(AppError::Validation("Price is too large".to_string()));
    }

    Ok(ProductInput {
      name,
      description: self.description.unwrap_or_default(),
      price,
      category: self.category.unwrap_or_default(),
      image_url: self.image_url.unwrap_or_default(),
      stock,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn payload(json: serde_json::Value) -> ProductPayload {
    serde_json::from_value(json).expect("payload")
  }

  #[test]
  fn fills_defaults_for_optional_fields() {
    let input = payload(serde_json::json!({"name": "Eraser", "price": 0.99}))
      .validate()
      .expect("valid");
    assert_eq!(input.name, "Eraser");
    assert_eq!(input.price, Decimal::from_str("0.99").unwrap());
    assert_eq!(input.stock, 0);
    assert_eq!(input.description, "");
    assert_eq!(input.category, "");
    assert_eq!(input.image_url, "");
  }

  #[test]
  fn accepts_numeric_strings_for_price() {
    let input = payload(serde_json::json!({"name": "Glue", "price": "3.10", "stock": 4}))
      .validate()
      .expect("valid");
    assert_eq!(input.price, Decimal::from_str("3.10").unwrap());
    assert_eq!(input.stock, 4);
  }

  #[test]
  fn requires_name_and_price() {
    for body in [
      serde_json::json!({"price": 1.0}),
      serde_json::json!({"name": "   ", "price": 1.0}),
      serde_json::json!({"name": "Tape"}),
    ] {
      assert!(matches!(payload(body).validate(), Err(AppError::Validation(_))));
    }
  }

  #[test]
  fn rejects_negative_numbers() {
    assert!(payload(serde_json::json!({"name": "Tape", "price": -1})).validate().is_err());
    assert!(payload(serde_json::json!({"name": "Tape", "price": 1, "stock": -3}))
      .validate()
      .is_err());
  }

  #[test]
  fn max_price_is_the_column_limit() {
    assert_eq!(MAX_PRICE, Decimal::from_str("99999999.99").unwrap());
  }

  #[test]
  fn zero_price_is_allowed() {
    assert!(payload(serde_json::json!({"name": "Freebie", "price": 0})).validate().is_ok());
  }

  #[test]
  fn rounds_price_to_cents_and_caps_it() {
    let input = payload(serde_json::json!({"name": "Odd", "price": "1.005"}))
      .validate()
      .expect("valid");
    assert_eq!(input.price, Decimal::from_str("1.01").unwrap());
    assert!(payload(serde_json::json!({"name": "Gold pen", "price": "100000000"}))
      .validate()
      .is_err());
  }
}
