// shop_api/src/services/cart_service.rs

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result};
use crate::models::CartSummary;
use crate::store::ShopStore;

/// Body of `POST /api/cart`. `quantity` may also arrive as a numeric string.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddToCartRequest {
  pub user_id: Option<i64>,
  pub product_id: Option<i64>,
  #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
  pub quantity: Option<i32>,
}

/// What a quantity update did to the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdate {
  Updated,
  Removed,
}

/// Checks the product and its current stock, then upserts the cart line.
/// Stock is only checked here, not reserved.
#[instrument(name = "cart_service::add_item", skip(store))]
pub async fn add_item(store: &dyn ShopStore, request: AddToCartRequest) -> Result<()> {
  let (Some(user_id), Some(product_id)) = (
    request.user_id.filter(|id| *id > 0),
    request.product_id.filter(|id| *id > 0),
  ) else {
    return Err(AppError::Validation("user_id and product_id are required".to_string()));
  };

  let quantity = request.quantity.unwrap_or(1);
  if quantity <= 0 {
    return Err(AppError::Validation("Quantity must be positive".to_string()));
  }

  let product = store
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

  if product.stock < quantity {
    warn!(
      "Insufficient stock for product {}. Available: {}, Requested: {}.",
      product_id, product.stock, quantity
    );
    return Err(AppError::Validation("Insufficient stock".to_string()));
  }

  store.add_to_cart(user_id, product_id, quantity).await?;
  info!("Added {} x product {} to cart of user {}.", quantity, product_id, user_id);
  Ok(())
}

pub async fn summary(store: &dyn ShopStore, user_id: i64) -> Result<CartSummary> {
  let lines = store.cart_lines(user_id).await?;
  Ok(CartSummary::from_lines(lines))
}

/// Overwrites a line's quantity; zero or less removes the line.
#[instrument(name = "cart_service::update_quantity", skip(store))]
pub async fn update_quantity(store: &dyn ShopStore, cart_item_id: i64, quantity: Option<i32>) -> Result<CartUpdate> {
  let quantity = quantity.ok_or_else(|| AppError::Validation("Quantity is required".to_string()))?;

  if !store.set_cart_quantity(cart_item_id, quantity).await? {
    return Err(AppError::NotFound("Cart item not found".to_string()));
  }
  Ok(if quantity <= 0 {
    CartUpdate::Removed
  } else {
    CartUpdate::Updated
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{NewUser, ProductInput};
  use crate::store::MemoryStore;
  use rust_decimal::Decimal;

  async fn seeded() -> (MemoryStore, i64, i64) {
    let store = MemoryStore::new();
    let user_id = store
      .create_user(&NewUser {
        username: "Cart Tester".to_string(),
        email: "cart@example.com".to_string(),
        password_hash: "hash".to_string(),
        phone: None,
      })
      .await
      .expect("user");
    let product_id = store
      .create_product(&ProductInput {
        name: "Notebook".to_string(),
        description: String::new(),
        price: Decimal::new(499, 2),
        category: "Notebooks".to_string(),
        image_url: String::new(),
        stock: 5,
      })
      .await
      .expect("product");
    (store, user_id, product_id)
  }

  fn request(user_id: i64, product_id: i64, quantity: Option<i32>) -> AddToCartRequest {
    AddToCartRequest {
      user_id: Some(user_id),
      product_id: Some(product_id),
      quantity,
    }
  }

  #[test]
  fn quantity_accepts_numbers_and_numeric_strings() {
    let parse = |body: serde_json::Value| serde_json::from_value::<AddToCartRequest>(body);
    assert_eq!(parse(serde_json::json!({"quantity": 2})).expect("number").quantity, Some(2));
    assert_eq!(parse(serde_json::json!({"quantity": "2"})).expect("string").quantity, Some(2));
    assert_eq!(parse(serde_json::json!({"user_id": 1})).expect("absent").quantity, None);
    assert!(parse(serde_json::json!({"quantity": "two"})).is_err());
  }

  #[tokio::test]
  async fn quantity_defaults_to_one() {
    let (store, uid, pid) = seeded().await;
    add_item(&store, request(uid, pid, None)).await.expect("add");
    let cart = summary(&store, uid).await.expect("summary");
    assert_eq!(cart.item_count, 1);
    assert_eq!(cart.cart_items[0].quantity, 1);
    assert_eq!(cart.total, Decimal::new(499, 2));
  }

  #[tokio::test]
  async fn validates_input_before_touching_the_store() {
    let (store, uid, pid) = seeded().await;
    let missing = AddToCartRequest {
      user_id: Some(uid),
      ..Default::default()
    };
    assert!(matches!(add_item(&store, missing).await, Err(AppError::Validation(_))));
    assert!(matches!(add_item(&store, request(0, pid, Some(1))).await, Err(AppError::Validation(_))));
    assert!(matches!(add_item(&store, request(uid, pid, Some(0))).await, Err(AppError::Validation(_))));
    assert!(matches!(add_item(&store, request(uid, pid + 1, Some(1))).await, Err(AppError::NotFound(_))));
    assert!(matches!(add_item(&store, request(uid, pid, Some(6))).await, Err(AppError::Validation(_))));
    assert_eq!(summary(&store, uid).await.expect("summary").item_count, 0);
  }

  #[tokio::test]
  async fn update_reports_removal_and_missing_items() {
    let (store, uid, pid) = seeded().await;
    add_item(&store, request(uid, pid, Some(2))).await.expect("add");
    let line_id = summary(&store, uid).await.expect("summary").cart_items[0].id;

    assert!(matches!(update_quantity(&store, line_id, None).await, Err(AppError::Validation(_))));
    // No upper bound against stock on update.
    assert_eq!(update_quantity(&store, line_id, Some(50)).await.expect("update"), CartUpdate::Updated);
    assert_eq!(update_quantity(&store, line_id, Some(-1)).await.expect("remove"), CartUpdate::Removed);
    assert!(matches!(update_quantity(&store, line_id, Some(1)).await, Err(AppError::NotFound(_))));
  }
}
