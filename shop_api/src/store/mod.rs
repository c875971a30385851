// shop_api/src/store/mod.rs

//! Persistence seam. Handlers and services only talk to [`ShopStore`];
//! `MySqlStore` backs the server, `MemoryStore` backs the test suite.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{CartLine, NewUser, Order, OrderDetail, Product, ProductInput, User};
use crate::services::checkout_service::PlacedOrder;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[async_trait]
pub trait ShopStore: Send + Sync {
  /// Cheap round trip used by the health endpoint.
  async fn ping(&self) -> Result<()>;

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
  /// Fails with `AppError::Conflict` when the email is already taken.
  async fn create_user(&self, user: &NewUser) -> Result<i64>;

  async fn list_products(&self) -> Result<Vec<Product>>;
  async fn get_product(&self, product_id: i64) -> Result<Option<Product>>;
  async fn count_products(&self) -> Result<i64>;
  async fn create_product(&self, input: &ProductInput) -> Result<i64>;
  /// `false` when no product has this id.
  async fn update_product(&self, product_id: i64, input: &ProductInput) -> Result<bool>;
  /// `false` when no product has this id.
  async fn delete_product(&self, product_id: i64) -> Result<bool>;

  /// Inserts the line or adds `quantity` to the existing (user, product) line.
  async fn add_to_cart(&self, user_id: i64, product_id: i64, quantity: i32) -> Result<()>;
  async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>>;
  /// Overwrites the quantity, or deletes the line when `quantity <= 0`.
  /// `false` when the cart item does not exist.
  async fn set_cart_quantity(&self, cart_item_id: i64, quantity: i32) -> Result<bool>;
  async fn remove_cart_item(&self, cart_item_id: i64) -> Result<bool>;
  /// Returns the number of lines removed.
  async fn clear_cart(&self, user_id: i64) -> Result<u64>;

  /// Prices the cart, writes the order with its item snapshots, decrements
  /// stock and removes the ordered lines, all or nothing.
  async fn checkout(&self, user_id: i64) -> Result<PlacedOrder>;
  async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>>;
  async fn order_detail(&self, order_id: i64) -> Result<Option<OrderDetail>>;
}
