// shop_api/src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::ShopStore;
use crate::errors::{AppError, Result};
use crate::models::{
  CartLine, NewUser, Order, OrderDetail, OrderItem, Product, ProductInput, User, ORDER_STATUS_COMPLETED,
};
use crate::services::checkout_service::{OrderDraft, PlacedOrder};

/// In-process store with the same rules as the MySQL schema: unique emails,
/// one cart line per (user, product), cascading deletes and a single-lock
/// checkout. Used by the HTTP tests and handy for running without a database.
///
/// Emails compare ASCII case-insensitively, like the `utf8mb4_unicode_ci`
/// unique index on `users.email`.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

#[derive(Debug, Clone)]
struct CartRow {
  id: i64,
  user_id: i64,
  product_id: i64,
  quantity: i32,
  created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct OrderItemRow {
  id: i64,
  order_id: i64,
  product_id: Option<i64>,
  product_name: String,
  product_price: Decimal,
  quantity: i32,
  subtotal: Decimal,
}

#[derive(Default)]
struct Tables {
  users: BTreeMap<i64, User>,
  products: BTreeMap<i64, Product>,
  cart_items: BTreeMap<i64, CartRow>,
  orders: BTreeMap<i64, Order>,
  order_items: BTreeMap<i64, OrderItemRow>,
  last_id: LastIds,
}

#[derive(Default)]
struct LastIds {
  user: i64,
  product: i64,
  cart_item: i64,
  order: i64,
  order_item: i64,
}

fn next_id(counter: &mut i64) -> i64 {
  *counter += 1;
  *counter
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Tables {
  fn cart_lines(&self, user_id: i64) -> Vec<CartLine> {
    let mut rows: Vec<&CartRow> = self.cart_items.values().filter(|row| row.user_id == user_id).collect();
    rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    rows
      .into_iter()
      .filter_map(|row| {
        let product = self.products.get(&row.product_id)?;
        Some(CartLine {
          id: row.id,
          quantity: row.quantity,
          product_id: product.id,
          name: product.name.clone(),
          description: product.description.clone(),
          price: product.price,
          image_url: product.image_url.clone(),
          stock: product.stock,
          subtotal: product.price * Decimal::from(row.quantity),
        })
      })
      .collect()
  }

  fn add_to_cart(&mut self, user_id: i64, product_id: i64, quantity: i32) -> Result<()> {
    if !self.users.contains_key(&user_id) || !self.products.contains_key(&product_id) {
      return Err(AppError::NotFound("User or product not found".to_string()));
    }
    if let Some(row) = self
      .cart_items
      .values_mut()
      .find(|row| row.user_id == user_id && row.product_id == product_id)
    {
      row.quantity = row
        .quantity
        .checked_add(quantity)
        .ok_or_else(|| AppError::Validation("Cart quantity is too large".to_string()))?;
      return Ok(());
    }
    let id = next_id(&mut self.last_id.cart_item);
    self.cart_items.insert(
      id,
      CartRow {
        id,
        user_id,
        product_id,
        quantity,
        created_at: Utc::now(),
      },
    );
    Ok(())
  }

  fn checkout(&mut self, user_id: i64) -> Result<PlacedOrder> {
    let cart = self.cart_lines(user_id);
    let draft = OrderDraft::from_cart(user_id, &cart)?;

    // Every guard is checked before anything is written, so a failure leaves no trace.
    for line in &draft.lines {
      let in_stock = self
        .products
        .get(&line.product_id)
        .map(|p| p.stock >= line.quantity)
        .unwrap_or(false);
      if !in_stock {
        return Err(AppError::InsufficientStock {
          product_id: line.product_id,
        });
      }
    }

    let order_id = next_id(&mut self.last_id.order);
    self.orders.insert(
      order_id,
      Order {
        id: order_id,
        user_id,
        total_amount: draft.total_amount,
        tax_amount: draft.tax_amount,
        grand_total: draft.grand_total,
        status: ORDER_STATUS_COMPLETED.to_string(),
        created_at: Utc::now(),
      },
    );

    for line in &draft.lines {
      let item_id = next_id(&mut self.last_id.order_item);
      self.order_items.insert(
        item_id,
        OrderItemRow {
          id: item_id,
          order_id,
          product_id: Some(line.product_id),
          product_name: line.product_name.clone(),
          product_price: line.product_price,
          quantity: line.quantity,
          subtotal: line.subtotal,
        },
      );
      if let Some(product) = self.products.get_mut(&line.product_id) {
        product.stock -= line.quantity;
        product.updated_at = Utc::now();
      }
      self.cart_items.remove(&line.cart_item_id);
    }

    Ok(PlacedOrder {
      order_id,
      grand_total: draft.grand_total,
    })
  }

  fn order_detail(&self, order_id: i64) -> Option<OrderDetail> {
    let order = self.orders.get(&order_id)?.clone();
    let items = self
      .order_items
      .values()
      .filter(|row| row.order_id == order_id)
      .map(|row| OrderItem {
        id: row.id,
        order_id: row.order_id,
        product_id: row.product_id,
        product_name: row.product_name.clone(),
        product_price: row.product_price,
        quantity: row.quantity,
        subtotal: row.subtotal,
        image_url: row
          .product_id
          .and_then(|pid| self.products.get(&pid))
          .and_then(|p| p.image_url.clone()),
      })
      .collect();
    Some(OrderDetail { order, items })
  }
}

#[async_trait]
impl ShopStore for MemoryStore {
  async fn ping(&self) -> Result<()> {
    Ok(())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let tables = self.tables.lock();
    Ok(tables.users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
  }

  async fn create_user(&self, user: &NewUser) -> Result<i64> {
    let mut tables = self.tables.lock();
    if tables.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
      return Err(AppError::Conflict("email already registered".to_string()));
    }
    let id = next_id(&mut tables.last_id.user);
    tables.users.insert(
      id,
      User {
        id,
        username: user.username.clone(),
        email: user.email.clone(),
        password_hash: user.password_hash.clone(),
        phone: user.phone.clone(),
      },
    );
    Ok(id)
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let tables = self.tables.lock();
    let mut products: Vec<Product> = tables.products.values().cloned().collect();
    products.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    Ok(products)
  }

  async fn get_product(&self, product_id: i64) -> Result<Option<Product>> {
    Ok(self.tables.lock().products.get(&product_id).cloned())
  }

  async fn count_products(&self) -> Result<i64> {
    Ok(self.tables.lock().products.len() as i64)
  }

  async fn create_product(&self, input: &ProductInput) -> Result<i64> {
    let mut tables = self.tables.lock();
    let id = next_id(&mut tables.last_id.product);
    let now = Utc::now();
    tables.products.insert(
      id,
      Product {
        id,
        name: input.name.clone(),
        description: Some(input.description.clone()),
        price: input.price,
        category: Some(input.category.clone()),
        image_url: Some(input.image_url.clone()),
        stock: input.stock,
        created_at: now,
        updated_at: now,
      },
    );
    Ok(id)
  }

  async fn update_product(&self, product_id: i64, input: &ProductInput) -> Result<bool> {
    let mut tables = self.tables.lock();
    let Some(product) = tables.products.get_mut(&product_id) else {
      return Ok(false);
    };
    product.name = input.name.clone();
    product.description = Some(input.description.clone());
    product.price = input.price;
    product.category = Some(input.category.clone());
    product.image_url = Some(input.image_url.clone());
    product.stock = input.stock;
    product.updated_at = Utc::now();
    Ok(true)
  }

  async fn delete_product(&self, product_id: i64) -> Result<bool> {
    let mut tables = self.tables.lock();
    if tables.products.remove(&product_id).is_none() {
      return Ok(false);
    }
    // ON DELETE CASCADE for cart lines, ON DELETE SET NULL for order snapshots.
    tables.cart_items.retain(|_, row| row.product_id != product_id);
    for item in tables.order_items.values_mut() {
      if item.product_id == Some(product_id) {
        item.product_id = None;
      }
    }
    Ok(true)
  }

  async fn add_to_cart(&self, user_id: i64, product_id: i64, quantity: i32) -> Result<()> {
    self.tables.lock().add_to_cart(user_id, product_id, quantity)
  }

  async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>> {
    Ok(self.tables.lock().cart_lines(user_id))
  }

  async fn set_cart_quantity(&self, cart_item_id: i64, quantity: i32) -> Result<bool> {
    let mut tables = self.tables.lock();
    if quantity <= 0 {
      return Ok(tables.cart_items.remove(&cart_item_id).is_some());
    }
    match tables.cart_items.get_mut(&cart_item_id) {
      Some(row) => {
        row.quantity = quantity;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn remove_cart_item(&self, cart_item_id: i64) -> Result<bool> {
    Ok(self.tables.lock().cart_items.remove(&cart_item_id).is_some())
  }

  async fn clear_cart(&self, user_id: i64) -> Result<u64> {
    let mut tables = self.tables.lock();
    let before = tables.cart_items.len();
    tables.cart_items.retain(|_, row| row.user_id != user_id);
    Ok((before - tables.cart_items.len()) as u64)
  }

  async fn checkout(&self, user_id: i64) -> Result<PlacedOrder> {
    self.tables.lock().checkout(user_id)
  }

  async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>> {
    let tables = self.tables.lock();
    let mut orders: Vec<Order> = tables.orders.values().filter(|o| o.user_id == user_id).cloned().collect();
    orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    Ok(orders)
  }

  async fn order_detail(&self, order_id: i64) -> Result<Option<OrderDetail>> {
    Ok(self.tables.lock().order_detail(order_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("decimal literal")
  }

  fn product(name: &str, price: &str, stock: i32) -> ProductInput {
    ProductInput {
      name: name.to_string(),
      description: String::new(),
      price: dec(price),
      category: String::new(),
      image_url: format!("https://img.example/{}.png", name),
      stock,
    }
  }

  async fn user(store: &MemoryStore, email: &str) -> i64 {
    store
      .create_user(&NewUser {
        username: "Tester".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        phone: None,
      })
      .await
      .expect("user")
  }

  #[tokio::test]
  async fn duplicate_email_is_a_conflict() {
    let store = MemoryStore::new();
    user(&store, "a@example.com").await;
    let second = store
      .create_user(&NewUser {
        username: "Other".to_string(),
        email: "a@example.com".to_string(),
        password_hash: "hash".to_string(),
        phone: Some("555".to_string()),
      })
      .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
  }

  #[tokio::test]
  async fn email_uniqueness_ignores_ascii_case() {
    let store = MemoryStore::new();
    let id = user(&store, "Mixed@Example.com").await;
    let found = store.find_user_by_email("mixed@example.com").await.expect("lookup");
    assert_eq!(found.map(|u| u.id), Some(id));
    let second = store
      .create_user(&NewUser {
        username: "Other".to_string(),
        email: "MIXED@example.COM".to_string(),
        password_hash: "hash".to_string(),
        phone: None,
      })
      .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
  }

  #[tokio::test]
  async fn accumulated_quantity_cannot_overflow() {
    let store = MemoryStore::new();
    let uid = user(&store, "h@example.com").await;
    let pid = store.create_product(&product("bulk", "0.01", i32::MAX)).await.expect("product");

    store.add_to_cart(uid, pid, i32::MAX).await.expect("first add");
    assert!(matches!(store.add_to_cart(uid, pid, 1).await, Err(AppError::Validation(_))));
    assert_eq!(store.cart_lines(uid).await.expect("lines")[0].quantity, i32::MAX);
  }

  #[tokio::test]
  async fn repeated_adds_accumulate_on_one_line() {
    let store = MemoryStore::new();
    let uid = user(&store, "b@example.com").await;
    let pid = store.create_product(&product("pen", "1.50", 10)).await.expect("product");

    store.add_to_cart(uid, pid, 2).await.expect("first add");
    store.add_to_cart(uid, pid, 2).await.expect("second add");

    let lines = store.cart_lines(uid).await.expect("lines");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 4);
    assert_eq!(lines[0].subtotal, dec("6.00"));
  }

  #[tokio::test]
  async fn cart_add_requires_existing_user_and_product() {
    let store = MemoryStore::new();
    let uid = user(&store, "c@example.com").await;
    let pid = store.create_product(&product("pad", "3.00", 5)).await.expect("product");
    assert!(matches!(store.add_to_cart(uid + 100, pid, 1).await, Err(AppError::NotFound(_))));
    assert!(matches!(store.add_to_cart(uid, pid + 100, 1).await, Err(AppError::NotFound(_))));
  }

  #[tokio::test]
  async fn zero_quantity_update_deletes_the_line() {
    let store = MemoryStore::new();
    let uid = user(&store, "d@example.com").await;
    let pid = store.create_product(&product("ink", "4.00", 5)).await.expect("product");
    store.add_to_cart(uid, pid, 1).await.expect("add");
    let line_id = store.cart_lines(uid).await.expect("lines")[0].id;

    assert!(store.set_cart_quantity(line_id, 0).await.expect("update"));
    assert!(store.cart_lines(uid).await.expect("lines").is_empty());
    assert!(!store.set_cart_quantity(line_id, 3).await.expect("update missing"));
  }

  #[tokio::test]
  async fn failed_stock_guard_leaves_everything_untouched() {
    let store = MemoryStore::new();
    let uid = user(&store, "e@example.com").await;
    let plenty = store.create_product(&product("clip", "0.50", 100)).await.expect("product");
    let scarce = store.create_product(&product("stapler", "9.00", 2)).await.expect("product");
    store.add_to_cart(uid, plenty, 5).await.expect("add");
    store.add_to_cart(uid, scarce, 2).await.expect("add");

    // Someone else buys the last staplers through an admin edit.
    store.update_product(scarce, &product("stapler", "9.00", 1)).await.expect("update");

    let result = store.checkout(uid).await;
    assert!(matches!(result, Err(AppError::InsufficientStock { product_id }) if product_id == scarce));
    assert!(store.orders_for_user(uid).await.expect("orders").is_empty());
    assert_eq!(store.cart_lines(uid).await.expect("lines").len(), 2);
    assert_eq!(store.get_product(plenty).await.expect("get").expect("plenty").stock, 100);
  }

  #[tokio::test]
  async fn deleting_a_product_nulls_snapshots_and_drops_cart_lines() {
    let store = MemoryStore::new();
    let uid = user(&store, "f@example.com").await;
    let pid = store.create_product(&product("ruler", "2.25", 10)).await.expect("product");
    store.add_to_cart(uid, pid, 2).await.expect("add");
    let placed = store.checkout(uid).await.expect("checkout");
    store.add_to_cart(uid, pid, 1).await.expect("add again");

    assert!(store.delete_product(pid).await.expect("delete"));
    assert!(!store.delete_product(pid).await.expect("delete again"));
    assert!(store.cart_lines(uid).await.expect("lines").is_empty());

    let detail = store.order_detail(placed.order_id).await.expect("detail").expect("order exists");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].product_id, None);
    assert_eq!(detail.items[0].product_name, "ruler");
    assert_eq!(detail.items[0].product_price, dec("2.25"));
    assert_eq!(detail.items[0].image_url, None);
  }

  #[tokio::test]
  async fn clear_cart_reports_removed_lines() {
    let store = MemoryStore::new();
    let uid = user(&store, "g@example.com").await;
    let a = store.create_product(&product("a", "1.00", 5)).await.expect("product");
    let b = store.create_product(&product("b", "1.00", 5)).await.expect("product");
    store.add_to_cart(uid, a, 1).await.expect("add");
    store.add_to_cart(uid, b, 1).await.expect("add");
    assert_eq!(store.clear_cart(uid).await.expect("clear"), 2);
    assert_eq!(store.clear_cart(uid).await.expect("clear again"), 0);
  }
}
