// shop_api/src/store/mysql.rs

use async_trait::async_trait;
use sqlx::error::DatabaseError;
use sqlx::mysql::{MySqlConnectOptions, MySqlDatabaseError, MySqlPool, MySqlPoolOptions};
use sqlx::{Connection, Executor, MySqlConnection};
use tracing::{error, info, instrument, warn};

use super::ShopStore;
use crate::config::DatabaseSettings;
use crate::errors::{AppError, Result};
use crate::models::{
  CartLine, NewUser, Order, OrderDetail, OrderItem, Product, ProductInput, User, ORDER_STATUS_COMPLETED,
};
use crate::services::checkout_service::{OrderDraft, PlacedOrder};

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, image_url, stock, created_at, updated_at";

const CART_LINES_SQL: &str = r#"
  SELECT c.id, c.quantity, p.id AS product_id, p.name, p.description,
         p.price, p.image_url, p.stock,
         (c.quantity * p.price) AS subtotal
  FROM cart_items c
  JOIN products p ON c.product_id = p.id
  WHERE c.user_id = ?
  ORDER BY c.created_at DESC, c.id DESC
"#;

// ER_WARN_DATA_OUT_OF_RANGE and ER_DATA_OUT_OF_RANGE
const OUT_OF_RANGE_ERRORS: [u16; 2] = [1264, 1690];

fn is_out_of_range(db_err: &dyn DatabaseError) -> bool {
  db_err
    .try_downcast_ref::<MySqlDatabaseError>()
    .map(|e| OUT_OF_RANGE_ERRORS.contains(&e.number()))
    .unwrap_or(false)
}

#[derive(Clone)]
pub struct MySqlStore {
  pool: MySqlPool,
}

impl MySqlStore {
  pub fn from_pool(pool: MySqlPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &MySqlPool {
    &self.pool
  }

  /// Creates the database when missing, opens the pool and applies migrations.
  #[instrument(name = "mysql_store::connect", skip(settings))]
  pub async fn connect(settings: &DatabaseSettings, max_connections: u32) -> Result<Self> {
    let options = settings.connect_options()?;
    ensure_database(&options).await?;

    let pool = MySqlPoolOptions::new()
      .max_connections(max_connections)
      .connect_with(options)
      .await
      .map_err(|e| {
        error!("Failed to connect to the database: {}", e);
        AppError::Sqlx(e)
      })?;
    info!(max_connections, "MySQL connection pool ready.");

    let store = Self::from_pool(pool);
    store.migrate().await?;
    Ok(store)
  }

  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    info!("Database schema is up to date.");
    Ok(())
  }

  async fn product_exists(&self, product_id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?")
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(found.is_some())
  }

  async fn cart_item_exists(&self, cart_item_id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM cart_items WHERE id = ?")
      .bind(cart_item_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(found.is_some())
  }
}

/// Issues `CREATE DATABASE IF NOT EXISTS` through a connection to the
/// always-present `information_schema`.
async fn ensure_database(options: &MySqlConnectOptions) -> Result<()> {
  let Some(database) = options.get_database().map(str::to_owned) else {
    return Ok(());
  };

  let admin_options = options.clone().database("information_schema");
  let mut conn = MySqlConnection::connect_with(&admin_options).await.map_err(|e| {
    error!("Unable to connect to MySQL server: {}", e);
    AppError::Sqlx(e)
  })?;

  let ddl = format!(
    "CREATE DATABASE IF NOT EXISTS `{}` DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci",
    database.replace('`', "``")
  );
  conn.execute(ddl.as_str()).await?;
  conn.close().await?;
  info!(database = %database, "Database is present.");
  Ok(())
}

#[async_trait]
impl ShopStore for MySqlStore {
  async fn ping(&self) -> Result<()> {
    sqlx::query("SELECT 1").execute(&self.pool).await?;
    Ok(())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT id, username, email, password_hash, phone FROM users WHERE email = ?")
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  #[instrument(name = "mysql_store::create_user", skip(self, user), fields(email = %user.email))]
  async fn create_user(&self, user: &NewUser) -> Result<i64> {
    let result = sqlx::query("INSERT INTO users (username, email, password_hash, phone) VALUES (?, ?, ?, ?)")
      .bind(&user.username)
      .bind(&user.email)
      .bind(&user.password_hash)
      .bind(&user.phone)
      .execute(&self.pool)
      .await
      .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
          warn!("Email {} is already registered.", user.email);
          AppError::Conflict("email already registered".to_string())
        }
        other => AppError::Sqlx(other),
      })?;
    Ok(result.last_insert_id() as i64)
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let sql = format!("SELECT {} FROM products ORDER BY created_at DESC, id DESC", PRODUCT_COLUMNS);
    let products = sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?;
    Ok(products)
  }

  async fn get_product(&self, product_id: i64) -> Result<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
    let product = sqlx::query_as::<_, Product>(&sql)
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  async fn count_products(&self) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }

  async fn create_product(&self, input: &ProductInput) -> Result<i64> {
    let result = sqlx::query(
      "INSERT INTO products (name, description, price, category, image_url, stock) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.price)
    .bind(&input.category)
    .bind(&input.image_url)
    .bind(input.stock)
    .execute(&self.pool)
    .await?;
    Ok(result.last_insert_id() as i64)
  }

  async fn update_product(&self, product_id: i64, input: &ProductInput) -> Result<bool> {
    let result = sqlx::query(
      r#"
      UPDATE products
      SET name = ?, description = ?, price = ?, category = ?, image_url = ?, stock = ?
      WHERE id = ?
      "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.price)
    .bind(&input.category)
    .bind(&input.image_url)
    .bind(input.stock)
    .bind(product_id)
    .execute(&self.pool)
    .await?;

    // An UPDATE that changes nothing may report zero rows; tell that apart from a missing row.
    if result.rows_affected() > 0 {
      return Ok(true);
    }
    self.product_exists(product_id).await
  }

  async fn delete_product(&self, product_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
      .bind(product_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "mysql_store::add_to_cart", skip(self))]
  async fn add_to_cart(&self, user_id: i64, product_id: i64, quantity: i32) -> Result<()> {
    sqlx::query(
      r#"
      INSERT INTO cart_items (user_id, product_id, quantity)
      VALUES (?, ?, ?)
      ON DUPLICATE KEY UPDATE quantity = quantity + ?
      "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .bind(quantity)
    .execute(&self.pool)
    .await
    .map_err(|e| match e {
      sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
        warn!("Cart add rejected: user {} or product {} does not exist.", user_id, product_id);
        AppError::NotFound("User or product not found".to_string())
      }
      sqlx::Error::Database(ref db_err) if is_out_of_range(&**db_err) => {
        warn!("Cart add rejected: quantity for product {} would overflow.", product_id);
        AppError::Validation("Cart quantity is too large".to_string())
      }
      other => AppError::Sqlx(other),
    })?;
    Ok(())
  }

  async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(CART_LINES_SQL)
      .bind(user_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(lines)
  }

  async fn set_cart_quantity(&self, cart_item_id: i64, quantity: i32) -> Result<bool> {
    if quantity <= 0 {
      return self.remove_cart_item(cart_item_id).await;
    }
    let result = sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
      .bind(quantity)
      .bind(cart_item_id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() > 0 {
      return Ok(true);
    }
    self.cart_item_exists(cart_item_id).await
  }

  async fn remove_cart_item(&self, cart_item_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = ?")
      .bind(cart_item_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn clear_cart(&self, user_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  #[instrument(name = "mysql_store::checkout", skip(self))]
  async fn checkout(&self, user_id: i64) -> Result<PlacedOrder> {
    // Dropping `tx` without commit rolls everything back.
    let mut tx = self.pool.begin().await?;

    let cart_sql = format!("{} FOR UPDATE", CART_LINES_SQL.trim_end());
    let cart = sqlx::query_as::<_, CartLine>(&cart_sql)
      .bind(user_id)
      .fetch_all(&mut *tx)
      .await?;
    let draft = OrderDraft::from_cart(user_id, &cart)?;

    let inserted = sqlx::query(
      "INSERT INTO orders (user_id, total_amount, tax_amount, grand_total, status) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(draft.user_id)
    .bind(draft.total_amount)
    .bind(draft.tax_amount)
    .bind(draft.grand_total)
    .bind(ORDER_STATUS_COMPLETED)
    .execute(&mut *tx)
    .await?;
    let order_id = inserted.last_insert_id() as i64;

    for line in &draft.lines {
      sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, product_name, product_price, quantity, subtotal)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
      )
      .bind(order_id)
      .bind(line.product_id)
      .bind(&line.product_name)
      .bind(line.product_price)
      .bind(line.quantity)
      .bind(line.subtotal)
      .execute(&mut *tx)
      .await?;

      let guarded = sqlx::query("UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?")
        .bind(line.quantity)
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;
      if guarded.rows_affected() == 0 {
        warn!(
          "Stock guard rejected product {} (wanted {}). Rolling back order for user {}.",
          line.product_id, line.quantity, user_id
        );
        tx.rollback().await?;
        return Err(AppError::InsufficientStock {
          product_id: line.product_id,
        });
      }

      sqlx::query("DELETE FROM cart_items WHERE id = ?")
        .bind(line.cart_item_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(order_id, "Order committed with {} line(s).", draft.lines.len());

    Ok(PlacedOrder {
      order_id,
      grand_total: draft.grand_total,
    })
  }

  async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
      r#"
      SELECT id, user_id, total_amount, tax_amount, grand_total, status, created_at
      FROM orders
      WHERE user_id = ?
      ORDER BY created_at DESC, id DESC
      "#,
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(orders)
  }

  async fn order_detail(&self, order_id: i64) -> Result<Option<OrderDetail>> {
    let order = sqlx::query_as::<_, Order>(
      "SELECT id, user_id, total_amount, tax_amount, grand_total, status, created_at FROM orders WHERE id = ?",
    )
    .bind(order_id)
    .fetch_optional(&self.pool)
    .await?;

    let Some(order) = order else {
      return Ok(None);
    };

    let items = sqlx::query_as::<_, OrderItem>(
      r#"
      SELECT oi.id, oi.order_id, oi.product_id, oi.product_name, oi.product_price,
             oi.quantity, oi.subtotal, p.image_url
      FROM order_items oi
      LEFT JOIN products p ON oi.product_id = p.id
      WHERE oi.order_id = ?
      ORDER BY oi.id
      "#,
    )
    .bind(order_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(Some(OrderDetail { order, items }))
  }
}
