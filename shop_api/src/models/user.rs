// shop_api/src/models/user.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub phone: Option<String>,
}

/// A validated registration, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub email: String,
  pub password_hash: String,
  pub phone: Option<String>,
}
