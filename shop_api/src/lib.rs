// shop_api/src/lib.rs

//! Stationery shop backend: registration, product catalog, per-user carts and
//! checkout, served over actix-web on top of MySQL.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use errors::{AppError, Result};
pub use state::AppState;
