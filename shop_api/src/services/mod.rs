// shop_api/src/services/mod.rs

//! Business rules that sit between the HTTP handlers and the store.

pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod seed;
