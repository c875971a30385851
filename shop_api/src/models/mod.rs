// shop_api/src/models/mod.rs

//! Contains data structures representing database entities.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

// Re-export the model structs for convenient access
pub use cart_item::{CartLine, CartSummary};
pub use order::{Order, OrderDetail, ORDER_STATUS_COMPLETED};
pub use order_item::OrderItem;
pub use product::{Product, ProductInput};
pub use user::{NewUser, User};
