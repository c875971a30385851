// shop_api/src/services/seed.rs

//! Sample stationery catalog for fresh databases (`SEED_DB=true`).

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::models::ProductInput;
use crate::store::ShopStore;

// (name, description, price in cents, category, image, stock)
const SAMPLE_PRODUCTS: &[(&str, &str, i64, &str, &str, i32)] = &[
  (
    "Ballpoint Pen Set (10 Pack)",
    "High-quality ballpoint pens with smooth ink flow. Perfect for everyday writing tasks, exams, and note-taking.",
    1299,
    "Writing Instruments",
    "https://images.unsplash.com/photo-1586951404587-1356a7f285f7?w=400",
    50,
  ),
  (
    "Mechanical Pencil Set",
    "0.7mm mechanical pencils with ergonomic grip. Includes extra lead refills and erasers.",
    1599,
    "Writing Instruments",
    "https://images.unsplash.com/photo-1606040450952-48b6b3dc831e?w=400",
    35,
  ),
  (
    "Highlighter Set (6 Colors)",
    "Vibrant highlighters in assorted colors. Chisel tip for both broad and narrow lines.",
    899,
    "Writing Instruments",
    "https://images.unsplash.com/photo-1615835818812-e4c4ac0af0e0?w=400",
    45,
  ),
  (
    "Spiral Notebook (3 Pack)",
    "College-ruled spiral notebooks with 100 sheets each. Durable covers in various colors.",
    999,
    "Notebooks",
    "https://images.unsplash.com/photo-1513475382585-d06e58bcb0e0?w=400",
    60,
  ),
  (
    "Composition Notebook",
    "Classic marble composition notebook with 200 pages. Ideal for journaling and note-taking.",
    599,
    "Notebooks",
    "https://images.unsplash.com/photo-1544947950-fa07a98d237f?w=400",
    40,
  ),
  (
    "Sticky Notes Multi-Pack",
    "Assorted sizes of sticky notes in bright colors. Great for reminders and quick notes.",
    749,
    "Notebooks",
    "https://images.unsplash.com/photo-1586075010923-2dd4570fb338?w=400",
    55,
  ),
];

pub fn sample_products() -> Vec<ProductInput> {
  SAMPLE_PRODUCTS
    .iter()
    .map(|(name, description, cents, category, image_url, stock)| ProductInput {
      name: name.to_string(),
      description: description.to_string(),
      price: Decimal::new(*cents, 2),
      category: category.to_string(),
      image_url: image_url.to_string(),
      stock: *stock,
    })
    .collect()
}

/// Inserts the sample catalog unless products already exist. Returns how many were added.
#[instrument(name = "seed::seed_catalog", skip(store))]
pub async fn seed_catalog(store: &dyn ShopStore) -> Result<usize> {
  let existing = store.count_products().await?;
  if existing > 0 {
    info!("Catalog already holds {} product(s); skipping seed.", existing);
    return Ok(0);
  }

  let products = sample_products();
  for product in &products {
    store.create_product(product).await?;
  }
  info!("Seeded {} sample products.", products.len());
  Ok(products.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;

  #[tokio::test]
  async fn seeds_once() {
    let store = MemoryStore::new();
    assert_eq!(seed_catalog(&store).await.expect("seed"), SAMPLE_PRODUCTS.len());
    assert_eq!(seed_catalog(&store).await.expect("reseed"), 0);
    assert_eq!(store.count_products().await.expect("count"), SAMPLE_PRODUCTS.len() as i64);
  }

  #[test]
  fn sample_prices_are_in_dollars() {
    let first = &sample_products()[0];
    assert_eq!(first.price.to_string(), "12.99");
  }
}
