// shop_api/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use shop_api::config::{AppConfig, LogFormat};
use shop_api::services::seed;
use shop_api::state::AppState;
use shop_api::store::MySqlStore;
use shop_api::web::configure_app_routes;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  // RUST_LOG overrides the default level
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match format {
    LogFormat::Text => builder.init(),
    LogFormat::Json => builder.json().init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  init_tracing(app_config.log_format);
  tracing::info!("Starting stationery shop API server...");

  let store = MySqlStore::connect(&app_config.database, app_config.db_pool_size)
    .await
    .context("Failed to prepare the database")?;
  tracing::info!("Successfully connected to the database.");

  if app_config.seed_db {
    seed::seed_catalog(&store).await.context("Failed to seed the catalog")?;
  }

  let app_state = AppState::new(Arc::new(store));

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
