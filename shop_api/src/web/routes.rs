// shop_api/src/web/routes.rs

use actix_web::{error, web, HttpRequest};

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, cart_handlers, health_handlers, order_handlers, product_handlers};

// Malformed bodies get the same `{"error": ...}` shape as every other 400.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid JSON body: {}", err)).into()
}

/// Called from `main.rs` and the integration tests to mount the whole API.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .service(
      web::scope("/api")
        .route("", web::get().to(health_handlers::api_root_handler))
        .route("/health", web::get().to(health_handlers::health_check_handler))
        .route("/register", web::post().to(auth_handlers::register_handler))
        .service(
          web::scope("/products")
            .service(
              web::resource("")
                .route(web::get().to(product_handlers::list_products_handler))
                .route(web::post().to(product_handlers::create_product_handler)),
            )
            .service(
              web::resource("/{product_id}")
                .route(web::get().to(product_handlers::get_product_handler))
                .route(web::put().to(product_handlers::update_product_handler))
                .route(web::delete().to(product_handlers::delete_product_handler)),
            ),
        )
        .service(
          web::scope("/cart")
            .route("", web::post().to(cart_handlers::add_to_cart_handler))
            .route("/clear/{user_id}", web::post().to(cart_handlers::clear_cart_handler))
            // GET takes a user id; PUT and DELETE take a cart item id.
            .service(
              web::resource("/{id}")
                .route(web::get().to(cart_handlers::get_cart_handler))
                .route(web::put().to(cart_handlers::update_cart_item_handler))
                .route(web::delete().to(cart_handlers::remove_cart_item_handler)),
            ),
        )
        .service(
          web::scope("/orders")
            .route("/checkout", web::post().to(order_handlers::checkout_handler))
            .route("/detail/{order_id}", web::get().to(order_handlers::get_order_handler))
            .route("/{user_id}", web::get().to(order_handlers::list_orders_handler)),
        ),
    );
}
