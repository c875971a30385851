// shop_api/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::auth_service::{self, Registration};
use crate::state::AppState;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  #[serde(rename = "fullName")]
  pub full_name: Option<String>,
  pub username: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>,
  pub phone: Option<String>,
}

#[instrument(
    name = "handler::register",
    skip(app_state, req_payload),
    fields(req_email = ?req_payload.email)
)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let registration = Registration {
    // fullName wins when both are sent.
    username: payload.full_name.filter(|n| !n.trim().is_empty()).or(payload.username),
    email: payload.email,
    password: payload.password,
    phone: payload.phone,
  };

  let user_id = auth_service::register_user(app_state.store.as_ref(), registration).await?;
  info!("Registration complete. User ID: {}", user_id);

  Ok(HttpResponse::Created().json(json!({
      "message": "user created",
      "user_id": user_id,
  })))
}
