// shop_api/src/services/auth_service.rs

//! Registration and password hashing.

use crate::errors::AppError; // Application-specific error type
use crate::models::NewUser;
use crate::store::ShopStore;
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    SaltString,
  },
  Argon2,
};
use tracing::{debug, error, info, instrument, warn};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Raw registration fields as they arrive from the client.
#[derive(Debug, Clone, Default)]
pub struct Registration {
  pub username: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>,
  pub phone: Option<String>,
}

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    error!("Password hashing failed: Password cannot be empty.");
    return Err(AppError::Validation(
      "Password cannot be empty for hashing.".to_string(),
    ));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => {
      debug!("Password hashed successfully.");
      Ok(password_hash_obj.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!(
        "Password hashing process failed: {}",
        argon_err
      )))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` on a mismatch and an error only when the stored hash
/// cannot be parsed.
#[instrument(name = "auth_service::verify_password", skip(hashed_password_str, provided_password), err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

fn required(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Validates the registration, rejects known emails and stores the new user.
#[instrument(name = "auth_service::register_user", skip(store, registration), fields(email = ?registration.email))]
pub async fn register_user(store: &dyn ShopStore, registration: Registration) -> Result<i64, AppError> {
  let (Some(username), Some(email), Some(password)) = (
    required(registration.username),
    required(registration.email),
    registration.password.filter(|p| !p.is_empty()),
  ) else {
    warn!("Registration rejected: missing required fields.");
    return Err(AppError::Validation(
      "username, email and password are required".to_string(),
    ));
  };

  if password.chars().count() < MIN_PASSWORD_LEN {
    warn!("Registration rejected: password too short.");
    return Err(AppError::Validation(format!(
      "password must be at least {} characters long",
      MIN_PASSWORD_LEN
    )));
  }

  if store.find_user_by_email(&email).await?.is_some() {
    warn!("Registration rejected: email {} already registered.", email);
    return Err(AppError::Conflict("email already registered".to_string()));
  }

  let new_user = NewUser {
    username,
    email,
    password_hash: hash_password(&password)?,
    phone: required(registration.phone),
  };
  let user_id = store.create_user(&new_user).await?;
  info!("User {} registered with email {}.", user_id, new_user.email);
  Ok(user_id)
}
