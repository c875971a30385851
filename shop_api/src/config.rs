// shop_api/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use sqlx::mysql::MySqlConnectOptions;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "text" | "pretty" => Ok(LogFormat::Text),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT: '{}'", other))),
    }
  }
}

/// Where the MySQL server lives. Either a full URL or its individual parts.
#[derive(Clone)]
pub enum DatabaseSettings {
  Url(String),
  Parts {
    host: String,
    port: u16,
    user: String,
    password: String,
    database: String,
  },
}

// Hand-written so the password never shows up in logs.
impl std::fmt::Debug for DatabaseSettings {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DatabaseSettings::Url(_) => f.write_str("Url([REDACTED])"),
      DatabaseSettings::Parts {
        host, port, user, database, ..
      } => f
        .debug_struct("Parts")
        .field("host", host)
        .field("port", port)
        .field("user", user)
        .field("database", database)
        .finish_non_exhaustive(),
    }
  }
}

impl DatabaseSettings {
  pub fn connect_options(&self) -> Result<MySqlConnectOptions> {
    let options = match self {
      DatabaseSettings::Url(url) => MySqlConnectOptions::from_str(url)
        .map_err(|e| AppError::Config(format!("Invalid DATABASE_URL: {}", e)))?,
      DatabaseSettings::Parts {
        host,
        port,
        user,
        password,
        database,
      } => MySqlConnectOptions::new()
        .host(host)
        .port(*port)
        .username(user)
        .password(password)
        .database(database),
    };
    Ok(options.charset("utf8mb4"))
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database: DatabaseSettings,
  pub db_pool_size: u32,
  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok(); // Load .env file if present
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Builds the config from any key lookup. `from_env` passes the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = parse_var("SERVER_PORT", &get_or("SERVER_PORT", "5000"))?;

    let database = match lookup("DATABASE_URL") {
      Some(url) if !url.trim().is_empty() => DatabaseSettings::Url(url),
      _ => DatabaseSettings::Parts {
        host: get_or("MYSQL_HOST", "127.0.0.1"),
        port: parse_var("MYSQL_PORT", &get_or("MYSQL_PORT", "3306"))?,
        user: get_or("MYSQL_USER", "root"),
        password: get_or("MYSQL_PASSWORD", ""),
        database: get_or("MYSQL_DATABASE", "app_db"),
      },
    };

    let pool_size_raw = lookup("DB_POOL_SIZE")
      .or_else(|| lookup("MYSQL_POOL_SIZE"))
      .unwrap_or_else(|| "5".to_string());
    let db_pool_size: u32 = parse_var("DB_POOL_SIZE", &pool_size_raw)?;
    if db_pool_size == 0 {
      return Err(AppError::Config("DB_POOL_SIZE must be at least 1".to_string()));
    }

    let seed_db = parse_var("SEED_DB", &get_or("SEED_DB", "false"))?;
    let log_format = get_or("LOG_FORMAT", "text").parse()?;

    Ok(Self {
      server_host,
      server_port,
      database,
      db_pool_size,
      seed_db,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", key, raw, e)))
}
