// src/config.rs

use std::env;

/// Marks awarded for a correct answer when the admin does not specify any.
pub const DEFAULT_CORRECT_MARKS: i64 = 4;

/// Marks awarded (usually a penalty) for a wrong answer when unspecified.
pub const DEFAULT_INCORRECT_MARKS: i64 = -1;

/// Default test duration in minutes.
pub const DEFAULT_DURATION_MINUTES: i64 = 180;

pub const DEFAULT_TEST_TITLE: &str = "Untitled Test";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

impl Config {
    /// Reads the process environment; `main` loads `.env` beforehand.
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            admin_username: env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
            admin_name: env::var("ADMIN_NAME").ok().filter(|v| !v.is_empty()),
        }
    }
}
