// src/config.rs

use std::env;

use chrono::Duration;
use dotenvy::dotenv;

use crate::auth::credentials::HashScheme;

/// Default lifetime of an access token, in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 120;

/// Optional credentials for the admin account created at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub token_ttl: Duration,
    pub password_scheme: HashScheme,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let token_ttl = env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|m| m.parse::<i64>().ok())
            .filter(|m| *m > 0)
            .map(Duration::minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES));

        let password_scheme = env::var("PASSWORD_HASH_SCHEME")
            .map(|name| HashScheme::parse_or_default(&name))
            .unwrap_or_default();

        let admin_seed = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed {
                email,
                password,
                first_name: env::var("ADMIN_FIRST_NAME").unwrap_or_else(|_| "Admin".to_string()),
                middle_name: env::var("ADMIN_MIDDLE_NAME").ok(),
                last_name: env::var("ADMIN_LAST_NAME").unwrap_or_else(|_| "Admin".to_string()),
            }),
            _ => None,
        };

        Self {
            database_url,
            database_max_connections,
            host,
            port,
            rust_log,
            token_ttl,
            password_scheme,
            admin_seed,
        }
    }

    /// Settings for running without a real database or environment.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/testhub_test".to_string(),
            database_max_connections: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "error".to_string(),
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            password_scheme: HashScheme::default(),
            admin_seed: None,
        }
    }
}
