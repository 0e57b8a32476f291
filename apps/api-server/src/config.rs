//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use agora_infra::{DatabaseConfig, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Port of the socket.io listener.
    pub realtime_port: u16,
    /// `None` runs on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                DatabaseConfig::new(url).with_pool(
                    parse_var("DB_MAX_CONNECTIONS", 100),
                    parse_var("DB_MIN_CONNECTIONS", 10),
                )
            });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            realtime_port: parse_var("REALTIME_PORT", 3000),
            database,
            jwt: JwtConfig::from_env(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "Unparsable value, using default");
            default
        }),
        Err(_) => default,
    }
}
