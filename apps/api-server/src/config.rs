//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use quill_infra::JwtConfig;
use quill_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub environment: String,
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config
        });

        let mut jwt = JwtConfig::default();
        if let Ok(secret) = env::var("JWT_SECRET") {
            jwt.secret = secret;
        }
        if let Some(hours) = parse_var("JWT_EXPIRATION_HOURS") {
            jwt.expiration_hours = hours;
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            jwt,
            environment: env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Log configuration problems that should not stop startup.
    pub fn warn_insecure_defaults(&self) {
        if !self.jwt.uses_default_secret() {
            return;
        }
        if self.is_production() {
            tracing::error!("JWT_SECRET is not set; tokens are signed with the built-in development secret");
        } else {
            tracing::warn!("JWT_SECRET is not set; using the development secret");
        }
    }
}
