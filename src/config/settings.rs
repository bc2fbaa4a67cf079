use std::env;

use serde::{Deserialize, Serialize};

use crate::config::constants::{ADMIN_SESSION_TTL_MINUTES, SESSION_TTL_HOURS};

/// Main configuration container for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Session timing settings
    pub session: SessionConfig,
    /// Admin console credentials
    pub admin: AdminConfig,
    /// Logging configuration settings
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            admin: AdminConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables or use defaults
    pub fn load() -> Self {
        Self {
            session: SessionConfig::load(),
            admin: AdminConfig::load(),
            logging: LoggingConfig::load(),
        }
    }
}

/// Session timing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// User session token expiration time in hours
    pub token_ttl_hours: i64,
    /// Admin session expiration time in minutes
    pub admin_ttl_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: SESSION_TTL_HOURS,
            admin_ttl_minutes: ADMIN_SESSION_TTL_MINUTES,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables or use defaults
    pub fn load() -> Self {
        let token_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .unwrap_or(SESSION_TTL_HOURS);
        let admin_ttl_minutes = env::var("ADMIN_SESSION_TTL_MINUTES")
            .ok()
            .and_then(|m| m.parse::<i64>().ok())
            .unwrap_or(ADMIN_SESSION_TTL_MINUTES);

        Self {
            token_ttl_hours,
            admin_ttl_minutes,
        }
    }
}

/// Admin console credentials. The secret is always configuration-supplied;
/// an empty secret disables admin login entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Owner email address
    pub owner_email: String,
    /// Owner password, compared directly when no hash is configured
    pub owner_password: String,
    /// Optional Argon2 PHC string for the owner password; preferred over
    /// the raw password when present
    pub owner_password_hash: Option<String>,
    /// Server-held admin secret, the third login factor
    pub admin_secret: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            owner_email: String::new(),
            owner_password: String::new(),
            owner_password_hash: None,
            admin_secret: String::new(),
        }
    }
}

impl AdminConfig {
    /// Load admin credentials from environment variables
    pub fn load() -> Self {
        Self {
            owner_email: env::var("ADMIN_EMAIL").unwrap_or_default(),
            owner_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            owner_password_hash: env::var("ADMIN_PASSWORD_HASH").ok(),
            admin_secret: env::var("ADMIN_SECRET").unwrap_or_default(),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Emit JSON-formatted logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Load logging configuration from environment variables or use defaults
    pub fn load() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let json = env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self { level, json }
    }
}
