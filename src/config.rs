//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_JWT_EXPIRY_HOURS,
    DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_VERIFICATION_CODE_TTL_SECS, DEFAULT_VERIFICATION_MAX_ATTEMPTS,
    DEFAULT_VERIFICATION_RESEND_COOLDOWN_SECS,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub verification: VerificationConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// JWT authentication configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
    pub refresh_token_expiry_days: i64,
}

/// Phone verification code settings
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// Seconds an issued code stays valid
    pub code_ttl_secs: u64,
    /// Wrong guesses allowed before the code is burned
    pub max_attempts: u32,
    /// Minimum seconds between two codes for the same user
    pub resend_cooldown_secs: u64,
    /// SMS gateway endpoint; codes go to the log when unset
    pub sms_webhook_url: Option<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: DEFAULT_VERIFICATION_CODE_TTL_SECS,
            max_attempts: DEFAULT_VERIFICATION_MAX_ATTEMPTS,
            resend_cooldown_secs: DEFAULT_VERIFICATION_RESEND_COOLDOWN_SECS,
            sms_webhook_url: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            verification: VerificationConfig::from_env()?,
        })
    }
}

/// Read an optional variable and parse it, falling back to `default`
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
        })
    }
}

impl RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        })
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET".to_string()))?,
            expiry_hours: parse_or("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?,
            refresh_token_expiry_days: parse_or(
                "REFRESH_TOKEN_EXPIRY_DAYS",
                DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS,
            )?,
        })
    }
}

impl VerificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            code_ttl_secs: parse_or("VERIFICATION_CODE_TTL_SECS", DEFAULT_VERIFICATION_CODE_TTL_SECS)?,
            max_attempts: parse_or("VERIFICATION_MAX_ATTEMPTS", DEFAULT_VERIFICATION_MAX_ATTEMPTS)?,
            resend_cooldown_secs: parse_or(
                "VERIFICATION_RESEND_COOLDOWN_SECS",
                DEFAULT_VERIFICATION_RESEND_COOLDOWN_SECS,
            )?,
            sms_webhook_url: env::var("SMS_WEBHOOK_URL").ok().filter(|url| !url.is_empty()),
        };

        if config.code_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue("VERIFICATION_CODE_TTL_SECS".to_string()));
        }
        if config.max_attempts == 0 {
            return Err(ConfigError::InvalidValue("VERIFICATION_MAX_ATTEMPTS".to_string()));
        }

        Ok(config)
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
