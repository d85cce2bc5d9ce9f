//! API server configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. `config/stockfast.toml` (optional)
//! 3. Environment variables prefixed `STOCKFAST_`, nested with `__`
//!    (e.g. `STOCKFAST_AUTH__JWT_SECRET`, `STOCKFAST_SERVER__PORT`)

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use stockfast_core::query::PageLimits;
use stockfast_db::DbConfig;

const CONFIG_FILE: &str = "config/stockfast";
const ENV_PREFIX: &str = "STOCKFAST";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub qr: QrConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, created on first start.
    pub path: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: "data/stockfast.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. MUST be overridden in production.
    pub jwt_secret: String,
    /// Session token lifetime in seconds (default: 7 days).
    pub session_lifetime_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            jwt_secret: "stockfast-dev-secret-change-in-production".to_string(),
            session_lifetime_secs: 7 * 24 * 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    /// Prefix of the product link embedded in QR payloads.
    pub base_url: String,
    /// Minimum edge of the rendered PNG in pixels.
    pub size_px: u32,
}

impl Default for QrConfig {
    fn default() -> Self {
        QrConfig {
            base_url: "/products".to_string(),
            size_px: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub search_default_limit: u32,
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            default_limit: 10,
            search_default_limit: 20,
            max_limit: 100,
        }
    }
}

impl PaginationConfig {
    /// Limits of the catalogue listing.
    pub fn list_limits(&self) -> PageLimits {
        PageLimits {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }

    /// Limits of the advanced search.
    pub fn search_limits(&self) -> PageLimits {
        PageLimits {
            default_limit: self.search_default_limit,
            max_limit: self.max_limit,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the optional file, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port".to_string()));
        }
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database.path".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".to_string()));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
        }
        if self.auth.session_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("auth.session_lifetime_secs".to_string()));
        }
        if self.qr.size_px == 0 {
            return Err(ConfigError::InvalidValue("qr.size_px".to_string()));
        }
        let p = &self.pagination;
        if p.default_limit == 0 || p.search_default_limit == 0 || p.max_limit == 0 {
            return Err(ConfigError::InvalidValue("pagination".to_string()));
        }
        Ok(())
    }

    /// Database settings in the form the pool expects.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.session_lifetime_secs, 604_800);
        assert_eq!(config.pagination.list_limits().default_limit, 10);
        assert_eq!(config.pagination.search_limits().default_limit, 20);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_rejects_empty_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut config = AppConfig::default();
        config.pagination.max_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }
}
