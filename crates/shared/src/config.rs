//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Exchange-rate provider configuration.
    #[serde(default)]
    pub currency: CurrencyConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Requests one client may send to the approval routes per window.
    #[serde(default = "default_approval_rate_limit")]
    pub approval_rate_limit: usize,
    /// Length of the approval rate-limit window in seconds.
    #[serde(default = "default_approval_rate_window")]
    pub approval_rate_window_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            approval_rate_limit: default_approval_rate_limit(),
            approval_rate_window_secs: default_approval_rate_window(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_approval_rate_limit() -> usize {
    100
}

fn default_approval_rate_window() -> u64 {
    900 // 15 minutes
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    86400 // 24 hours
}

/// Exchange-rate provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    /// Base URL of the rates API; the base currency code is appended as a path segment.
    #[serde(default = "default_currency_api_url")]
    pub api_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_currency_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            api_url: default_currency_api_url(),
            timeout_ms: default_currency_timeout_ms(),
        }
    }
}

fn default_currency_api_url() -> String {
    "https://api.exchangerate-api.com/v4/latest".to_string()
}

fn default_currency_timeout_ms() -> u64 {
    5000
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("EXPENSA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("EXPENSA__DATABASE__URL", Some("postgres://localhost/expensa")),
                ("EXPENSA__JWT__SECRET", Some("secret")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/expensa");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.jwt.secret, "secret");
                assert_eq!(config.jwt.access_token_expiry_secs, 86400);
                assert_eq!(config.server.port, 5000);
                assert_eq!(config.server.approval_rate_limit, 100);
                assert_eq!(config.server.approval_rate_window_secs, 900);
                assert_eq!(config.currency.timeout_ms, 5000);
            },
        );
    }

    #[test]
    fn test_load_fails_without_database_url() {
        temp_env::with_vars(
            [
                ("EXPENSA__DATABASE__URL", None::<&str>),
                ("EXPENSA__JWT__SECRET", Some("secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
