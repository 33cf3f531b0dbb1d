//! Chirpy Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token signing and partner keys
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "API_PORT".to_string(),
                value: port,
            })?;
        }
        if let Ok(platform) = std::env::var("PLATFORM") {
            self.server.platform = platform.parse()?;
        }
        if let Ok(root) = std::env::var("FILESERVER_ROOT") {
            self.server.fileserver_root = PathBuf::from(root);
        }

        // PostgreSQL
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = Some(url).filter(|u| !u.is_empty());
        }

        // Secrets
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(key) = std::env::var("POLKA_KEY") {
            self.auth.polka_key = key;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            self.logging.json_format = matches!(json.as_str(), "1" | "true" | "yes");
        }

        Ok(self)
    }

    /// Reject configurations the server must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        Ok(())
    }
}

/// Deployment platform
///
/// Destructive admin operations are only available on `Dev`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    #[default]
    Production,
}

impl Platform {
    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl std::str::FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidValue {
                key: "PLATFORM".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Deployment platform
    pub platform: Platform,

    /// Directory served under `/app`
    pub fileserver_root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            platform: Platform::Production,
            fileserver_root: PathBuf::from("."),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; the in-memory store is used when unset
    pub url: Option<String>,

    /// PostgreSQL connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

/// Secrets used by the authentication layer
///
/// Loaded once at startup and read-only afterwards.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub jwt_secret: String,

    /// Static key expected from the payment partner's webhooks
    pub polka_key: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, polka_key: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            polka_key: polka_key.into(),
        }
    }
}

// Keep secrets out of debug logs
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("polka_key", &"<redacted>")
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.platform, Platform::Production);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("dev".parse::<Platform>().unwrap(), Platform::Dev);
        assert_eq!("PRODUCTION".parse::<Platform>().unwrap(), Platform::Production);
        assert!("staging".parse::<Platform>().is_err());
    }

    #[test]
    fn test_validate_requires_secret() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));

        config.auth.jwt_secret = "s3cr3t".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_config_debug_redacts_secrets() {
        let auth = AuthConfig::new("super-secret", "partner-key");
        let debug = format!("{auth:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("partner-key"));
    }

    #[test]
    fn test_parse_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            platform = "dev"
            fileserver_root = "./public"

            [auth]
            jwt_secret = "abc"
            polka_key = "def"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(config.server.platform.is_dev());
        assert_eq!(config.auth.polka_key, "def");
        assert_eq!(config.database.max_connections, 10);
    }
}
