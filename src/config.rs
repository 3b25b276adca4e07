use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Application configuration, layered from `config/default.toml`, an
/// environment-specific file, and `APP_*` environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL (postgres or sqlite)
    #[validate(length(min = 1, message = "database_url is required"))]
    pub database_url: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name ("development", "production", "test")
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Tracing filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub log_json: bool,

    /// Run pending migrations on startup
    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,

    /// Comma-separated list of allowed CORS origins; empty allows any
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_true() -> bool {
    true
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            db_max_connections: default_max_connections(),
            db_min_connections: default_min_connections(),
            cors_allowed_origins: None,
        }
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Loads configuration from files and environment.
///
/// Later sources win: `config/default.toml`, then
/// `config/{APP_ENVIRONMENT}.toml`, then `APP_*` variables
/// (`APP_DATABASE_URL`, `APP_PORT`, ...).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment =
        std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let config = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
        .add_source(Environment::with_prefix("APP"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

/// Installs the global tracing subscriber.
pub fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert!(!cfg.is_production());
    }

    #[test]
    fn empty_database_url_is_rejected() {
        let cfg = AppConfig {
            database_url: String::new(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
