//! Service Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional file,
//! then `CARDIO__`-prefixed environment variables
//! (e.g. `CARDIO__AUTH__SECRET_KEY`, `CARDIO__MODELS__ACUTE_PATH`).

use alerting::{AlertConfig, SmsConfig};
use config::{Config, ConfigError, Environment, File};
use inference_engine::ModelPaths;
use serde::{Deserialize, Serialize};
use user_auth::TokenConfig;

use crate::rate_limit::RateLimitConfig;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "CARDIO_CONFIG";

/// Config file used when `CARDIO_CONFIG` is unset (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config/cardio";

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// trace, debug, info, warn or error
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
    /// Install the Prometheus recorder and serve /metrics
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            metrics: true,
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://cardio.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: TokenConfig,
    pub models: ModelPaths,
    pub sms: SmsConfig,
    pub alerts: AlertConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load from `CARDIO_CONFIG` (or the default path) plus the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file (missing is fine) plus the environment
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("CARDIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load_from("/nonexistent/cardio").unwrap();
        assert_eq!(config.auth.access_token_expire_minutes, 30);
        assert_eq!(config.alerts.threshold, 0.5);
        assert!(config.models.acute_path.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("cardio-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nbind_addr = \"127.0.0.1:9000\"\n\n[models]\nacute_path = \"models/model_uci.onnx\"\n\n[rate_limit]\nenabled = false"
        )
        .unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(
            config.models.acute_path.as_deref(),
            Some(std::path::Path::new("models/model_uci.onnx"))
        );
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.database.max_connections, 5);
    }
}
