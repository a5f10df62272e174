//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cubejs::MatchPolicy;
use crate::indicators::IndicatorSet;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub indicators: IndicatorsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream service endpoints and credential
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the data.gouv.fr tabular API
    #[serde(default = "default_tabular_url")]
    pub tabular_base_url: String,

    /// Base URL of the indicator hub (CubeJS)
    #[serde(default = "default_indicateurs_url")]
    pub indicateurs_base_url: String,

    /// Bearer token for the indicator hub. Callers may also supply one
    /// per request; this value is the fallback.
    pub token: Option<String>,
}

fn default_tabular_url() -> String {
    "https://tabular-api.data.gouv.fr/api".to_string()
}

fn default_indicateurs_url() -> String {
    "https://api.indicateurs.ecologie.gouv.fr".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            tabular_base_url: default_tabular_url(),
            indicateurs_base_url: default_indicateurs_url(),
            token: None,
        }
    }
}

/// Fixed-indicator aggregate route configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndicatorsConfig {
    /// Commune matching policy: "exact" or "substring"
    #[serde(default)]
    pub match_policy: MatchPolicy,

    /// Indicator catalog variant: "full" (5 categories) or "core" (2)
    #[serde(default)]
    pub set: IndicatorSet,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("ecologie-api").join("config.toml")),
            Some(PathBuf::from("/etc/ecologie-api/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(host) = std::env::var("ECOLOGIE_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("ECOLOGIE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Upstream overrides
        if let Ok(url) = std::env::var("ECOLOGIE_TABULAR_URL") {
            self.upstream.tabular_base_url = url;
        }
        if let Ok(url) = std::env::var("ECOLOGIE_INDICATEURS_URL") {
            self.upstream.indicateurs_base_url = url;
        }
        if let Ok(token) = std::env::var("ECOLOGIE_TOKEN") {
            if !token.is_empty() {
                self.upstream.token = Some(token);
            }
        }

        // Indicator route overrides
        if let Ok(policy) = std::env::var("ECOLOGIE_MATCH_POLICY") {
            if let Some(p) = MatchPolicy::parse(&policy) {
                self.indicators.match_policy = p;
            }
        }
        if let Ok(set) = std::env::var("ECOLOGIE_INDICATOR_SET") {
            if let Some(s) = IndicatorSet::parse(&set) {
                self.indicators.set = s;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("ECOLOGIE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ECOLOGIE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Ecologie API Configuration
#
# Environment variables override these settings:
# - ECOLOGIE_API_HOST
# - ECOLOGIE_API_PORT
# - ECOLOGIE_TABULAR_URL
# - ECOLOGIE_INDICATEURS_URL
# - ECOLOGIE_TOKEN
# - ECOLOGIE_MATCH_POLICY
# - ECOLOGIE_INDICATOR_SET
# - ECOLOGIE_LOG_LEVEL
# - ECOLOGIE_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8000

[upstream]
# data.gouv.fr tabular API
tabular_base_url = "https://tabular-api.data.gouv.fr/api"

# Indicator hub (CubeJS)
indicateurs_base_url = "https://api.indicateurs.ecologie.gouv.fr"

# Bearer token for the indicator hub (request one via the hub's form).
# Callers may also pass ?token= per request.
# token = ""

[indicators]
# Commune matching policy for /indicateurs: "exact" or "substring"
match_policy = "exact"

# Indicator catalog: "full" (5 categories) or "core" (2)
set = "full"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
