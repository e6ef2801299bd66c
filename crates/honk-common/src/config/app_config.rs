//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file).

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub presence: PresenceConfig,
    pub store: StoreConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
    /// Explicit display name; a random one is picked when absent
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Debounce windows of the two presence trackers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "default_local_debounce_ms")]
    pub local_debounce_ms: u64,
    #[serde(default = "default_remote_debounce_ms")]
    pub remote_debounce_ms: u64,
}

impl PresenceConfig {
    #[must_use]
    pub fn local_debounce(&self) -> Duration {
        Duration::from_millis(self.local_debounce_ms)
    }

    #[must_use]
    pub fn remote_debounce(&self) -> Duration {
        Duration::from_millis(self.remote_debounce_ms)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            local_debounce_ms: default_local_debounce_ms(),
            remote_debounce_ms: default_remote_debounce_ms(),
        }
    }
}

/// Which collaborative store adapter to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Required when `backend` is `redis`
    #[serde(default)]
    pub redis: Option<RedisConfig>,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

// Default value functions
fn default_app_name() -> String {
    "honk-chat".to_string()
}

fn default_local_debounce_ms() -> u64 {
    3000
}

fn default_remote_debounce_ms() -> u64 {
    2000
}

fn default_redis_max_connections() -> u32 {
    10
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a value is malformed or a required one is missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = AppSettings {
            name: lookup("APP_NAME").unwrap_or_else(default_app_name),
            env: match lookup("APP_ENV") {
                Some(raw) => parse_environment(&raw)?,
                None => Environment::default(),
            },
            display_name: lookup("HONK_DISPLAY_NAME").filter(|s| !s.trim().is_empty()),
            log_format: match lookup("LOG_FORMAT") {
                Some(raw) => parse_log_format(&raw)?,
                None => LogFormat::default(),
            },
        };

        let presence = PresenceConfig {
            local_debounce_ms: parse_debounce(&lookup, "HONK_LOCAL_DEBOUNCE_MS")?
                .unwrap_or_else(default_local_debounce_ms),
            remote_debounce_ms: parse_debounce(&lookup, "HONK_REMOTE_DEBOUNCE_MS")?
                .unwrap_or_else(default_remote_debounce_ms),
        };

        let backend = match lookup("HONK_STORE") {
            Some(raw) => parse_backend(&raw)?,
            None => StoreBackend::default(),
        };

        let redis = match lookup("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: lookup("REDIS_MAX_CONNECTIONS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_redis_max_connections),
            }),
            None if backend == StoreBackend::Redis => {
                return Err(ConfigError::MissingVar("REDIS_URL"));
            }
            None => None,
        };

        Ok(Self {
            app,
            presence,
            store: StoreConfig { backend, redis },
        })
    }
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw.to_lowercase().as_str() {
        "production" => Ok(Environment::Production),
        "staging" => Ok(Environment::Staging),
        "development" => Ok(Environment::Development),
        _ => Err(ConfigError::InvalidValue("APP_ENV", raw.to_string())),
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat, ConfigError> {
    match raw.to_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        _ => Err(ConfigError::InvalidValue("LOG_FORMAT", raw.to_string())),
    }
}

fn parse_backend(raw: &str) -> Result<StoreBackend, ConfigError> {
    match raw.to_lowercase().as_str() {
        "memory" => Ok(StoreBackend::Memory),
        "redis" => Ok(StoreBackend::Redis),
        _ => Err(ConfigError::InvalidValue("HONK_STORE", raw.to_string())),
    }
}

/// Debounce windows must parse and be positive
fn parse_debounce<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let parsed = raw.trim().parse::<u64>();
    match parsed {
        Ok(ms) if ms > 0 => Ok(Some(ms)),
        _ => Err(ConfigError::InvalidValue(key, raw)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
