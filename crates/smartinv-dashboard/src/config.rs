//! Dashboard configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `SMART_INVENTORY_*` environment variables.
//!
//! ```toml
//! [api]
//! base_url = "http://pi.local:8000"
//! token = "ui-secret"
//!
//! [polling]
//! interval_ms = 15000
//! request_timeout_ms = 10000
//!
//! [cache]
//! enabled = true
//! path = "/var/lib/smart-inventory/cache.db"
//!
//! [history]
//! range = "7d"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use smartinv_types::HistoryRange;

/// Path of a TOML file to load instead of the default location.
pub const ENV_CONFIG: &str = "SMART_INVENTORY_CONFIG";
pub const ENV_API_BASE_URL: &str = "SMART_INVENTORY_API_BASE_URL";
pub const ENV_UI_TOKEN: &str = "SMART_INVENTORY_UI_TOKEN";
pub const ENV_POLL_INTERVAL_MS: &str = "SMART_INVENTORY_POLL_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "SMART_INVENTORY_REQUEST_TIMEOUT_MS";
pub const ENV_CACHE_PATH: &str = "SMART_INVENTORY_CACHE_PATH";
pub const ENV_CACHE_ENABLED: &str = "SMART_INVENTORY_CACHE_ENABLED";
pub const ENV_HISTORY_RANGE: &str = "SMART_INVENTORY_HISTORY_RANGE";

/// Minimum poll interval in milliseconds (1 second).
pub const MIN_POLL_INTERVAL_MS: u64 = 1_000;
/// Maximum poll interval in milliseconds (1 hour).
pub const MAX_POLL_INTERVAL_MS: u64 = 3_600_000;
/// Minimum request timeout in milliseconds.
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds (5 minutes).
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 300_000;

/// Dashboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inventory service connection.
    pub api: ApiConfig,
    /// Background refresh timer.
    pub polling: PollingConfig,
    /// Durable cache.
    pub cache: CacheConfig,
    /// Detail history.
    pub history: HistoryConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if it is missing.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the file named by [`ENV_CONFIG`] (or the default file), then
    /// apply variable overrides from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_CONFIG).filter(|p| !p.is_empty()) {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?,
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Apply `SMART_INVENTORY_*` overrides.
    ///
    /// An empty token disables authentication.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_UI_TOKEN) {
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(value) = lookup(ENV_POLL_INTERVAL_MS) {
            self.polling.interval_ms = parse_millis(ENV_POLL_INTERVAL_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            self.polling.request_timeout_ms = parse_millis(ENV_REQUEST_TIMEOUT_MS, &value)?;
        }
        if let Some(path) = lookup(ENV_CACHE_PATH) {
            self.cache.path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_CACHE_ENABLED) {
            self.cache.enabled = parse_flag(&value).ok_or_else(|| ConfigError::Env {
                var: ENV_CACHE_ENABLED,
                value: value.clone(),
                message: "expected true/false".to_string(),
            })?;
        }
        if let Some(range) = lookup(ENV_HISTORY_RANGE) {
            self.history.range = range;
        }
        Ok(())
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - The API base URL is http(s)
    /// - The poll interval is between 1 second and 1 hour
    /// - The request timeout is between 100 ms and 5 minutes
    /// - The cache path is set when the cache is enabled
    /// - The history range parses
    ///
    /// # Example
    ///
    /// ```
    /// use smartinv_dashboard::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.api.validate());
        errors.extend(self.polling.validate());
        errors.extend(self.cache.validate());
        errors.extend(self.history.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// History range for detail fetches. Falls back to the default when the
    /// configured value does not parse; [`validate`](Self::validate) reports that.
    pub fn history_range(&self) -> HistoryRange {
        self.history.range.parse().unwrap_or_default()
    }
}

fn parse_millis(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var,
        value: value.to_string(),
        message: "expected a number of milliseconds".to_string(),
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Inventory service connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Service root (e.g., "http://localhost:8000").
    pub base_url: String,
    /// Static bearer credential.
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.base_url.is_empty() {
            errors.push(ValidationError {
                field: "api.base_url".to_string(),
                message: "base URL cannot be empty".to_string(),
            });
        } else if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://")
        {
            errors.push(ValidationError {
                field: "api.base_url".to_string(),
                message: format!(
                    "'{}' must start with http:// or https://",
                    self.base_url
                ),
            });
        }

        errors
    }
}

/// Background refresh timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between silent refreshes, in milliseconds.
    pub interval_ms: u64,
    /// How long one cycle's requests may take before the cycle fails.
    pub request_timeout_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 15_000,
            request_timeout_ms: 10_000,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.interval_ms < MIN_POLL_INTERVAL_MS {
            errors.push(ValidationError {
                field: "polling.interval_ms".to_string(),
                message: format!(
                    "poll interval {} is too short (minimum {} ms)",
                    self.interval_ms, MIN_POLL_INTERVAL_MS
                ),
            });
        } else if self.interval_ms > MAX_POLL_INTERVAL_MS {
            errors.push(ValidationError {
                field: "polling.interval_ms".to_string(),
                message: format!(
                    "poll interval {} is too long (maximum {} ms / 1 hour)",
                    self.interval_ms, MAX_POLL_INTERVAL_MS
                ),
            });
        }

        if !(MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS).contains(&self.request_timeout_ms) {
            errors.push(ValidationError {
                field: "polling.request_timeout_ms".to_string(),
                message: format!(
                    "request timeout {} must be between {} and {} ms",
                    self.request_timeout_ms, MIN_REQUEST_TIMEOUT_MS, MAX_REQUEST_TIMEOUT_MS
                ),
            });
        }

        errors
    }
}

/// Durable cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether to seed from and write to the cache.
    pub enabled: bool,
    /// Database file path.
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: smartinv_store::default_cache_path(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.enabled && self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "cache.path".to_string(),
                message: "cache path cannot be empty while the cache is enabled".to_string(),
            });
        }

        errors
    }
}

/// Detail history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Window such as "24h" or "7d".
    pub range: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            range: HistoryRange::default().to_string(),
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        match self.range.parse::<HistoryRange>() {
            Ok(_) => Vec::new(),
            Err(e) => vec![ValidationError {
                field: "history.range".to_string(),
                message: e.to_string(),
            }],
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value '{value}' for {var}: {message}")]
    Env {
        var: &'static str,
        value: String,
        message: String,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `polling.interval_ms`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("smart-inventory")
        .join("dashboard.toml")
}
