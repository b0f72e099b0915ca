//! Configuration management for the essay grader.
//!
//! Loads settings from `~/.config/essay-grader/config.toml` with environment
//! overrides. Built once at startup and handed to the router; handlers never
//! read the environment themselves.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_STRIPE_BASE_URL: &str = "https://api.stripe.com";

// Quota constants (single source of truth)
pub const DEFAULT_REQUESTS_PER_WINDOW: u32 = 3;
pub const DEFAULT_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
    #[serde(default)]
    pub grading: GradingConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ApiKeysConfig {
    #[serde(default)]
    pub openai: Option<String>,
    #[serde(default)]
    pub stripe_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradingConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingConfig {
    /// Subscription price; checkout is disabled while this is unset.
    #[serde(default)]
    pub price_id: Option<String>,
    #[serde(default = "default_success_url")]
    pub success_url: String,
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,
    #[serde(default = "default_stripe_base_url")]
    pub stripe_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests")]
    pub requests: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_verbosity")]
    pub log_verbosity: LogVerbosity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogVerbosity {
    Minimal,
    #[default]
    Compact,
    Verbose,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 81 }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_openai_base_url() -> String { DEFAULT_OPENAI_BASE_URL.to_string() }
fn default_success_url() -> String { "http://localhost:81/success".to_string() }
fn default_cancel_url() -> String { "http://localhost:81/".to_string() }
fn default_stripe_base_url() -> String { DEFAULT_STRIPE_BASE_URL.to_string() }
fn default_requests() -> u32 { DEFAULT_REQUESTS_PER_WINDOW }
fn default_window_secs() -> u64 { DEFAULT_WINDOW_SECS }
fn default_verbosity() -> LogVerbosity { LogVerbosity::Compact }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            openai_base_url: default_openai_base_url(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            price_id: None,
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
            stripe_base_url: default_stripe_base_url(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: default_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_verbosity: default_verbosity(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("essay-grader")
            .join("config.toml")
    }

    /// Load config from file, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())
    }

    /// Load config from a specific path.
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.api_keys.openai = Some(key);
        }
        if let Ok(key) = std::env::var("STRIPE_SECRET_KEY") {
            self.api_keys.stripe_secret = Some(key);
        }
        if let Ok(price) = std::env::var("STRIPE_PRICE_ID") {
            self.billing.price_id = Some(price);
        }
        if let Ok(model) = std::env::var("ESSAY_GRADER_MODEL") {
            self.grading.model = model;
        }
        if let Ok(val) = std::env::var("ESSAY_GRADER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        self
    }

    /// Check that the keys both providers need are present.
    ///
    /// The price id is optional; without it only checkout is unavailable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_blank(&self.api_keys.openai) {
            return Err(ConfigError::MissingKey("OPENAI_API_KEY"));
        }
        if is_blank(&self.api_keys.stripe_secret) {
            return Err(ConfigError::MissingKey("STRIPE_SECRET_KEY"));
        }
        Ok(())
    }

    /// Configured price id, treating an empty string as unset.
    pub fn price_id(&self) -> Option<&str> {
        self.billing
            .price_id
            .as_deref()
            .filter(|price| !price.is_empty())
    }

    /// Copy of this config with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |key: &Option<String>| key.as_ref().map(|_| "********".to_string());
        let mut shown = self.clone();
        shown.api_keys.openai = mask(&self.api_keys.openai);
        shown.api_keys.stripe_secret = mask(&self.api_keys.stripe_secret);
        shown
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(&path, content).map_err(ConfigError::Io)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    MissingKey(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Serialize error: {}", e),
            ConfigError::MissingKey(var) => write!(f, "Missing required setting: {}", var),
        }
    }
}

impl std::error::Error for ConfigError {}
