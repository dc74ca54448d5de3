//! Configuration loading, validation, and management for Deskmate.
//!
//! Settings are resolved in layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`./deskmate.toml`, or `$DESKMATE_CONFIG`)
//! 3. Environment variables (`OPENAI_API_KEY`, `MODEL_NAME`, ...)
//!
//! The binary loads a `.env` file into the process environment before this
//! runs, so `.env` values behave like environment variables.

use deskmate_core::ModelParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "deskmate.toml";

/// The root configuration structure.
///
/// Maps directly to `deskmate.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API credential. Required before a session can start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// How many recent turns are sent to the model. Zero or negative
    /// disables conversational memory for the model (history is still saved).
    #[serde(default = "default_max_turns_to_keep")]
    pub max_turns_to_keep: i64,

    /// HTTP timeout for a single completion call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Chat widget server
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_output_tokens() -> u32 {
    250
}
fn default_max_turns_to_keep() -> i64 {
    8
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_turns_to_keep", &self.max_turns_to_keep)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("paths", &self.paths)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// System prompt template
    #[serde(default = "default_template_path")]
    pub template: PathBuf,

    /// Persisted conversation history
    #[serde(default = "default_history_path")]
    pub history: PathBuf,
}

fn default_template_path() -> PathBuf {
    PathBuf::from("prompts").join("system_prompt.txt")
}
fn default_history_path() -> PathBuf {
    PathBuf::from("memory").join("history.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template: default_template_path(),
            history: default_history_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file and the process environment.
    ///
    /// API key lookup order:
    /// - `DESKMATE_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    /// - `api_key` in the config file
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// The config file location: `$DESKMATE_CONFIG`, else `./deskmate.toml`.
    pub fn config_path() -> PathBuf {
        std::env::var_os("DESKMATE_CONFIG")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.api_key = normalize_secret(config.api_key.take());

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Values are whitespace-trimmed; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = get("DESKMATE_API_KEY").or_else(|| get("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.api_url = url;
        }
        if let Some(model) = get("MODEL_NAME") {
            self.model = model;
        }
        if let Some(raw) = get("MAX_TURNS_TO_KEEP") {
            self.max_turns_to_keep = parse_var("MAX_TURNS_TO_KEEP", &raw)?;
        }
        if let Some(raw) = get("MAX_OUTPUT_TOKENS") {
            self.max_output_tokens = parse_var("MAX_OUTPUT_TOKENS", &raw)?;
        }
        if let Some(raw) = get("TEMPERATURE") {
            self.temperature = parse_var("TEMPERATURE", &raw)?;
        }
        if let Some(path) = get("DESKMATE_TEMPLATE_PATH") {
            self.paths.template = PathBuf::from(path);
        }
        if let Some(path) = get("DESKMATE_HISTORY_PATH") {
            self.paths.history = PathBuf::from(path);
        }
        if let Some(host) = get("DESKMATE_GATEWAY_HOST") {
            self.gateway.host = host;
        }
        if let Some(raw) = get("DESKMATE_GATEWAY_PORT") {
            self.gateway.port = parse_var("DESKMATE_GATEWAY_PORT", &raw)?;
        }

        Ok(())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be a non-negative number".into(),
            ));
        }

        if self.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_output_tokens must be greater than 0".into(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        Ok(())
    }

    /// The API credential, or `MissingApiKey` if none was configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.require_api_key().is_ok()
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_output_tokens,
        }
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Blank secrets are treated as absent.
fn normalize_secret(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            max_turns_to_keep: default_max_turns_to_keep(),
            request_timeout_secs: default_request_timeout_secs(),
            paths: PathsConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("OPENAI_API_KEY not found. Create a .env file with OPENAI_API_KEY=...")]
    MissingApiKey,
}
