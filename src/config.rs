//! Configuration management for Astrai
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::content::Locale;
use crate::error::{AstraiError, Result};
use crate::resilience::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Astrai
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Conversation settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Daily content pipeline settings
    #[serde(default)]
    pub content: ContentConfig,

    /// Persistent store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Display language for prompts and generated content
    #[serde(default)]
    pub locale: Locale,
}

/// Gemini gateway configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API key; usually supplied through the environment
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the generative language API (overridable for tests)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Optional per-request timeout; no timeout when unset
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            request_timeout_seconds: None,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

/// Conversation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    /// Model used for conversational rounds
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// How long the tool indicator stays lit after a turn
    #[serde(default = "default_tool_cooldown_ms")]
    pub tool_cooldown_ms: u64,

    /// Delay before a navigation request is applied
    #[serde(default = "default_navigation_delay_ms")]
    pub navigation_delay_ms: u64,
}

fn default_chat_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_tool_cooldown_ms() -> u64 {
    2000
}

fn default_navigation_delay_ms() -> u64 {
    1500
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            tool_cooldown_ms: default_tool_cooldown_ms(),
            navigation_delay_ms: default_navigation_delay_ms(),
        }
    }
}

/// Daily content configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentConfig {
    /// Prefix of every cache key
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Model used for the search-grounded daily briefing
    #[serde(default = "default_news_model")]
    pub news_model: String,

    /// Model used to expand a post into a full article
    #[serde(default = "default_article_model")]
    pub article_model: String,

    /// Model used for the deep insight
    #[serde(default = "default_insight_model")]
    pub insight_model: String,

    /// Model tried once when the insight model reports a transport failure
    #[serde(default = "default_insight_fallback_model")]
    pub insight_fallback_model: String,

    /// Retry policy for transient gateway failures
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_namespace() -> String {
    "astrai_daily_news".to_string()
}

fn default_news_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_article_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_insight_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_insight_fallback_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            news_model: default_news_model(),
            article_model: default_article_model(),
            insight_model: default_insight_model(),
            insight_fallback_model: default_insight_fallback_model(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory of the sled database; platform data dir when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the database directory
    ///
    /// # Errors
    ///
    /// Returns error if no path is configured and the platform has no
    /// data directory
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        directories::ProjectDirs::from("tech", "astrai", "astrai")
            .map(|dirs| dirs.data_dir().join("content.sled"))
            .ok_or_else(|| {
                AstraiError::Config("Could not determine a data directory".to_string()).into()
            })
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AstraiError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AstraiError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        let key = ["ASTRAI_API_KEY", "GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|name| {
                std::env::var(name)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (*name, v))
            });
        if let Some((name, value)) = key {
            self.gateway.api_key = Some(value);
            tracing::debug!("Env override: gateway.api_key from {}", name);
        }

        if let Ok(api_base) = std::env::var("ASTRAI_API_BASE") {
            self.gateway.api_base = api_base;
        }

        if let Ok(timeout) = std::env::var("ASTRAI_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.gateway.request_timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid ASTRAI_REQUEST_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(model) = std::env::var("ASTRAI_CHAT_MODEL") {
            self.chat.model = model;
        }

        if let Ok(model) = std::env::var("ASTRAI_NEWS_MODEL") {
            self.content.news_model = model;
        }

        if let Ok(model) = std::env::var("ASTRAI_INSIGHT_MODEL") {
            self.content.insight_model = model;
        }

        if let Ok(retries) = std::env::var("ASTRAI_MAX_RETRIES") {
            if let Ok(value) = retries.parse() {
                self.content.retry.max_retries = value;
            } else {
                tracing::warn!("Invalid ASTRAI_MAX_RETRIES: {}", retries);
            }
        }

        if let Ok(path) = std::env::var("ASTRAI_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(locale) = std::env::var("ASTRAI_LOCALE") {
            match locale.parse() {
                Ok(value) => self.locale = value,
                Err(_) => tracing::warn!("Invalid ASTRAI_LOCALE: {}", locale),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(locale) = &cli.locale {
            match locale.parse() {
                Ok(value) => self.locale = value,
                Err(_) => tracing::warn!("Ignoring unknown --locale {}", locale),
            }
        }

        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// The API key is not checked here; a missing key surfaces as
    /// missing credentials when the gateway is built.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.gateway.api_base).is_err() {
            return Err(AstraiError::Config(format!(
                "gateway.api_base is not a valid URL: {}",
                self.gateway.api_base
            ))
            .into());
        }

        if self.gateway.request_timeout_seconds == Some(0) {
            return Err(AstraiError::Config(
                "gateway.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        let models = [
            ("chat.model", &self.chat.model),
            ("content.news_model", &self.content.news_model),
            ("content.article_model", &self.content.article_model),
            ("content.insight_model", &self.content.insight_model),
            (
                "content.insight_fallback_model",
                &self.content.insight_fallback_model,
            ),
        ];
        for (field, value) in models {
            if value.trim().is_empty() {
                return Err(AstraiError::Config(format!("{} cannot be empty", field)).into());
            }
        }

        if self.content.namespace.trim().is_empty() {
            return Err(
                AstraiError::Config("content.namespace cannot be empty".to_string()).into(),
            );
        }

        if self.content.retry.max_retries > 10 {
            return Err(AstraiError::Config(
                "content.retry.max_retries must be less than or equal to 10".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
