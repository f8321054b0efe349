use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "AGRI_CONFIG";

/// Upper bound on the articles the news endpoint returns.
pub const MAX_NEWS_ARTICLES: usize = 10;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a summary of all errors, joined with `; `
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub tasks: TasksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind, e.g. `0.0.0.0`
    pub host: String,

    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the SQLite document database
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agri-assist")
            .join("documents.db");
        Self {
            database_path: path.to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather API root
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Name of the secret holding the API key
    #[serde(default = "default_api_key_secret")]
    pub api_key_secret: String,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_api_key_secret() -> String {
    "OPENWEATHER_API_KEY".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key_secret: default_api_key_secret(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Feed URLs in priority order
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,

    /// Entries taken from a single feed
    #[serde(default = "default_per_feed_limit")]
    pub per_feed_limit: usize,

    /// Cap on the returned list
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_feeds() -> Vec<String> {
    vec![
        "https://krishijagran.com/rss/news/".to_string(),
        "https://www.feedspot.com/infiniterss.php?_src=feed_title&followfeedid=4858156"
            .to_string(),
    ]
}

fn default_per_feed_limit() -> usize {
    5
}

fn default_max_articles() -> usize {
    MAX_NEWS_ARTICLES
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            per_feed_limit: default_per_feed_limit(),
            max_articles: default_max_articles(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// What task listing does when the store fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListFailurePolicy {
    /// Log and return an empty list
    #[default]
    FailOpen,
    /// Surface the failure as a server error
    FailClosed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TasksConfig {
    #[serde(default)]
    pub list_failure_policy: ListFailurePolicy,
}

impl Config {
    /// Load configuration from the default location (or `AGRI_CONFIG`),
    /// creating a default file if it doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path, creating it if missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors abort loading.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.host.trim().is_empty() {
            result.add_error("server.host", "Host cannot be empty");
        }
        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if self.storage.database_path.trim().is_empty() {
            result.add_error("storage.database_path", "Database path cannot be empty");
        }

        validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        }
        if self.weather.api_key_secret.trim().is_empty() {
            result.add_error("weather.api_key_secret", "Secret name cannot be empty");
        }

        if self.news.feeds.is_empty() {
            result.add_warning("news.feeds", "No feeds configured - fallback news only");
        }
        for (i, feed) in self.news.feeds.iter().enumerate() {
            validate_url(feed, &format!("news.feeds[{}]", i), &mut result);
        }
        if self.news.per_feed_limit == 0 {
            result.add_error("news.per_feed_limit", "Per-feed limit must be at least 1");
        }
        if !(1..=MAX_NEWS_ARTICLES).contains(&self.news.max_articles) {
            result.add_error(
                "news.max_articles",
                format!("Must be between 1 and {}", MAX_NEWS_ARTICLES),
            );
        }
        if self.news.timeout_secs == 0 {
            result.add_error("news.timeout_secs", "Timeout must be greater than 0");
        }

        result
    }

    /// Save configuration to the given path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("agri-assist");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.weather.timeout_secs, 10);
        assert_eq!(config.news.per_feed_limit, 5);
        assert_eq!(config.news.max_articles, 10);
        assert_eq!(config.news.feeds.len(), 2);
        assert_eq!(config.tasks.list_failure_policy, ListFailurePolicy::FailOpen);
    }

    #[test]
    fn test_invalid_feed_url() {
        let mut config = Config::default();
        config.news.feeds.push("not-a-url".to_string());
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "news.feeds[2]"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.base_url = "ftp://api.example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "server.port"));
    }

    #[test]
    fn test_empty_feeds_is_warning() {
        let mut config = Config::default();
        config.news.feeds.clear();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "news.feeds"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [tasks]
            list_failure_policy = "fail_closed"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(!config.storage.database_path.is_empty());
        assert_eq!(config.tasks.list_failure_policy, ListFailurePolicy::FailClosed);
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org");
        assert_eq!(config.news.max_articles, 10);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 8000);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.news.feeds, config.news.feeds);
    }

    #[test]
    fn test_max_articles_bounds() {
        let mut config = Config::default();
        config.news.max_articles = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "news.max_articles"));

        config.news.max_articles = 50;
        assert!(!config.validate().is_valid());

        config.news.max_articles = 1;
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_zero_per_feed_limit() {
        let mut config = Config::default();
        config.news.per_feed_limit = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "news.per_feed_limit"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
