//! Configuration management.
//!
//! Settings come from an optional TOML file overlaid with `CITATION_FINDER_*`
//! environment variables. Nested keys use a double underscore, e.g.
//! `CITATION_FINDER_SEARCH__TIMEOUT_SECS=20`.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! semantic_scholar = "your-api-key"
//!
//! [search]
//! base_url = "https://api.semanticscholar.org/graph/v1"
//! timeout_secs = 10
//! max_attempts = 3
//! initial_backoff_ms = 1000
//! cache_capacity = 256
//! max_concurrent = 8
//!
//! [doi]
//! enabled = true
//! resolver_url = "https://doi.org"
//! timeout_secs = 4
//! cache_capacity = 1024
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sources::{DOI_RESOLVER_BASE, SEMANTIC_API_BASE};
use crate::utils::{RetryConfig, DEFAULT_DOI_CACHE_CAPACITY, DEFAULT_SEARCH_CACHE_CAPACITY};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "CITATION_FINDER";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "citation-finder.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Paper search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// DOI validation settings
    #[serde(default)]
    pub doi: DoiConfig,
}

/// API keys for external services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default)]
    pub semantic_scholar: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            semantic_scholar: std::env::var("SEMANTIC_SCHOLAR_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Paper search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Provider API root
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Attempts per search, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Cached result lists kept in memory
    #[serde(default = "default_search_cache_capacity")]
    pub cache_capacity: usize,

    /// Upper bound on concurrent searches per document
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            timeout_secs: default_search_timeout(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            cache_capacity: default_search_cache_capacity(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry policy for provider calls
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default()
            .max_attempts(self.max_attempts)
            .initial_delay(Duration::from_millis(self.initial_backoff_ms))
    }
}

/// DOI validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoiConfig {
    /// Check DOIs against the resolver at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Resolver root
    #[serde(default = "default_resolver_url")]
    pub resolver_url: String,

    /// Per-request timeout
    #[serde(default = "default_doi_timeout")]
    pub timeout_secs: u64,

    /// Cached DOI answers kept in memory
    #[serde(default = "default_doi_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for DoiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resolver_url: default_resolver_url(),
            timeout_secs: default_doi_timeout(),
            cache_capacity: default_doi_cache_capacity(),
        }
    }
}

impl DoiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_search_base_url() -> String {
    SEMANTIC_API_BASE.to_string()
}

fn default_search_timeout() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_search_cache_capacity() -> usize {
    DEFAULT_SEARCH_CACHE_CAPACITY
}

fn default_max_concurrent() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_resolver_url() -> String {
    DOI_RESOLVER_BASE.to_string()
}

fn default_doi_timeout() -> u64 {
    4
}

fn default_doi_cache_capacity() -> usize {
    DEFAULT_DOI_CACHE_CAPACITY
}

impl Config {
    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut loaded: Config = settings.try_deserialize()?;
    if loaded.api_keys.semantic_scholar.is_none() {
        loaded.api_keys = ApiKeys::default();
    }
    Ok(loaded)
}

/// Find the configuration file: `./citation-finder.toml` first, then
/// `<config dir>/citation-finder/config.toml`
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("citation-finder").join("config.toml");
    user.is_file().then_some(user)
}

/// Get the default configuration (environment API key, built-in defaults)
pub fn get_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.base_url, SEMANTIC_API_BASE);
        assert_eq!(config.search.timeout(), Duration::from_secs(10));
        assert_eq!(config.search.cache_capacity, 256);
        assert_eq!(config.search.max_concurrent, 8);
        assert!(config.doi.enabled);
        assert_eq!(config.doi.timeout(), Duration::from_secs(4));
        assert_eq!(config.doi.cache_capacity, 1024);
    }

    #[test]
    fn test_retry_config_from_search_settings() {
        let search = SearchConfig {
            max_attempts: 5,
            initial_backoff_ms: 250,
            ..SearchConfig::default()
        };
        let retry = search.retry_config();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.initial_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let toml_content = r#"
[api_keys]
semantic_scholar = "test-key"

[search]
timeout_secs = 20
max_concurrent = 4

[doi]
enabled = false
"#;

        let mut file = File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.api_keys.semantic_scholar, Some("test-key".to_string()));
        assert_eq!(config.search.timeout_secs, 20);
        assert_eq!(config.search.max_concurrent, 4);
        assert_eq!(config.search.max_attempts, 3);
        assert!(!config.doi.enabled);
        assert_eq!(config.doi.resolver_url, DOI_RESOLVER_BASE);
    }

    #[test]
    fn test_load_config_nonexistent() {
        let path = PathBuf::from("/nonexistent/citation-finder.toml");
        assert!(load_config(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();
        assert!(load_config(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = Config::default();
        config.api_keys.semantic_scholar = Some("saved-key".to_string());
        config.search.initial_backoff_ms = 10;

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[search]"));

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, rendered).unwrap();

        let loaded = load_config(Some(path.as_path())).unwrap();
        assert_eq!(loaded.api_keys.semantic_scholar, Some("saved-key".to_string()));
        assert_eq!(loaded.search.initial_backoff_ms, 10);
    }
}
