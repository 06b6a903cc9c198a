use crate::analyzer::filter::DEFAULT_SEARCH_THRESHOLD;
use crate::feed::RetryPolicy;
use crate::registry::{CampusInfo, CertificationInfo, Registry, default_campuses, default_certifications};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Upper bound for `cache_ttl_seconds` (one year).
pub const MAX_CACHE_TTL_SECONDS: u64 = 366 * 24 * 60 * 60;

pub const DEFAULT_FEED_URL: &str =
    "https://docs.google.com/spreadsheets/d/1qsapyNmZleoL75aIwH57W3nqTc_VLhdbFEieOTwYWiI/export?format=csv&gid=0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed_url: String,
    pub cache_ttl_seconds: u64,
    pub request_timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub search_threshold: f64,
    pub export_dir: PathBuf,
    pub auth_config_path: Option<PathBuf>,
    /// Inline credential YAML; only ever set from the environment.
    #[serde(skip)]
    pub auth_config_yaml: Option<String>,
    pub campuses: Vec<CampusInfo>,
    pub certifications: Vec<CertificationInfo>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            cache_ttl_seconds: 600,
            request_timeout_seconds: 30,
            retry_attempts: 3,
            retry_backoff_ms: 1500,
            search_threshold: DEFAULT_SEARCH_THRESHOLD,
            export_dir: PathBuf::from("exports"),
            auth_config_path: None,
            auth_config_yaml: None,
            campuses: default_campuses(),
            certifications: default_certifications(),
        }
    }
}

impl AppConfig {
    pub fn registry(&self) -> Registry {
        Registry::new(self.campuses.clone(), self.certifications.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Saturates instead of panicking for values that skipped `validate`.
    pub fn cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.cache_ttl_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_seconds > MAX_CACHE_TTL_SECONDS {
            return Err(ConfigError::InvalidValue {
                key: "cache_ttl_seconds".into(),
                value: self.cache_ttl_seconds.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.search_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "search_threshold".into(),
                value: self.search_threshold.to_string(),
            });
        }
        Ok(())
    }

    /// Applies environment-style overrides; `lookup` returns the value of a key.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CSV_FEED_URL") {
            self.feed_url = url;
        }
        if let Some(ttl) = lookup("CACHE_TTL_SECONDS") {
            let value: u64 = parse_value("CACHE_TTL_SECONDS", &ttl)?;
            if value > MAX_CACHE_TTL_SECONDS {
                return Err(ConfigError::InvalidValue {
                    key: "CACHE_TTL_SECONDS".into(),
                    value: ttl,
                });
            }
            self.cache_ttl_seconds = value;
        }
        if let Some(threshold) = lookup("SEARCH_THRESHOLD") {
            let value: f64 = parse_value("SEARCH_THRESHOLD", &threshold)?;
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    key: "SEARCH_THRESHOLD".into(),
                    value: threshold,
                });
            }
            self.search_threshold = value;
        }
        if let Some(dir) = lookup("EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("AUTH_CONFIG_PATH") {
            self.auth_config_path = Some(PathBuf::from(path));
        }
        if let Some(yaml) = lookup("AUTH_CONFIG_YAML") {
            self.auth_config_yaml = Some(yaml);
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Reads the JSON config file; a missing file means all defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// File config plus process environment overrides.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    let path = std::env::var("DASH_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let mut config = load_config(Path::new(&path))?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}
