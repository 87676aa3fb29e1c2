//! Service configuration.
//!
//! Settings come from three layers, later ones winning:
//! 1. built-in defaults,
//! 2. an optional TOML file (`meteomarine.toml` or `--config <path>`),
//! 3. environment variables, with a `.env` file loaded first when present.
//!
//! ```toml
//! api_base_url = "https://data-real-time-6.onrender.com"
//! observation_limit = 20
//! http_timeout_secs = 30
//! stale_after_minutes = 30
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alert::stalenesses::DEFAULT_STALE_AFTER_MINUTES;

/// Upstream weather API serving `/donnees` and `/previsions`.
pub const DEFAULT_API_BASE_URL: &str = "https://data-real-time-6.onrender.com";

/// Rows requested by the Live Data view.
pub const DEFAULT_OBSERVATION_LIMIT: u32 = 20;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "meteomarine.toml";

pub const ENV_API_BASE_URL: &str = "METEO_API_BASE_URL";
pub const ENV_OBSERVATION_LIMIT: &str = "METEO_OBSERVATION_LIMIT";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "METEO_HTTP_TIMEOUT_SECS";
pub const ENV_STALE_AFTER_MINUTES: &str = "METEO_STALE_AFTER_MINUTES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Runtime settings for fetching and displaying weather data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the weather API, without a trailing slash.
    pub api_base_url: String,
    /// `limit` query parameter for `/donnees`; `None` lets the API decide.
    pub observation_limit: Option<u32>,
    /// Whole-request timeout for each fetch.
    pub http_timeout_secs: u64,
    /// Age after which a station's newest observation is flagged.
    pub stale_after_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            observation_limit: Some(DEFAULT_OBSERVATION_LIMIT),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            stale_after_minutes: DEFAULT_STALE_AFTER_MINUTES,
        }
    }
}

impl Config {
    /// Loads defaults, then `path` (or `meteomarine.toml` if it exists), then
    /// the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|var| env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies environment overrides through `lookup`, so tests can inject
    /// variables without touching the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_OBSERVATION_LIMIT) {
            // 0 or "none" removes the limit
            self.observation_limit = match raw.trim() {
                "" | "0" | "none" => None,
                v => Some(parse_env(ENV_OBSERVATION_LIMIT, v)?),
            };
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.http_timeout_secs = parse_env(ENV_HTTP_TIMEOUT_SECS, raw.trim())?;
        }
        if let Some(raw) = lookup(ENV_STALE_AFTER_MINUTES) {
            self.stale_after_minutes = parse_env(ENV_STALE_AFTER_MINUTES, raw.trim())?;
        }
        Ok(())
    }

    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        self.api_base_url = trimmed.to_string();
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}
