//! Configuration management for goodscribe.
//!
//! Configuration is read from `~/.config/goodscribe/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! A handful of environment variables override file values afterwards:
//!
//! | Variable                  | Overrides                  |
//! |---------------------------|----------------------------|
//! | `AI_API_KEY`              | `generator.api_key`        |
//! | `AI_MODEL`                | `generator.model`          |
//! | `AI_BASE_URL`             | `generator.base_url`       |
//! | `HEADLESS`                | `scraper.headless`         |
//! | `GOODSCRIBE_SESSION_FILE` | `session.path`             |

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use crate::fetcher::FetcherConfig;
use crate::generator::GeneratorConfig;
use crate::normalizer::LinkConfig;
use crate::scraper::ScraperConfig;
use crate::store::SessionConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub link: LinkConfig,
    pub fetcher: FetcherConfig,
    pub scraper: ScraperConfig,
    pub session: SessionConfig,
    pub generator: GeneratorConfig,
}

impl Config {
    /// Load configuration from the default path, then apply environment overrides.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
                path: config_path.clone(),
                source: e,
            })?;

            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: config_path,
                source: e,
            })?
        } else {
            Self::create_default_config(&config_path)?;
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Get the default config file path: `~/.config/goodscribe/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("goodscribe").join("config.toml"))
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Blank values are ignored so an exported-but-empty variable keeps the file value.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get("AI_API_KEY") {
            self.generator.api_key = Some(key);
        }
        if let Some(model) = get("AI_MODEL") {
            self.generator.model = model;
        }
        if let Some(base_url) = get("AI_BASE_URL") {
            self.generator.base_url = base_url;
        }
        if let Some(raw) = get("HEADLESS") {
            match parse_bool(&raw) {
                Some(headless) => self.scraper.headless = headless,
                None => warn!("Ignoring HEADLESS={:?}: expected true/false", raw),
            }
        }
        if let Some(path) = get("GOODSCRIBE_SESSION_FILE") {
            self.session.path = Some(PathBuf::from(path));
        }
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# goodscribe configuration
#
# Environment variables override these values:
#   AI_API_KEY, AI_MODEL, AI_BASE_URL, HEADLESS, GOODSCRIBE_SESSION_FILE

[link]
# Goods-detail page built from a parsed goods_id
goods_url_template = "https://mobile.yangkeduo.com/goods.html?goods_id={goods_id}"

# Page titles that mean "redirected to the storefront home page"
generic_titles = ["拼多多商城", "拼多多"]

[fetcher]
# Static HTTP request timeout in seconds
timeout_secs = 20

[scraper]
# Run browser in headless mode (no visible window)
headless = true

# Navigation timeout in seconds
timeout_secs = 45

# Wait time after navigation for scripts and API calls (milliseconds)
wait_after_load_ms = 2500

# Maximum number of JSON response bodies inspected per render
max_json_bodies = 80

[session]
# Login session file; defaults to <data dir>/goodscribe/session.json
# path = "/home/me/.local/share/goodscribe/session.json"

[generator]
# OpenAI-compatible chat completions endpoint
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
temperature = 0.7
timeout_secs = 60
"##
        .to_string()
    }
}

/// Parse the boolean spellings accepted in environment variables.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
