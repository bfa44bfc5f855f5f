//! Aggregator settings, read from `wanderlog.toml`.

use crate::error::ConfigError;
use crate::record::{ExtractOptions, DEFAULT_AUTHOR, DEFAULT_PREVIEW_LENGTH};
use crate::stats::DEFAULT_RECENT_DAYS;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "wanderlog.toml";

/// Largest accepted `recent_days`, one hundred years.
pub const MAX_RECENT_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregatorConfig {
    /// Directory scanned for `.md` posts.
    pub content_dir: PathBuf,
    /// Characters kept in generated descriptions.
    pub preview_length: usize,
    pub default_author: String,
    /// Prefix of the per-post URL carried by map pins.
    pub blog_url_prefix: String,
    /// Trailing window, in days, counted as recent by the statistics.
    pub recent_days: i64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/blog"),
            preview_length: DEFAULT_PREVIEW_LENGTH,
            default_author: DEFAULT_AUTHOR.to_string(),
            blog_url_prefix: "/blog".to_string(),
            recent_days: DEFAULT_RECENT_DAYS,
        }
    }
}

impl AggregatorConfig {
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::parse_toml(&content)
    }

    /// The explicit file if given, else `wanderlog.toml` in `dir` when present, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!("using config {}", candidate.display());
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview_length == 0 {
            return Err(ConfigError::Validation(
                "preview_length must be greater than zero".to_string(),
            ));
        }
        if !(0..=MAX_RECENT_DAYS).contains(&self.recent_days) {
            return Err(ConfigError::Validation(format!(
                "recent_days must be between 0 and {MAX_RECENT_DAYS}"
            )));
        }
        Ok(())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            preview_length: self.preview_length,
            default_author: self.default_author.clone(),
        }
    }
}
