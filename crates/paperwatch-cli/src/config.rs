//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use paperwatch_arxiv::ArxivConfig;
use paperwatch_catalog::{RenderOptions, TopicSpec, validate_topics, validate_window};
use paperwatch_core::{DateRange, PipelineError, Topic};
use serde::Deserialize;

/// Global configuration for paperwatch
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding catalog.json and manifest.json
    pub data_dir: PathBuf,
    /// Records requested per keyword query
    pub max_results: usize,
    /// Drop catalog topics that are no longer configured
    pub prune_removed_topics: bool,
    pub retention: RetentionConfig,
    pub refresh: RefreshConfig,
    pub render: RenderOptions,
    pub http: HttpSection,
    pub arxiv: ArxivConfig,
    pub topics: Vec<TopicSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            max_results: 50,
            prune_removed_topics: true,
            retention: RetentionConfig::default(),
            refresh: RefreshConfig::default(),
            render: RenderOptions::default(),
            http: HttpSection::default(),
            arxiv: ArxivConfig::default(),
            topics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Rolling window in days; 0 keeps everything
    pub keep_days: u32,
}

/// Explicit refresh window, YYYY-MM-DD bounds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Seconds before a stalled request fails
    pub read_timeout: u64,
    pub max_retries: u32,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            read_timeout: 60,
            max_retries: 3,
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./paperwatch.toml (current directory)
    /// 2. ~/.config/paperwatch/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("paperwatch.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "paperwatch") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Validated topics, or every configuration problem at once.
    pub fn topics(&self) -> Result<Vec<Topic>, PipelineError> {
        validate_topics(&self.topics)
    }

    /// Effective refresh window. Either CLI bound replaces the `[refresh]` table.
    pub fn refresh_window(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Option<DateRange>, PipelineError> {
        if from.is_some() || to.is_some() {
            validate_window(from, to)
        } else {
            validate_window(self.refresh.start.as_deref(), self.refresh.end.as_deref())
        }
    }
}
