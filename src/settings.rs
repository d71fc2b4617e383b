//! Settings file handling (usecase-viz.toml)

use crate::query::DEFAULT_QUERY_ENDPOINT;
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "usecase-viz.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Directory holding the use case `*.json` configs
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    #[serde(default = "default_query_endpoint")]
    pub query_endpoint: String,
    /// When set, configs are listed and fetched from this server instead of `config_dir`
    #[serde(default)]
    pub catalog_url: Option<String>,
    /// Width of the drawing container in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("config")
}

fn default_query_endpoint() -> String {
    DEFAULT_QUERY_ENDPOINT.to_string()
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    450
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            query_endpoint: default_query_endpoint(),
            catalog_url: None,
            width: default_width(),
            height: default_height(),
            format: OutputFormat::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse settings")
    }

    /// Load an explicit settings file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Use `explicit` when given, otherwise `usecase-viz.toml` in `dir` if it
    /// exists, otherwise defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new(self.width)
            .with_height(self.height)
            .with_format(self.format)
    }
}
