// Library exports for usecase-viz

pub mod adapter;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod data;
pub mod details;
pub mod error;
pub mod explorer;
pub mod graph;
pub mod ir;
pub mod palette;
pub mod parser;
pub mod query;
pub mod resolve;
pub mod runtime;
pub mod scale;
pub mod settings;
pub mod surface;
pub mod tooltip;

#[cfg(test)]
mod test_http;

use serde::Deserialize;

pub use error::{Unsupported, VizError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "svg")]
    #[default]
    Svg,
}

/// Sizing contract for one render call.
///
/// The width is whatever the caller's container offers; there is no default.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RenderOptions {
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_height() -> u32 { 450 }

impl RenderOptions {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            height: default_height(),
            format: OutputFormat::default(),
        }
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}
