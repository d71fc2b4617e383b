// Use case descriptors as loaded from the config catalog

use crate::error::{Result, VizError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One analytical scenario: what it answers, how to query it, how to chart it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseDescriptor {
    pub name: String,
    pub description: String,
    /// Narrative text, may contain lightweight markup (see `parser::markup`)
    #[serde(default)]
    pub insights: String,
    #[serde(default)]
    pub category: String,
    pub query: String,
    /// Absent means "no chart for this use case", not an error
    #[serde(default)]
    pub visualization: Option<VisualizationDescriptor>,
}

/// Declarative chart binding. Axis columns are optional here so a broken
/// descriptor still loads and fails visibly at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationDescriptor {
    #[serde(rename = "type", default)]
    pub kind: Option<ChartKind>,
    #[serde(default)]
    pub x_axis: Option<String>,
    #[serde(default)]
    pub y_axis: Option<String>,
    /// Scatter only
    #[serde(default)]
    pub color_by: Option<String>,
    #[serde(default)]
    pub tooltip: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartKind {
    Bar,
    Scatter,
    /// Kept verbatim so the placeholder can name it
    Other(String),
}

impl From<String> for ChartKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "bar" => ChartKind::Bar,
            "scatter" => ChartKind::Scatter,
            _ => ChartKind::Other(s),
        }
    }
}

impl From<ChartKind> for String {
    fn from(kind: ChartKind) -> Self {
        kind.as_str().to_string()
    }
}

impl ChartKind {
    pub fn as_str(&self) -> &str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Scatter => "scatter",
            ChartKind::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a raw JSON document into a descriptor.
///
/// Fails with `MalformedConfig` when `name`, `description` or `query` is
/// absent or not a string.
pub fn parse(raw: &str) -> Result<UseCaseDescriptor> {
    serde_json::from_str(raw).map_err(|e| VizError::MalformedConfig(e.to_string()))
}

/// Same as [`parse`] for an already decoded JSON value.
pub fn from_value(value: &Value) -> Result<UseCaseDescriptor> {
    UseCaseDescriptor::deserialize(value).map_err(|e| VizError::MalformedConfig(e.to_string()))
}
