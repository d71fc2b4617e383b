use thiserror::Error;

/// Failures raised while turning a use case into a chart.
///
/// Every variant is caught at the render boundary and shown inline in the
/// chart area, so the `Display` text is written for the analyst.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VizError {
    #[error("malformed use case config: {0}")]
    MalformedConfig(String),

    #[error("column '{column}' has a non-numeric value at row {row}")]
    DataTypeMismatch { column: String, row: usize },

    #[error("{0}")]
    UnsupportedConfig(Unsupported),

    #[error("invalid render surface: drawable area is {width}x{height} pixels")]
    InvalidRenderSurface { width: f64, height: f64 },

    #[error("query execution failed with HTTP status {status}")]
    QueryExecutionFailed { status: u16 },

    #[error("query service unavailable: {0}")]
    QueryUnavailable(String),
}

/// Why a visualization descriptor cannot be drawn against its data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Unsupported {
    #[error("unsupported visualization type: {0}")]
    ChartType(String),

    #[error("visualization is missing its '{0}' binding")]
    MissingBinding(&'static str),

    #[error("column '{column}' is missing from row {row}")]
    MissingColumn { column: String, row: usize },

    #[error("a {scale} scale cannot be built over column '{column}'")]
    ScaleInput { scale: &'static str, column: String },
}

impl From<Unsupported> for VizError {
    fn from(reason: Unsupported) -> Self {
        VizError::UnsupportedConfig(reason)
    }
}

pub type Result<T> = std::result::Result<T, VizError>;
