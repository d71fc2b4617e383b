use crate::config::{ChartKind, VisualizationDescriptor};
use crate::error::{Result, Unsupported};

/// The chart variants this crate can draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartVariant {
    Bar,
    Scatter,
}

/// A visualization descriptor with every required binding checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVisualization {
    pub variant: ChartVariant,
    pub x_col: String,
    pub y_col: String,
    pub color_by: Option<String>,
    pub tooltip: Vec<String>,
}

impl ResolvedVisualization {
    /// Columns every row must carry for the chart to be drawable
    pub fn required_columns(&self) -> [&str; 2] {
        [self.x_col.as_str(), self.y_col.as_str()]
    }
}

/// Resolve a descriptor into a drawable visualization (no data needed yet)
pub fn resolve_visualization(vis: &VisualizationDescriptor) -> Result<ResolvedVisualization> {
    let variant = match &vis.kind {
        Some(ChartKind::Bar) => ChartVariant::Bar,
        Some(ChartKind::Scatter) => ChartVariant::Scatter,
        Some(ChartKind::Other(name)) => return Err(Unsupported::ChartType(name.clone()).into()),
        None => return Err(Unsupported::MissingBinding("type").into()),
    };

    let x_col = required(&vis.x_axis, "x_axis")?;
    let y_col = required(&vis.y_axis, "y_axis")?;

    // color_by only means something for scatter plots
    let color_by = match variant {
        ChartVariant::Scatter => vis.color_by.clone().filter(|c| !c.is_empty()),
        ChartVariant::Bar => None,
    };

    Ok(ResolvedVisualization {
        variant,
        x_col,
        y_col,
        color_by,
        tooltip: vis.tooltip.clone().unwrap_or_default(),
    })
}

fn required(binding: &Option<String>, name: &'static str) -> Result<String> {
    match binding {
        Some(col) if !col.is_empty() => Ok(col.clone()),
        _ => Err(Unsupported::MissingBinding(name).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VizError;

    fn vis(kind: &str) -> VisualizationDescriptor {
        VisualizationDescriptor {
            kind: Some(ChartKind::from(kind.to_string())),
            x_axis: Some("x".to_string()),
            y_axis: Some("y".to_string()),
            color_by: Some("segment".to_string()),
            tooltip: None,
        }
    }

    #[test]
    fn test_resolve_scatter_keeps_color() {
        let resolved = resolve_visualization(&vis("scatter")).unwrap();
        assert_eq!(resolved.variant, ChartVariant::Scatter);
        assert_eq!(resolved.color_by.as_deref(), Some("segment"));
        assert!(resolved.tooltip.is_empty());
    }

    #[test]
    fn test_resolve_bar_drops_color() {
        let resolved = resolve_visualization(&vis("bar")).unwrap();
        assert_eq!(resolved.variant, ChartVariant::Bar);
        assert_eq!(resolved.color_by, None);
        assert_eq!(resolved.required_columns(), ["x", "y"]);
    }

    #[test]
    fn test_resolve_unknown_type() {
        let err = resolve_visualization(&vis("pie")).unwrap_err();
        assert_eq!(
            err,
            VizError::UnsupportedConfig(Unsupported::ChartType("pie".to_string()))
        );
    }

    #[test]
    fn test_resolve_missing_axis() {
        let mut v = vis("bar");
        v.y_axis = None;
        let err = resolve_visualization(&v).unwrap_err();
        assert_eq!(err, VizError::UnsupportedConfig(Unsupported::MissingBinding("y_axis")));
    }
}
