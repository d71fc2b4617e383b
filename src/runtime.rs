// Render pipeline: descriptor + rows -> terminal render state

use crate::adapter::{adapt, Adapted};
use crate::compiler::compile_chart;
use crate::config::VisualizationDescriptor;
use crate::data::ResultSet;
use crate::error::{Result, VizError};
use crate::ir::ChartScene;
use crate::resolve::resolve_visualization;
use crate::RenderOptions;

pub const EMPTY_MESSAGE: &str = "No data returned for this query.";

/// Terminal state of one render call
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Rendered(ChartScene),
    Empty,
    Failed(VizError),
}

impl RenderOutcome {
    /// Inline text shown in place of a chart, if any
    pub fn placeholder(&self) -> Option<String> {
        match self {
            RenderOutcome::Rendered(_) => None,
            RenderOutcome::Empty => Some(EMPTY_MESSAGE.to_string()),
            RenderOutcome::Failed(err) => Some(failure_message(err)),
        }
    }

    pub fn scene(&self) -> Option<&ChartScene> {
        match self {
            RenderOutcome::Rendered(scene) => Some(scene),
            _ => None,
        }
    }
}

/// Human readable text for a failed render
pub fn failure_message(err: &VizError) -> String {
    match err {
        VizError::UnsupportedConfig(reason) => capitalize(&reason.to_string()),
        other => format!("Error visualizing data: {}", other),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render `result` according to `vis`.
///
/// Never fails past the caller: every error becomes `Failed`. An empty
/// result set is `Empty` whatever the descriptor says.
pub fn render(
    vis: &VisualizationDescriptor,
    result: &ResultSet,
    options: &RenderOptions,
    title: &str,
) -> RenderOutcome {
    if result.is_empty() {
        tracing::debug!(title, "empty result set");
        return RenderOutcome::Empty;
    }

    match try_render(vis, result, options, title) {
        Ok(Some(scene)) => RenderOutcome::Rendered(scene),
        Ok(None) => RenderOutcome::Empty,
        Err(err) => {
            tracing::debug!(title, error = %err, "render failed");
            RenderOutcome::Failed(err)
        }
    }
}

fn try_render(
    vis: &VisualizationDescriptor,
    result: &ResultSet,
    options: &RenderOptions,
    title: &str,
) -> Result<Option<ChartScene>> {
    let resolved = resolve_visualization(vis)?;
    match adapt(result, &resolved)? {
        Adapted::Empty => Ok(None),
        Adapted::Data(data) => compile_chart(&resolved, &data, options, title).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartKind;
    use crate::error::Unsupported;
    use serde_json::json;

    fn bar() -> VisualizationDescriptor {
        VisualizationDescriptor {
            kind: Some(ChartKind::Bar),
            x_axis: Some("range".to_string()),
            y_axis: Some("count".to_string()),
            color_by: None,
            tooltip: None,
        }
    }

    fn rows() -> ResultSet {
        ResultSet::from_json(&json!([
            {"range": "0-5%", "count": 20},
            {"range": "5-10%", "count": 45}
        ]))
        .unwrap()
    }

    #[test]
    fn test_render_bar_scenario() {
        let outcome = render(&bar(), &rows(), &RenderOptions::new(800), "Spend drop");
        let scene = outcome.scene().unwrap();
        assert_eq!(scene.marks.len(), 2);
        assert_eq!(scene.band_count(), Some(2));
        let band = scene.x_scale.as_band().unwrap();
        assert_eq!(band.domain().collect::<Vec<_>>(), vec!["0-5%", "5-10%"]);
        assert_eq!(scene.y_scale.as_linear().unwrap().domain(), (0.0, 45.0));
        assert_eq!(scene.marks[1].tooltip.to_string(), "range: 5-10%, count: 45");
        assert_eq!(outcome.placeholder(), None);
    }

    #[test]
    fn test_empty_beats_everything() {
        let mut vis = bar();
        vis.kind = Some(ChartKind::Other("pie".to_string()));
        let outcome = render(&vis, &ResultSet::default(), &RenderOptions::new(0), "t");
        assert_eq!(outcome, RenderOutcome::Empty);
        assert_eq!(outcome.placeholder().as_deref(), Some(EMPTY_MESSAGE));
    }

    #[test]
    fn test_unsupported_type_placeholder() {
        let mut vis = bar();
        vis.kind = Some(ChartKind::Other("pie".to_string()));
        let outcome = render(&vis, &rows(), &RenderOptions::new(800), "t");
        assert_eq!(
            outcome,
            RenderOutcome::Failed(VizError::UnsupportedConfig(Unsupported::ChartType(
                "pie".to_string()
            )))
        );
        assert_eq!(outcome.placeholder().as_deref(), Some("Unsupported visualization type: pie"));
    }

    #[test]
    fn test_missing_axis_column() {
        let mut vis = bar();
        vis.y_axis = Some("total".to_string());
        let outcome = render(&vis, &rows(), &RenderOptions::new(800), "t");
        assert!(matches!(
            outcome,
            RenderOutcome::Failed(VizError::UnsupportedConfig(Unsupported::MissingColumn { .. }))
        ));
    }

    #[test]
    fn test_type_mismatch_names_column() {
        let rs = ResultSet::from_json(&json!([{"range": "a", "count": "many"}])).unwrap();
        let outcome = render(&bar(), &rs, &RenderOptions::new(800), "t");
        let message = outcome.placeholder().unwrap();
        assert!(message.contains("count"));
        assert!(message.contains("row 0"));
    }

    #[test]
    fn test_zero_width_surface() {
        let outcome = render(&bar(), &rows(), &RenderOptions::new(0), "t");
        assert!(matches!(outcome, RenderOutcome::Failed(VizError::InvalidRenderSurface { .. })));
    }

    #[test]
    fn test_subnormal_values_still_render() {
        let rs = ResultSet::from_json(&json!([
            {"range": "a", "count": 0},
            {"range": "b", "count": 1e-310}
        ]))
        .unwrap();
        let outcome = render(&bar(), &rs, &RenderOptions::new(800), "t");
        let scene = outcome.scene().unwrap();
        assert_eq!(scene.marks.len(), 2);
        assert_eq!(scene.y_axis.ticks.len(), 2);
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = render(&bar(), &rows(), &RenderOptions::new(640), "t");
        let b = render(&bar(), &rows(), &RenderOptions::new(640), "t");
        assert_eq!(a, b);
    }
}
