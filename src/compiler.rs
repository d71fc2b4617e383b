use crate::adapter::NormalizedData;
use crate::error::{Result, VizError};
use crate::ir::{AxisOrient, AxisScene, ChartScene, Margins, Mark, MarkShape, PlotArea, Tick};
use crate::palette::{ColorScale, DEFAULT_MARK_COLOR};
use crate::resolve::{ChartVariant, ResolvedVisualization};
use crate::scale::{build_scale, format_tick, LinearScale, Scale, ScaleKind};
use crate::tooltip::TooltipContent;
use crate::RenderOptions;

/// Fraction of each band left empty between bars
pub const BAR_PADDING: f64 = 0.2;
/// Radius of scatter points, in pixels
pub const POINT_RADIUS: f64 = 5.0;
/// Approximate number of ticks on a continuous axis
pub const LINEAR_TICKS: usize = 10;

/// Scales derived for one render
#[derive(Debug, Clone)]
pub struct ScaleSet {
    pub x: Scale,
    pub y: Scale,
    pub color: Option<ColorScale>,
}

/// Drawing contract shared by every chart variant.
///
/// Adding a variant means one new implementation plus one arm in
/// [`renderer_for`].
pub trait ChartRenderer {
    fn build_scales(
        &self,
        vis: &ResolvedVisualization,
        data: &NormalizedData<'_>,
        plot: PlotArea,
    ) -> Result<ScaleSet>;

    fn x_axis(&self, vis: &ResolvedVisualization, scales: &ScaleSet) -> AxisScene;

    /// One mark per row, in row order
    fn marks(
        &self,
        vis: &ResolvedVisualization,
        data: &NormalizedData<'_>,
        scales: &ScaleSet,
        plot: PlotArea,
    ) -> Vec<Mark>;
}

pub struct BarChart;
pub struct ScatterChart;

pub fn renderer_for(variant: ChartVariant) -> &'static dyn ChartRenderer {
    match variant {
        ChartVariant::Bar => &BarChart,
        ChartVariant::Scatter => &ScatterChart,
    }
}

/// Compile adapted data into a chart scene: scales, axes, then marks
pub fn compile_chart(
    vis: &ResolvedVisualization,
    data: &NormalizedData<'_>,
    options: &RenderOptions,
    title: &str,
) -> Result<ChartScene> {
    let margins = Margins::default();
    let plot = PlotArea {
        width: options.width as f64 - margins.left - margins.right,
        height: options.height as f64 - margins.top - margins.bottom,
    };
    if plot.width <= 0.0 || plot.height <= 0.0 {
        return Err(VizError::InvalidRenderSurface { width: plot.width, height: plot.height });
    }

    let renderer = renderer_for(vis.variant);
    let scales = renderer.build_scales(vis, data, plot)?;
    tracing::debug!(variant = ?vis.variant, rows = data.len(), "scales built");

    let x_axis = renderer.x_axis(vis, &scales);
    let y_axis = value_axis(&vis.y_col, &scales.y);
    let marks = renderer.marks(vis, data, &scales, plot);

    Ok(ChartScene {
        width: options.width,
        height: options.height,
        margins,
        plot,
        title: title.to_string(),
        variant: vis.variant,
        x_axis,
        y_axis,
        x_scale: scales.x,
        y_scale: scales.y,
        color_scale: scales.color,
        marks,
    })
}

// =============================================================================
// Bar
// =============================================================================

impl ChartRenderer for BarChart {
    fn build_scales(
        &self,
        vis: &ResolvedVisualization,
        data: &NormalizedData<'_>,
        plot: PlotArea,
    ) -> Result<ScaleSet> {
        let x = build_scale(ScaleKind::Band, &data.categorical(&vis.x_col)?, (0.0, plot.width), BAR_PADDING)?;
        let y = build_scale(ScaleKind::LinearFromZero, &data.numeric(&vis.y_col)?, (plot.height, 0.0), 0.0)?;
        Ok(ScaleSet { x, y, color: None })
    }

    fn x_axis(&self, vis: &ResolvedVisualization, scales: &ScaleSet) -> AxisScene {
        let ticks = match scales.x.as_band() {
            Some(band) => band
                .domain()
                .filter_map(|label| {
                    band.center(label).map(|position| Tick { position, label: label.to_string() })
                })
                .collect(),
            None => Vec::new(),
        };
        AxisScene {
            orient: AxisOrient::Bottom,
            title: vis.x_col.clone(),
            ticks,
            rotate_labels: true,
        }
    }

    fn marks(
        &self,
        vis: &ResolvedVisualization,
        data: &NormalizedData<'_>,
        scales: &ScaleSet,
        _plot: PlotArea,
    ) -> Vec<Mark> {
        let (Some(band), Some(y)) = (scales.x.as_band(), scales.y.as_linear()) else {
            return Vec::new();
        };
        let baseline = y.map(0.0);

        data.rows()
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| {
                let category = row.get(&vis.x_col)?.to_string();
                let value = row.get(&vis.y_col)?.as_f64()?;
                let x = band.map(&category)?;
                let top = y.map(value);
                Some(Mark {
                    row: idx,
                    shape: MarkShape::Rect {
                        x,
                        y: top.min(baseline),
                        width: band.bandwidth(),
                        height: (baseline - top).abs(),
                    },
                    fill: DEFAULT_MARK_COLOR,
                    tooltip: tooltip_for(vis, data, idx),
                })
            })
            .collect()
    }
}

// =============================================================================
// Scatter
// =============================================================================

impl ChartRenderer for ScatterChart {
    fn build_scales(
        &self,
        vis: &ResolvedVisualization,
        data: &NormalizedData<'_>,
        plot: PlotArea,
    ) -> Result<ScaleSet> {
        let x = build_scale(ScaleKind::Linear, &data.numeric(&vis.x_col)?, (0.0, plot.width), 0.0)?;
        let y = build_scale(ScaleKind::LinearFromZero, &data.numeric(&vis.y_col)?, (plot.height, 0.0), 0.0)?;

        let color = vis.color_by.as_ref().map(|col| {
            let values: Vec<String> = (0..data.len()).map(|idx| data.display_value(idx, col)).collect();
            ColorScale::new(&values)
        });

        Ok(ScaleSet { x, y, color })
    }

    fn x_axis(&self, vis: &ResolvedVisualization, scales: &ScaleSet) -> AxisScene {
        value_axis(&vis.x_col, &scales.x).with_orient(AxisOrient::Bottom)
    }

    fn marks(
        &self,
        vis: &ResolvedVisualization,
        data: &NormalizedData<'_>,
        scales: &ScaleSet,
        _plot: PlotArea,
    ) -> Vec<Mark> {
        let (Some(x), Some(y)) = (scales.x.as_linear(), scales.y.as_linear()) else {
            return Vec::new();
        };

        data.rows()
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| {
                let xv = row.get(&vis.x_col)?.as_f64()?;
                let yv = row.get(&vis.y_col)?.as_f64()?;
                let fill = match (&scales.color, &vis.color_by) {
                    (Some(color), Some(col)) => color.color(&data.display_value(idx, col)),
                    _ => DEFAULT_MARK_COLOR,
                };
                Some(Mark {
                    row: idx,
                    shape: MarkShape::Circle { cx: x.map(xv), cy: y.map(yv), r: POINT_RADIUS },
                    fill,
                    tooltip: tooltip_for(vis, data, idx),
                })
            })
            .collect()
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

impl AxisScene {
    fn with_orient(mut self, orient: AxisOrient) -> Self {
        self.orient = orient;
        self
    }
}

/// Left axis for a continuous scale
fn value_axis(title: &str, scale: &Scale) -> AxisScene {
    let ticks = scale.as_linear().map(linear_ticks).unwrap_or_default();
    AxisScene {
        orient: AxisOrient::Left,
        title: title.to_string(),
        ticks,
        rotate_labels: false,
    }
}

fn linear_ticks(scale: &LinearScale) -> Vec<Tick> {
    let step = scale.tick_step(LINEAR_TICKS);
    scale
        .ticks(LINEAR_TICKS)
        .into_iter()
        .map(|v| Tick { position: scale.map(v), label: format_tick(v, step) })
        .collect()
}

/// x, y, color binding (scatter), then every configured tooltip column
fn tooltip_for(vis: &ResolvedVisualization, data: &NormalizedData<'_>, idx: usize) -> TooltipContent {
    let mut content = TooltipContent::new();
    content.push(vis.x_col.as_str(), data.display_value(idx, &vis.x_col));
    content.push(vis.y_col.as_str(), data.display_value(idx, &vis.y_col));
    if let Some(col) = &vis.color_by {
        content.push(col.as_str(), data.display_value(idx, col));
    }
    for col in &vis.tooltip {
        content.push(col.as_str(), data.display_value(idx, col));
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{adapt, Adapted};
    use crate::data::ResultSet;
    use serde_json::json;

    fn vis(variant: ChartVariant, x: &str, y: &str) -> ResolvedVisualization {
        ResolvedVisualization {
            variant,
            x_col: x.to_string(),
            y_col: y.to_string(),
            color_by: None,
            tooltip: vec![],
        }
    }

    fn compile(vis: &ResolvedVisualization, rows: serde_json::Value) -> Result<ChartScene> {
        let rs = ResultSet::from_json(&rows).unwrap();
        let Adapted::Data(data) = adapt(&rs, vis)? else {
            panic!("expected data");
        };
        compile_chart(vis, &data, &RenderOptions::new(800), "test")
    }

    #[test]
    fn test_compile_bar() {
        let v = vis(ChartVariant::Bar, "range", "count");
        let scene = compile(&v, json!([{"range": "0-5%", "count": 20}, {"range": "5-10%", "count": 45}]))
            .unwrap();

        assert_eq!(scene.plot, PlotArea { width: 710.0, height: 370.0 });
        assert_eq!(scene.marks.len(), 2);
        let MarkShape::Rect { x: x0, y: top0, height: h0, .. } = scene.marks[0].shape else {
            panic!("expected rect");
        };
        let MarkShape::Rect { x: x1, y: top1, height: h1, .. } = scene.marks[1].shape else {
            panic!("expected rect");
        };
        assert!(x0 < x1);
        // tallest bar reaches the top of the plot
        assert!(top1.abs() < 1e-9);
        assert!((h1 - 370.0).abs() < 1e-9);
        assert!((top0 + h0 - 370.0).abs() < 1e-9);

        let labels: Vec<&str> = scene.x_axis.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["0-5%", "5-10%"]);
        assert!(scene.x_axis.rotate_labels);
        assert_eq!(scene.y_axis.ticks.first().map(|t| t.label.as_str()), Some("0"));
    }

    #[test]
    fn test_repeated_categories_share_a_band() {
        let v = vis(ChartVariant::Bar, "range", "count");
        let scene = compile(
            &v,
            json!([
                {"range": "a", "count": 1},
                {"range": "b", "count": 2},
                {"range": "a", "count": 3}
            ]),
        )
        .unwrap();

        assert_eq!(scene.marks.len(), 3);
        assert_eq!(scene.band_count(), Some(2));
        let (MarkShape::Rect { x: first, .. }, MarkShape::Rect { x: third, .. }) =
            (scene.marks[0].shape, scene.marks[2].shape)
        else {
            panic!("expected rects");
        };
        assert_eq!(first, third);
        assert_eq!(scene.x_axis.ticks.len(), 2);
    }

    #[test]
    fn test_bar_tooltip_lines() {
        let mut v = vis(ChartVariant::Bar, "range", "count");
        v.tooltip = vec!["share".to_string(), "count".to_string()];
        let scene = compile(&v, json!([{"range": "a", "count": 3, "share": 0.5}])).unwrap();
        let lines = scene.marks[0].tooltip.lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], ("share".to_string(), "0.5".to_string()));
        assert_eq!(lines[3], ("count".to_string(), "3".to_string()));
    }

    #[test]
    fn test_compile_scatter_colors() {
        let mut v = vis(ChartVariant::Scatter, "age", "spend");
        v.color_by = Some("tier".to_string());
        let scene = compile(
            &v,
            json!([
                {"age": 20, "spend": 100, "tier": "gold"},
                {"age": 40, "spend": 50, "tier": "silver"},
                {"age": 60, "spend": 75, "tier": "gold"}
            ]),
        )
        .unwrap();

        assert_eq!(scene.marks.len(), 3);
        assert_eq!(scene.marks[0].fill, scene.marks[2].fill);
        assert_ne!(scene.marks[0].fill, scene.marks[1].fill);
        assert_eq!(scene.marks[0].tooltip.get("tier"), Some("gold"));

        let MarkShape::Circle { cx, cy, r } = scene.marks[0].shape else {
            panic!("expected circle");
        };
        assert_eq!(r, POINT_RADIUS);
        assert!(cx.abs() < 1e-9);
        assert!(cy.abs() < 1e-9);
        assert_eq!(scene.x_axis.orient, AxisOrient::Bottom);
        assert!(!scene.x_axis.rotate_labels);
    }

    #[test]
    fn test_scatter_without_color_uses_default() {
        let v = vis(ChartVariant::Scatter, "age", "spend");
        let scene = compile(&v, json!([{"age": 1, "spend": 2}])).unwrap();
        assert_eq!(scene.marks[0].fill, DEFAULT_MARK_COLOR);
        assert!(scene.color_scale.is_none());
    }

    #[test]
    fn test_scatter_missing_color_column_is_lenient() {
        let mut v = vis(ChartVariant::Scatter, "age", "spend");
        v.color_by = Some("tier".to_string());
        let scene = compile(&v, json!([{"age": 1, "spend": 2}])).unwrap();
        assert_eq!(scene.marks[0].tooltip.get("tier"), Some(""));
    }

    #[test]
    fn test_too_small_surface() {
        let v = vis(ChartVariant::Bar, "range", "count");
        let rs = ResultSet::from_json(&json!([{"range": "a", "count": 1}])).unwrap();
        let Adapted::Data(data) = adapt(&rs, &v).unwrap() else {
            panic!("expected data");
        };
        let err = compile_chart(&v, &data, &RenderOptions::new(90), "t").unwrap_err();
        assert!(matches!(err, VizError::InvalidRenderSurface { .. }));
    }
}
