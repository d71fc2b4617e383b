use crate::palette::{ColorScale, Rgb};
use crate::resolve::ChartVariant;
use crate::scale::Scale;
use crate::tooltip::TooltipContent;

// =============================================================================
// Layout
// =============================================================================

/// Space reserved around the plot area for axes and their titles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self { top: 20.0, right: 30.0, bottom: 60.0, left: 60.0 }
    }
}

/// Plot area inside the margins. Mark and tick coordinates are relative to
/// its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub width: f64,
    pub height: f64,
}

// =============================================================================
// Scene
// =============================================================================

/// A fully laid out chart, ready for a backend or for hit testing.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartScene {
    pub width: u32,
    pub height: u32,
    pub margins: Margins,
    pub plot: PlotArea,
    pub title: String,
    pub variant: ChartVariant,
    pub x_axis: AxisScene,
    pub y_axis: AxisScene,
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub color_scale: Option<ColorScale>,
    /// In draw order; later marks sit on top
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrient {
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisScene {
    pub orient: AxisOrient,
    /// Axis title, the bound column name
    pub title: String,
    pub ticks: Vec<Tick>,
    /// Tick labels drawn at -45 degrees (crowded categorical axes)
    pub rotate_labels: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Pixel offset along the axis
    pub position: f64,
    pub label: String,
}

/// One glyph for one result row
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub row: usize,
    pub shape: MarkShape,
    pub fill: Rgb,
    pub tooltip: TooltipContent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkShape {
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
}

impl MarkShape {
    pub fn contains(&self, (px, py): (f64, f64)) -> bool {
        match *self {
            MarkShape::Rect { x, y, width, height } => {
                px >= x && px <= x + width && py >= y && py <= y + height
            }
            MarkShape::Circle { cx, cy, r } => {
                let (dx, dy) = (px - cx, py - cy);
                dx * dx + dy * dy <= r * r
            }
        }
    }
}

impl ChartScene {
    /// Convert a point on the whole surface into plot-area coordinates
    pub fn to_plot(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (x - self.margins.left, y - self.margins.top)
    }

    /// Index of the topmost mark under `point` (surface coordinates)
    pub fn mark_at(&self, point: (f64, f64)) -> Option<usize> {
        let local = self.to_plot(point);
        self.marks.iter().rposition(|m| m.shape.contains(local))
    }

    pub fn mark(&self, idx: usize) -> Option<&Mark> {
        self.marks.get(idx)
    }

    /// Number of distinct band slots on a categorical x axis
    pub fn band_count(&self) -> Option<usize> {
        self.x_scale.as_band().map(|b| b.len())
    }
}
