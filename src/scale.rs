use crate::adapter::{ColumnValues, NumericColumn};
use crate::data::format_number;
use crate::error::{Result, Unsupported, VizError};
use indexmap::IndexSet;

/// Which scale to derive for an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleKind {
    /// Discrete values onto equal padded bands
    Band,
    /// Numeric extent onto a pixel interval
    Linear,
    /// Like `Linear`, but the domain always includes zero (value axes)
    LinearFromZero,
}

/// A fitted scale: value -> pixel, with its own domain and range
#[derive(Debug, Clone, PartialEq)]
pub enum Scale {
    Band(BandScale),
    Linear(LinearScale),
}

impl Scale {
    pub fn range(&self) -> (f64, f64) {
        match self {
            Scale::Band(s) => s.range,
            Scale::Linear(s) => s.range,
        }
    }

    pub fn as_band(&self) -> Option<&BandScale> {
        match self {
            Scale::Band(s) => Some(s),
            Scale::Linear(_) => None,
        }
    }

    pub fn as_linear(&self) -> Option<&LinearScale> {
        match self {
            Scale::Linear(s) => Some(s),
            Scale::Band(_) => None,
        }
    }
}

/// Build a scale of `kind` over `values`, mapped onto `pixel_range`.
///
/// `padding` is the fraction of each band left empty (band scales only).
/// Fails with `InvalidRenderSurface` when the pixel range has no length.
pub fn build_scale(
    kind: ScaleKind,
    values: &ColumnValues,
    pixel_range: (f64, f64),
    padding: f64,
) -> Result<Scale> {
    check_range(pixel_range)?;

    match (kind, values) {
        (ScaleKind::Band, ColumnValues::Categorical { values, .. }) => {
            Ok(Scale::Band(BandScale::new(values, pixel_range, padding)))
        }
        (ScaleKind::Band, ColumnValues::Numeric(col)) => {
            let labels: Vec<String> = col.values.iter().map(|v| format_number(*v)).collect();
            Ok(Scale::Band(BandScale::new(&labels, pixel_range, padding)))
        }
        (ScaleKind::Linear, ColumnValues::Numeric(col)) => {
            Ok(Scale::Linear(LinearScale::new(data_domain(col), pixel_range)))
        }
        (ScaleKind::LinearFromZero, ColumnValues::Numeric(col)) => {
            Ok(Scale::Linear(LinearScale::new(zero_baseline_domain(col), pixel_range)))
        }
        (_, ColumnValues::Categorical { column, .. }) => Err(Unsupported::ScaleInput {
            scale: "linear",
            column: column.clone(),
        }
        .into()),
    }
}

fn check_range((start, end): (f64, f64)) -> Result<()> {
    let length = (end - start).abs();
    if length > 0.0 && length.is_finite() {
        Ok(())
    } else {
        Err(VizError::InvalidRenderSurface {
            width: length,
            height: 0.0,
        })
    }
}

fn data_domain(col: &NumericColumn) -> (f64, f64) {
    widen_degenerate(col.min, col.max)
}

/// Value axes start at a visible zero baseline. Data entirely below zero
/// extends the domain downwards instead, keeping zero as the top edge.
fn zero_baseline_domain(col: &NumericColumn) -> (f64, f64) {
    let min = col.min.min(0.0);
    let max = col.max.max(0.0);
    if min == max {
        (0.0, 1.0)
    } else {
        (min, max)
    }
}

fn widen_degenerate(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

// =============================================================================
// Band scale
// =============================================================================

/// Categorical scale. The domain keeps distinct values in first-seen order,
/// which fixes the left-to-right placement of bars.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: IndexSet<String>,
    range: (f64, f64),
    padding: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new<S: AsRef<str>>(values: &[S], range: (f64, f64), padding: f64) -> Self {
        let domain: IndexSet<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        let padding = padding.clamp(0.0, 1.0);
        let n = domain.len().max(1) as f64;
        let step = (range.1 - range.0) / n;
        let bandwidth = step * (1.0 - padding);

        Self { domain, range, padding, step, bandwidth }
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Start pixel of the band holding `value`
    pub fn map(&self, value: &str) -> Option<f64> {
        let idx = self.domain.get_index_of(value)?;
        Some(self.range.0 + self.step * idx as f64 + (self.step - self.bandwidth) / 2.0)
    }

    pub fn center(&self, value: &str) -> Option<f64> {
        self.map(value).map(|x| x + self.bandwidth / 2.0)
    }
}

// =============================================================================
// Linear scale
// =============================================================================

/// Continuous scale. The domain is never degenerate.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = widen_degenerate(domain.0, domain.1);
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (px - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Round tick values inside the domain, roughly `count` of them
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        let Some((i1, i2, inc)) = tick_spec(lo, hi, count as f64) else {
            return if hi > lo { vec![lo, hi] } else { vec![lo] };
        };
        if i2 < i1 {
            return Vec::new();
        }
        (i1..=i2)
            .map(|i| if inc < 0.0 { i as f64 / -inc } else { i as f64 * inc })
            .collect()
    }

    /// Distance between two consecutive ticks, for label precision
    pub fn tick_step(&self, count: usize) -> f64 {
        let (lo, hi) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        match tick_spec(lo, hi, count as f64) {
            Some((_, _, inc)) if inc < 0.0 => 1.0 / -inc,
            Some((_, _, inc)) => inc,
            None => hi - lo,
        }
    }
}

/// Tick index span and increment; a negative increment means "divide by".
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    if !(count > 0.0) || !(stop > start) {
        return None;
    }

    let step = (stop - start) / count;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        i1 = (start * inv).round() as i64;
        i2 = (stop * inv).round() as i64;
        if (i1 as f64) / inv < start { i1 += 1; }
        if (i2 as f64) / inv > stop { i2 -= 1; }
        inc = -inv;
    } else {
        let step = 10f64.powf(power) * factor;
        i1 = (start / step).round() as i64;
        i2 = (stop / step).round() as i64;
        if (i1 as f64) * step < start { i1 += 1; }
        if (i2 as f64) * step > stop { i2 -= 1; }
        inc = step;
    }

    // spans near the f64 subnormal range overflow the increment
    if !inc.is_finite() || i2.saturating_sub(i1) > (count as i64).saturating_mul(10) {
        return None;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

/// Format a tick value with as many decimals as the tick step needs
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step < 1.0 {
        (-step.log10().floor()) as usize
    } else {
        0
    };
    if decimals == 0 {
        format_number(value.round())
    } else {
        format!("{:.*}", decimals, value)
    }
}
