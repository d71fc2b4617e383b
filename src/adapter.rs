// Result adapter: raw rows -> typed columns for the scale builder

use crate::data::{ResultSet, Row, Scalar};
use crate::error::{Result, Unsupported, VizError};
use crate::resolve::ResolvedVisualization;

/// Outcome of adapting a result set. `Empty` is a state, not an error.
#[derive(Debug, Clone)]
pub enum Adapted<'a> {
    Empty,
    Data(NormalizedData<'a>),
}

/// Column values prepared for one scale kind
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Raw values rendered as labels, in row order
    Categorical { column: String, values: Vec<String> },
    Numeric(NumericColumn),
}

impl ColumnValues {
    pub fn column(&self) -> &str {
        match self {
            ColumnValues::Categorical { column, .. } => column,
            ColumnValues::Numeric(n) => &n.column,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Categorical { values, .. } => values.len(),
            ColumnValues::Numeric(n) => n.values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub column: String,
    pub values: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

/// A non-empty result set whose axis columns are known to exist in every row.
#[derive(Debug, Clone)]
pub struct NormalizedData<'a> {
    rows: &'a [Row],
}

/// Validate `result` against the resolved visualization.
///
/// Every row must carry the x and y columns; the first offending row is
/// reported as `UnsupportedConfig`.
pub fn adapt<'a>(result: &'a ResultSet, vis: &ResolvedVisualization) -> Result<Adapted<'a>> {
    if result.is_empty() {
        return Ok(Adapted::Empty);
    }

    for (idx, row) in result.rows.iter().enumerate() {
        for column in vis.required_columns() {
            if !row.contains_key(column) {
                return Err(Unsupported::MissingColumn {
                    column: column.to_string(),
                    row: idx,
                }
                .into());
            }
        }
    }

    Ok(Adapted::Data(NormalizedData { rows: &result.rows }))
}

impl<'a> NormalizedData<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &'a [Row] {
        self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&'a Row> {
        self.rows.get(idx)
    }

    /// Raw values of `column` as labels, one per row
    pub fn categorical(&self, column: &str) -> Result<ColumnValues> {
        let values = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| cell(row, column, idx).map(|v| v.to_string()))
            .collect::<Result<Vec<_>>>()?;

        Ok(ColumnValues::Categorical { column: column.to_string(), values })
    }

    /// Values of `column` coerced to numbers, with their extent
    pub fn numeric(&self, column: &str) -> Result<ColumnValues> {
        let mut values = Vec::with_capacity(self.rows.len());
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for (idx, row) in self.rows.iter().enumerate() {
            let v = cell(row, column, idx)?
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| VizError::DataTypeMismatch {
                    column: column.to_string(),
                    row: idx,
                })?;
            if v < min { min = v; }
            if v > max { max = v; }
            values.push(v);
        }

        Ok(ColumnValues::Numeric(NumericColumn {
            column: column.to_string(),
            values,
            min,
            max,
        }))
    }

    /// Lenient lookup for color and tooltip bindings: missing cells read as empty
    pub fn display_value(&self, idx: usize, column: &str) -> String {
        self.rows
            .get(idx)
            .and_then(|row| row.get(column))
            .map(Scalar::to_string)
            .unwrap_or_default()
    }
}

fn cell<'r>(row: &'r Row, column: &str, idx: usize) -> Result<&'r Scalar> {
    row.get(column).ok_or_else(|| {
        Unsupported::MissingColumn { column: column.to_string(), row: idx }.into()
    })
}
