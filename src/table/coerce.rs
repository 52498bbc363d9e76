//! Conversion of coordinate cells into numbers and points.

use std::fmt;

use crate::geom::Point3;

use super::Table;
use super::columns::{Axis, ResolvedColumns};

/// A coordinate cell that could not be read as a finite number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCell {
    /// Zero-based data row (the header is not counted).
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl fmt::Display for InvalidCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} column '{}': '{}' is not a number",
            self.row, self.column, self.value
        )
    }
}

/// Every non-numeric coordinate cell of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFormatError {
    pub cells: Vec<InvalidCell>,
}

impl fmt::Display for DataFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} coordinate value(s) are not numeric", self.cells.len())?;
        for cell in &self.cells {
            write!(f, "; {cell}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DataFormatError {}

/// Reads a cell as a finite `f64`. Surrounding whitespace is ignored.
#[must_use]
pub fn coerce_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Builds the alignment from the resolved columns, in row order.
///
/// All offending cells are collected before failing so the caller can report them at once.
pub fn read_alignment(
    table: &Table,
    columns: &ResolvedColumns,
) -> Result<Vec<Point3>, DataFormatError> {
    let mut points = Vec::with_capacity(table.row_count());
    let mut invalid = Vec::new();
    for (row_idx, row) in table.rows().iter().enumerate() {
        let mut coords = [0.0; 3];
        for (coord, axis) in coords.iter_mut().zip(Axis::ALL) {
            let text = row.get(columns.index(axis)).map_or("", String::as_str);
            match coerce_number(text) {
                Some(value) => *coord = value,
                None => invalid.push(InvalidCell {
                    row: row_idx,
                    column: columns.get(axis).to_owned(),
                    value: text.to_owned(),
                }),
            }
        }
        points.push(Point3::from_array(coords));
    }

    if invalid.is_empty() {
        log::debug!("read {} alignment points", points.len());
        Ok(points)
    } else {
        log::debug!("{} non-numeric coordinate cells", invalid.len());
        Err(DataFormatError { cells: invalid })
    }
}
