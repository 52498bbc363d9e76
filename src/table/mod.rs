//! In-memory tables of survey rows.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;

pub mod coerce;
pub mod columns;

/// Rectangular table of text cells with a header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    header_index: HashMap<String, usize>,
}

impl Table {
    #[must_use]
    pub fn new(headers: Vec<String>) -> Self {
        let mut header_index = HashMap::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            // First occurrence wins when a header is repeated.
            header_index.entry(name.clone()).or_insert(idx);
        }
        Self {
            headers,
            rows: Vec::new(),
            header_index,
        }
    }

    /// Appends a row. The row must have exactly one cell per header.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), TableError> {
        if row.len() != self.headers.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends a column. `cells` must hold one value per existing row and `name` must
    /// not already be a header.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        cells: Vec<String>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(TableError::DuplicateColumn { column: name });
        }
        if cells.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                column: name,
                expected: self.rows.len(),
                found: cells.len(),
            });
        }
        self.header_index.insert(name.clone(), self.headers.len());
        self.headers.push(name);
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(())
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.header_index.contains_key(name)
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header_index.get(name).copied()
    }

    /// Cells of the named column, top to bottom.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + use<'a>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// Copy of the table without its first and last row.
    #[must_use]
    pub fn interior(&self) -> Self {
        let rows = if self.rows.len() > 2 {
            self.rows[1..self.rows.len() - 1].to_vec()
        } else {
            Vec::new()
        };
        Self {
            headers: self.headers.clone(),
            rows,
            header_index: self.header_index.clone(),
        }
    }

    /// Serialises the table as comma-separated text with a trailing newline.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_csv_line(&mut out, &self.headers);
        for row in &self.rows {
            write_csv_line(&mut out, row);
        }
        out
    }

    /// Renders the table with padded, left-aligned columns for terminal display.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        write_padded_line(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_padded_line(&mut out, &rule, &widths);
        for row in &self.rows {
            write_padded_line(&mut out, row, &widths);
        }
        out
    }
}

fn write_csv_line(out: &mut String, cells: &[String]) {
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

fn needs_quotes(cell: &str) -> bool {
    cell.contains([',', '"', '\n', '\r'])
        || cell.starts_with(char::is_whitespace)
        || cell.ends_with(char::is_whitespace)
}

fn write_padded_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Shape errors while assembling a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
    DuplicateColumn {
        column: String,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowWidth {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} cells, expected {expected}"),
            Self::ColumnLength {
                column,
                expected,
                found,
            } => write!(
                f,
                "column '{column}' has {found} cells, expected one per row ({expected})"
            ),
            Self::DuplicateColumn { column } => {
                write!(f, "the table already has a column named '{column}'")
            }
        }
    }
}

impl std::error::Error for TableError {}

#[cfg(test)]
mod tests {
    use super::{Table, TableError};

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::new(headers.iter().map(|h| (*h).to_owned()).collect());
        for row in rows {
            table
                .push_row(row.iter().map(|c| (*c).to_owned()).collect())
                .expect("row fits");
        }
        table
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut table = Table::new(vec!["x".into(), "y".into()]);
        let err = table.push_row(vec!["1".into()]).unwrap_err();
        assert_eq!(
            err,
            TableError::RowWidth {
                row: 0,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn column_lookup_is_exact() {
        let table = table(&["x", "Y"], &[&["1", "2"], &["3", "4"]]);
        assert!(table.has_column("Y"));
        assert!(!table.has_column("y"));
        let ys: Vec<&str> = table.column("Y").expect("column").collect();
        assert_eq!(ys, ["2", "4"]);
    }

    #[test]
    fn interior_drops_first_and_last_rows() {
        let table = table(&["id"], &[&["a"], &["b"], &["c"], &["d"]]);
        let interior = table.interior();
        assert_eq!(interior.rows(), &[vec!["b".to_owned()], vec!["c".to_owned()]]);
        assert_eq!(interior.headers(), table.headers());

        let short = self::table(&["id"], &[&["a"], &["b"]]);
        assert_eq!(short.interior().row_count(), 0);
    }

    #[test]
    fn push_column_checks_length() {
        let mut table = table(&["id"], &[&["a"], &["b"]]);
        assert!(table.push_column("angle", vec!["1".into()]).is_err());
        table
            .push_column("angle", vec!["1".into(), "2".into()])
            .expect("column fits");
        assert_eq!(table.column_index("angle"), Some(1));
        assert_eq!(table.rows()[1], vec!["b".to_owned(), "2".to_owned()]);
    }

    #[test]
    fn push_column_refuses_existing_header() {
        let mut table = table(&["id", "angle"], &[&["a", "90"]]);
        assert_eq!(
            table.push_column("angle", vec!["45".into()]),
            Err(TableError::DuplicateColumn {
                column: "angle".to_owned()
            })
        );
        assert_eq!(table.headers().len(), 2);
        assert_eq!(table.rows()[0], vec!["a".to_owned(), "90".to_owned()]);
    }

    #[test]
    fn csv_output_quotes_when_needed() {
        let table = table(&["name", "angle (°)"], &[&["bend, upper", "90"], &["say \"hi\"", "45"]]);
        assert_eq!(
            table.to_csv(),
            "name,angle (°)\n\"bend, upper\",90\n\"say \"\"hi\"\"\",45\n"
        );
    }

    #[test]
    fn text_rendering_pads_columns() {
        let table = table(&["x", "angle"], &[&["10", "90"], &["2", "180"]]);
        assert_eq!(
            table.render_text(),
            "x   angle\n--  -----\n10  90\n2   180\n"
        );
    }
}
