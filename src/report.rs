//! Runs a survey table through column resolution, coercion and the deflection engine,
//! and merges the angles back into the table.

use crate::config::{DeflectionConfig, DegeneratePolicy};
use crate::error::Result;
use crate::geom::{DeflectionError, DeflectionRecord, compute_deflections};
use crate::parse::csv;
use crate::table::{Table, TableError};
use crate::table::coerce::read_alignment;
use crate::table::columns::resolve;

/// Interior rows of the input table with the two angle columns appended.
#[derive(Debug, Clone, PartialEq)]
pub struct DeflectionTable {
    table: Table,
    point_count: usize,
    records: Vec<std::result::Result<DeflectionRecord, DeflectionError>>,
}

/// Overview of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeflectionSummary {
    pub points: usize,
    pub computed: usize,
    pub failed: usize,
    /// Vertex with the smallest angle, i.e. the largest bend.
    pub sharpest: Option<DeflectionRecord>,
}

impl DeflectionTable {
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    #[must_use]
    pub fn into_table(self) -> Table {
        self.table
    }

    /// One entry per output row, in the same order.
    #[must_use]
    pub fn records(&self) -> &[std::result::Result<DeflectionRecord, DeflectionError>] {
        &self.records
    }

    /// Rows whose angle could not be computed.
    pub fn failures(&self) -> impl Iterator<Item = &DeflectionError> {
        self.records.iter().filter_map(|record| record.as_ref().err())
    }

    #[must_use]
    pub fn summary(&self) -> DeflectionSummary {
        let computed: Vec<&DeflectionRecord> =
            self.records.iter().filter_map(|r| r.as_ref().ok()).collect();
        let sharpest = computed
            .iter()
            .min_by(|a, b| a.angle.total_cmp(&b.angle))
            .map(|record| **record);
        DeflectionSummary {
            points: self.point_count,
            computed: computed.len(),
            failed: self.records.len() - computed.len(),
            sharpest,
        }
    }

    #[must_use]
    pub fn to_csv(&self) -> String {
        self.table.to_csv()
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        self.table.render_text()
    }
}

/// Parses CSV text and processes it with [`process_table`].
pub fn process_csv(input: &str, config: &DeflectionConfig) -> Result<DeflectionTable> {
    let table = csv::parse_str(input)?;
    process_table(&table, config)
}

/// Computes the deflection at every interior row of `table`.
///
/// Column resolution and numeric coercion run to completion before any angle is
/// computed; either failing aborts without output. The input must not already carry
/// the configured output columns.
///
/// Under [`DegeneratePolicy::Fail`] the first zero-length segment aborts the table.
/// Other per-row failures, such as a cosine outside `[-1, 1]` under
/// [`CosineDomain::Strict`](crate::geom::CosineDomain::Strict), always leave blank cells.
pub fn process_table(table: &Table, config: &DeflectionConfig) -> Result<DeflectionTable> {
    config.validate()?;
    for column in [&config.angle_column, &config.supplementary_column] {
        if table.has_column(column) {
            return Err(TableError::DuplicateColumn {
                column: column.clone(),
            }
            .into());
        }
    }
    let columns = resolve(table, &config.axes)?;
    let points = read_alignment(table, &columns)?;
    let records = compute_deflections(&points, config.deflection_options());

    for failure in records.iter().filter_map(|record| record.as_ref().err()) {
        if config.degenerate == DegeneratePolicy::Fail && failure.is_degenerate() {
            return Err(failure.clone().into());
        }
        log::warn!("{failure}; angle cells left empty");
    }

    let (angles, supplements): (Vec<String>, Vec<String>) = records
        .iter()
        .map(|record| match record {
            Ok(record) => (
                config.format_angle(record.angle),
                config.format_angle(record.supplementary),
            ),
            Err(_) => (String::new(), String::new()),
        })
        .unzip();

    let mut output = table.interior();
    output.push_column(config.angle_column.as_str(), angles)?;
    output.push_column(config.supplementary_column.as_str(), supplements)?;
    log::debug!(
        "deflection table ready: {} rows from {} points",
        output.row_count(),
        points.len()
    );

    Ok(DeflectionTable {
        table: output,
        point_count: points.len(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::{process_csv, process_table};
    use crate::config::{DeflectionConfig, DegeneratePolicy};
    use crate::error::Error;
    use crate::geom::{CosineDomain, DeflectionError};
    use crate::table::{Table, TableError};

    // Rounding pushes the cosine at the middle row just past 1.
    const OVERSHOOTING_REVERSAL: &str = "x,y,z\n0,0,0\n1.9,3.8,5.7\n1.8,3.6,5.4\n";

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn staircase_turns_ninety_degrees_twice() {
        let result = process_csv("x,y,z\n0,0,0\n1,0,0\n1,1,0\n2,1,0\n", &DeflectionConfig::default())
            .expect("processed");
        let table = result.table();
        assert_eq!(
            table.headers(),
            ["x", "y", "z", "angle (°)", "supplementary_angle (°)"]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][..3], ["1", "0", "0"]);
        assert_eq!(table.rows()[1][..3], ["1", "1", "0"]);
        for record in result.records() {
            let record = record.as_ref().expect("computed");
            assert_close(record.angle, 90.0);
            assert_close(record.supplementary, 90.0);
        }
    }

    #[test]
    fn short_tables_yield_no_rows() {
        for csv in ["x,y,z\n", "x,y,z\n0,0,0\n", "x,y,z\n0,0,0\n1,1,1\n"] {
            let result = process_csv(csv, &DeflectionConfig::default()).expect("processed");
            assert_eq!(result.table().row_count(), 0, "{csv}");
            assert!(result.records().is_empty());
            assert_eq!(result.table().headers().len(), 5);
        }
    }

    #[test]
    fn extra_columns_are_carried_through() {
        let result = process_csv(
            "station,X,Y,Z\nA,0,0,0\nB,10,0,0\nC,20,0,0\n",
            &DeflectionConfig {
                precision: Some(2),
                ..DeflectionConfig::default()
            },
        )
        .expect("processed");
        assert_eq!(
            result.table().rows()[0],
            ["B", "10", "0", "0", "180.00", "0.00"]
        );
    }

    #[test]
    fn missing_axis_aborts_before_computation() {
        let err = process_csv("x,y\n0,0\n1,0\n1,1\n", &DeflectionConfig::default())
            .expect_err("z missing");
        match err {
            Error::MissingColumn(missing) => {
                assert_eq!(missing.axes(), vec![crate::table::columns::Axis::Z]);
            }
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cell_aborts_whole_table() {
        let err = process_csv("x,y,z\n0,0,0\n1,abc,0\n1,1,0\n", &DeflectionConfig::default())
            .expect_err("non-numeric");
        match err {
            Error::DataFormat(format) => {
                assert_eq!(format.cells.len(), 1);
                assert_eq!(format.cells[0].value, "abc");
                assert_eq!(format.cells[0].row, 1);
            }
            other => panic!("expected data format error, got {other:?}"),
        }
    }

    #[test]
    fn coincident_points_leave_blank_cells() {
        let result = process_csv(
            "x,y,z\n0,0,0\n1,0,0\n1,0,0\n1,1,0\n2,1,0\n",
            &DeflectionConfig::default(),
        )
        .expect("processed");
        let rows = result.table().rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][3..], ["", ""]);
        assert_eq!(rows[1][3..], ["", ""]);
        assert_eq!(rows[2][3..], ["90", "90"]);
        assert_eq!(result.failures().count(), 2);
    }

    #[test]
    fn fail_policy_surfaces_degenerate_geometry() {
        let config = DeflectionConfig {
            degenerate: DegeneratePolicy::Fail,
            ..DeflectionConfig::default()
        };
        let err = process_csv("x,y,z\n0,0,0\n0,0,0\n1,0,0\n", &config).expect_err("degenerate");
        assert!(matches!(
            err,
            Error::DegenerateGeometry(DeflectionError::DegenerateSegment { index: 1, .. })
        ));
    }

    #[test]
    fn strict_cosine_leaves_out_of_domain_row_blank() {
        let config = DeflectionConfig {
            cosine: CosineDomain::Strict,
            ..DeflectionConfig::default()
        };
        let result = process_csv(OVERSHOOTING_REVERSAL, &config).expect("processed");
        assert_eq!(result.table().rows()[0], ["1.9", "3.8", "5.7", "", ""]);
        assert!(matches!(
            result.records()[0],
            Err(DeflectionError::CosineOutOfDomain { index: 1, .. })
        ));

        let clamped = process_csv(OVERSHOOTING_REVERSAL, &DeflectionConfig::default())
            .expect("processed");
        assert_eq!(clamped.table().rows()[0][3..], ["0", "180"]);
    }

    #[test]
    fn fail_policy_only_aborts_on_degenerate_segments() {
        let config = DeflectionConfig {
            cosine: CosineDomain::Strict,
            degenerate: DegeneratePolicy::Fail,
            ..DeflectionConfig::default()
        };
        let result = process_csv(OVERSHOOTING_REVERSAL, &config).expect("not degenerate");
        assert_eq!(result.summary().failed, 1);
        assert_eq!(result.table().rows()[0][3..], ["", ""]);
    }

    #[test]
    fn existing_output_column_is_rejected() {
        let err = process_csv(
            "x,y,z,angle (°)\n0,0,0,\n1,0,0,\n1,1,0,\n",
            &DeflectionConfig::default(),
        )
        .expect_err("clashing header");
        assert!(matches!(
            err,
            Error::Table(TableError::DuplicateColumn { ref column }) if column == "angle (°)"
        ));
    }

    #[test]
    fn summary_picks_sharpest_bend() {
        let result = process_csv(
            "x,y,z\n0,0,0\n10,0,0\n20,0,10\n20,0,20\n10,0,20\n",
            &DeflectionConfig::default(),
        )
        .expect("processed");
        let summary = result.summary();
        assert_eq!(summary.points, 5);
        assert_eq!(summary.computed, 3);
        assert_eq!(summary.failed, 0);
        let sharpest = summary.sharpest.expect("has records");
        assert_eq!(sharpest.index, 3);
        assert_close(sharpest.angle, 90.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DeflectionConfig {
            zero_length_tolerance: f64::NAN,
            ..DeflectionConfig::default()
        };
        let table = Table::new(vec!["x".into(), "y".into(), "z".into()]);
        assert!(matches!(process_table(&table, &config), Err(Error::Config(_))));
    }
}
