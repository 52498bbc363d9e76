//! Settings for a deflection run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{CosineDomain, DeflectionOptions, Tolerance};
use crate::table::columns::AxisCandidates;

/// Header of the appended angle column.
pub const ANGLE_COLUMN: &str = "angle (°)";
/// Header of the appended supplementary angle column.
pub const SUPPLEMENTARY_COLUMN: &str = "supplementary_angle (°)";
/// Most decimal places an angle cell may carry; an `f64` holds no more than 17
/// significant digits.
pub const MAX_PRECISION: usize = 17;

/// What happens to a vertex next to a zero-length segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Keep the row, leave both angle cells empty and log a warning.
    #[default]
    Blank,
    /// Abort the whole table on the first such vertex. Rows that fail for other
    /// reasons are still left blank.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeflectionConfig {
    pub axes: AxisCandidates,
    pub cosine: CosineDomain,
    pub degenerate: DegeneratePolicy,
    /// Segments at or below this length count as coincident points.
    pub zero_length_tolerance: f64,
    pub angle_column: String,
    pub supplementary_column: String,
    /// Decimal places for the angle cells; `None` writes the shortest exact form.
    pub precision: Option<usize>,
}

impl Default for DeflectionConfig {
    fn default() -> Self {
        Self {
            axes: AxisCandidates::default(),
            cosine: CosineDomain::Clamp,
            degenerate: DegeneratePolicy::Blank,
            zero_length_tolerance: Tolerance::ZERO_LENGTH.eps,
            angle_column: ANGLE_COLUMN.to_owned(),
            supplementary_column: SUPPLEMENTARY_COLUMN.to_owned(),
            precision: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("zero-length tolerance must be finite and >= 0, got {0}")]
    InvalidTolerance(f64),
    #[error("no candidate column names given for axis {0}")]
    NoCandidates(&'static str),
    #[error("output column names must be non-empty and distinct")]
    InvalidOutputColumns,
    #[error("precision must be at most 17 decimal places, got {0}")]
    InvalidPrecision(usize),
}

impl DeflectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tol = self.zero_length_tolerance;
        if !tol.is_finite() || tol < 0.0 {
            return Err(ConfigError::InvalidTolerance(tol));
        }
        for (label, names) in [
            ("x", &self.axes.x),
            ("y", &self.axes.y),
            ("z", &self.axes.z),
        ] {
            if names.is_empty() {
                return Err(ConfigError::NoCandidates(label));
            }
        }
        if self.angle_column.is_empty()
            || self.supplementary_column.is_empty()
            || self.angle_column == self.supplementary_column
        {
            return Err(ConfigError::InvalidOutputColumns);
        }
        if let Some(places) = self.precision.filter(|places| *places > MAX_PRECISION) {
            return Err(ConfigError::InvalidPrecision(places));
        }
        Ok(())
    }

    #[must_use]
    pub fn deflection_options(&self) -> DeflectionOptions {
        DeflectionOptions {
            cosine: self.cosine,
            tolerance: Tolerance::new(self.zero_length_tolerance),
        }
    }

    /// Formats an angle cell according to `precision`, capped at [`MAX_PRECISION`].
    #[must_use]
    pub fn format_angle(&self, degrees: f64) -> String {
        match self.precision {
            Some(places) => {
                let places = places.min(MAX_PRECISION);
                format!("{degrees:.places$}")
            }
            None => degrees.to_string(),
        }
    }
}
