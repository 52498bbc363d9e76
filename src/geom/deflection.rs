//! Deflection angles along a surveyed alignment.
//!
//! Every interior vertex `B` of an alignment `.., A, B, C, ..` receives the angle between
//! `A - B` and `C - B`, in degrees. A straight run measures 180°, a full reversal 0°.
//! The first and last point have a single adjacent segment and never produce a record.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Point3, Tolerance, Vec3};

const STRAIGHT_DEG: f64 = 180.0;

/// How a cosine ratio that drifted outside `[-1, 1]` through rounding is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosineDomain {
    /// Clamp the ratio to `[-1, 1]` before taking the arc cosine.
    #[default]
    Clamp,
    /// Leave the ratio untouched and report rows where it falls outside the domain.
    Strict,
}

/// Options for [`compute_deflections`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeflectionOptions {
    pub cosine: CosineDomain,
    /// Segments at or below this length are treated as degenerate.
    pub tolerance: Tolerance,
}

impl Default for DeflectionOptions {
    fn default() -> Self {
        Self {
            cosine: CosineDomain::Clamp,
            tolerance: Tolerance::ZERO_LENGTH,
        }
    }
}

/// Which of the two segments meeting at a vertex collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSide {
    Incoming,
    Outgoing,
}

impl fmt::Display for SegmentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incoming => f.write_str("incoming"),
            Self::Outgoing => f.write_str("outgoing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeflectionError {
    #[error("point {index} is not an interior point of an alignment with {len} points")]
    NotInterior { index: usize, len: usize },
    #[error("point {point} next to vertex {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize, point: usize },
    #[error("zero-length {side} segment at point {index}")]
    DegenerateSegment { index: usize, side: SegmentSide },
    #[error("cosine ratio {ratio} at point {index} lies outside [-1, 1]")]
    CosineOutOfDomain { index: usize, ratio: f64 },
}

impl DeflectionError {
    /// Alignment index of the vertex the error belongs to.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::NotInterior { index, .. }
            | Self::NonFinitePoint { index, .. }
            | Self::DegenerateSegment { index, .. }
            | Self::CosineOutOfDomain { index, .. } => *index,
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateSegment { .. })
    }
}

/// Angle measured at one interior vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeflectionRecord {
    /// Alignment index of the vertex (`1..=len - 2`).
    pub index: usize,
    pub vertex: Point3,
    /// Angle between the two segments, degrees in `[0, 180]`.
    pub angle: f64,
    /// `180 - angle`: how far the alignment bends away from straight ahead.
    pub supplementary: f64,
}

impl DeflectionRecord {
    fn from_angle(index: usize, vertex: Point3, angle: f64) -> Self {
        Self {
            index,
            vertex,
            angle,
            supplementary: STRAIGHT_DEG - angle,
        }
    }
}

/// Computes one record per interior point, in traversal order.
///
/// The output always holds `points.len().saturating_sub(2)` entries so that entry `k`
/// belongs to `points[k + 1]`. A failing vertex yields an `Err` in its slot without
/// affecting its neighbours.
#[must_use]
pub fn compute_deflections(
    points: &[Point3],
    options: DeflectionOptions,
) -> Vec<Result<DeflectionRecord, DeflectionError>> {
    let interior = 1..points.len().saturating_sub(1);
    log::debug!(
        "computing deflections for {} points ({} interior)",
        points.len(),
        interior.len()
    );
    interior
        .map(|index| deflection_at(points, index, options))
        .collect()
}

/// Computes the record for the vertex at `index`.
pub fn deflection_at(
    points: &[Point3],
    index: usize,
    options: DeflectionOptions,
) -> Result<DeflectionRecord, DeflectionError> {
    if index == 0 || index + 1 >= points.len() {
        return Err(DeflectionError::NotInterior {
            index,
            len: points.len(),
        });
    }

    for neighbour in index - 1..=index + 1 {
        if !points[neighbour].is_finite() {
            return Err(DeflectionError::NonFinitePoint {
                index,
                point: neighbour,
            });
        }
    }

    let a = points[index - 1];
    let b = points[index];
    let c = points[index + 1];
    let angle = vertex_angle(a - b, c - b, options).map_err(|failure| match failure {
        AngleFailure::Degenerate(side) => DeflectionError::DegenerateSegment { index, side },
        AngleFailure::OutOfDomain(ratio) => DeflectionError::CosineOutOfDomain { index, ratio },
    })?;

    Ok(DeflectionRecord::from_angle(index, b, angle))
}

enum AngleFailure {
    Degenerate(SegmentSide),
    OutOfDomain(f64),
}

/// Angle in degrees between `ba` (towards the previous point) and `bc` (towards the next).
fn vertex_angle(ba: Vec3, bc: Vec3, options: DeflectionOptions) -> Result<f64, AngleFailure> {
    let len_ba = ba.length();
    let len_bc = bc.length();
    if options.tolerance.is_zero_length(len_ba) {
        return Err(AngleFailure::Degenerate(SegmentSide::Incoming));
    }
    if options.tolerance.is_zero_length(len_bc) {
        return Err(AngleFailure::Degenerate(SegmentSide::Outgoing));
    }

    // Unit vectors keep the ratio finite for coordinates whose squared lengths overflow.
    let (Some(unit_ba), Some(unit_bc)) = (ba.normalized(), bc.normalized()) else {
        return Err(AngleFailure::OutOfDomain(f64::NAN));
    };
    let ratio = unit_ba.dot(unit_bc);
    if ratio.is_nan() {
        return Err(AngleFailure::OutOfDomain(ratio));
    }
    let cosine = match options.cosine {
        CosineDomain::Clamp => ratio.clamp(-1.0, 1.0),
        CosineDomain::Strict if (-1.0..=1.0).contains(&ratio) => ratio,
        CosineDomain::Strict => return Err(AngleFailure::OutOfDomain(ratio)),
    };

    Ok(cosine.acos().to_degrees())
}
