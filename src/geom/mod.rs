mod core;
mod deflection;

pub use self::core::{Point3, Tolerance, Vec3};
pub use self::deflection::{
    CosineDomain, DeflectionError, DeflectionOptions, DeflectionRecord, SegmentSide,
    compute_deflections, deflection_at,
};
